//! Natural-language intent router.
//!
//! One chat message becomes exactly one action:
//!
//! 1. load every task and build a [`ContextSummary`];
//! 2. ask the model to classify the message ([`prompt::CLASSIFY_PARAMS`]);
//! 3. read the reply ([`reply::parse_reply`]); an unreadable reply is answered
//!    as READ with the raw text, a failed call as READ with an apology;
//! 4. run the action. READ goes through [`analysis::analyze`], the other
//!    intents through the closed vocabularies in [`actions`]. UPDATE and
//!    DELETE match against a fresh read taken in the same blocking call as
//!    the write, not against the context the model was shown.
//!
//! Model failures never surface as errors. The only errors returned are store
//! failures while loading the context; store failures inside an action are
//! reported in the reply with `success: false`.

pub mod actions;
pub mod analysis;
pub mod context;
pub mod prompt;
pub mod reply;

use crate::api::llm::{ChatCompletion, LlmError};
use crate::db::tasks::Tasks;
use crate::libs::error::AppResult;
use crate::libs::messages::Message;
use crate::libs::task::{NewTask, Task, TaskStats};
use crate::libs::validation::validate_create;
use actions::{matching, parse_conditions, resolve_item_due_date, ConditionError, UpdatePlan};
use chrono::{Local, NaiveDate};
use context::ContextSummary;
use reply::{parse_reply, ModelReply, Payload};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub use reply::Intent;

/// Counts returned with every READ answer: the same totals as
/// `GET /tasks/stats` plus how many tasks are due today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStats {
    #[serde(flatten)]
    pub tasks: TaskStats,
    pub today_total: usize,
    pub today_completed: usize,
}

impl ReadStats {
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        let due_today = move || tasks.iter().filter(move |t| t.due_date == Some(today));
        ReadStats {
            tasks: TaskStats::from_tasks(tasks),
            today_total: due_today().count(),
            today_completed: due_today().filter(|t| t.completed).count(),
        }
    }
}

/// What an action did. Serialized untagged; `Nothing` has to stay last so
/// that deserializing picks the most specific shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionResult {
    Created { message: String, created: Vec<Task> },
    Read { message: String, stats: ReadStats },
    Updated { message: String, updated: Vec<Task> },
    Deleted { message: String, deleted: Vec<Task> },
    Nothing { message: String },
}

/// The `data` part of a chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub action: Intent,
    pub message: String,
    pub result: Option<ActionResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// False only when a store call inside the action failed.
    pub success: bool,
    pub reply: ChatReply,
}

impl ChatOutcome {
    fn ok(action: Intent, message: String, result: ActionResult) -> Self {
        ChatOutcome {
            success: true,
            reply: ChatReply {
                action,
                message,
                result: Some(result),
                error: None,
            },
        }
    }
}

/// Result of the first model call.
enum Classification {
    Parsed(ModelReply),
    Unparsed(String),
    Failed(LlmError),
}

/// Turns chat messages into task actions.
///
/// Cheap to clone: the store handle and the model client are shared.
#[derive(Clone)]
pub struct Assistant {
    tasks: Tasks,
    llm: Arc<dyn ChatCompletion>,
}

impl Assistant {
    pub fn new(tasks: Tasks, llm: Arc<dyn ChatCompletion>) -> Self {
        Self { tasks, llm }
    }

    /// Handles a message relative to the server's local date.
    ///
    /// # Arguments
    ///
    /// * `message` - The user's text, in any language the model understands
    ///
    /// # Returns
    ///
    /// Always an outcome when the task list could be loaded, even if the
    /// model failed or answered nonsense. `Err` means the store could not be
    /// read to build the context.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let outcome = assistant.handle("운동 완료했어").await?;
    /// assert_eq!(outcome.reply.action, Intent::Update);
    /// ```
    pub async fn handle(&self, message: &str) -> AppResult<ChatOutcome> {
        self.handle_at(message, Local::now().date_naive()).await
    }

    /// [`Assistant::handle`] with an explicit "today", which resolves
    /// relative dates and the date buckets of the context.
    pub async fn handle_at(&self, message: &str, today: NaiveDate) -> AppResult<ChatOutcome> {
        let all = self.tasks.run(Message::AssistantContextFailed, |tasks| tasks.fetch_all()).await?;
        let summary = ContextSummary::build(&all, today);
        let context_json = summary.to_prompt_json();

        match self.classify(message, &context_json).await {
            Classification::Parsed(reply) => Ok(self.dispatch(reply, message, &all, &summary, &context_json).await),
            Classification::Unparsed(raw) => {
                tracing::warn!("{}", Message::AssistantReplyUnparsed);
                let stats = ReadStats::from_tasks(&all, today);
                Ok(ChatOutcome::ok(
                    Intent::Read,
                    raw.clone(),
                    ActionResult::Read { message: raw, stats },
                ))
            }
            Classification::Failed(e) => {
                tracing::warn!("{}", Message::AssistantModelFailed(e.to_string()));
                let apology = Message::AssistantApology.to_string();
                let stats = ReadStats::from_tasks(&all, today);
                Ok(ChatOutcome::ok(
                    Intent::Read,
                    apology.clone(),
                    ActionResult::Read { message: apology, stats },
                ))
            }
        }
    }

    async fn classify(&self, message: &str, context_json: &str) -> Classification {
        let messages = prompt::classify_messages(message, context_json);
        match self.llm.complete(&messages, &prompt::CLASSIFY_PARAMS).await {
            Ok(raw) if raw.trim().is_empty() => Classification::Failed(LlmError::ParseError("empty reply".to_string())),
            Ok(raw) => match parse_reply(&raw) {
                Some(reply) => Classification::Parsed(reply),
                None => Classification::Unparsed(raw),
            },
            Err(e) => Classification::Failed(e),
        }
    }

    /// READ answers from the snapshot the model was shown; the writing
    /// intents read the store again, since the model call can take seconds.
    async fn dispatch(
        &self,
        reply: ModelReply,
        question: &str,
        all: &[Task],
        summary: &ContextSummary,
        context_json: &str,
    ) -> ChatOutcome {
        let today = summary.today;
        let intent = reply.intent;
        tracing::info!(%intent, "dispatching assistant action");

        let outcome = match reply.payload {
            Payload::Read { query } => {
                tracing::debug!(?query, "running analysis");
                let text = analysis::analyze(self.llm.as_ref(), question, summary, context_json).await.into_text();
                let stats = ReadStats::from_tasks(all, today);
                return ChatOutcome::ok(Intent::Read, text.clone(), ActionResult::Read { message: text, stats });
            }
            Payload::Create { items } => self.create(&items, today).await,
            Payload::Update { conditions, updates } => self.update(&conditions, &updates, today).await,
            Payload::Delete { conditions } => self.delete(&conditions, today).await,
        };

        match outcome {
            Ok(result) => ChatOutcome::ok(intent, reply.message, result),
            Err(e) => {
                tracing::error!(%intent, error = %e, "store failed during assistant action");
                ChatOutcome {
                    success: false,
                    reply: ChatReply {
                        action: intent,
                        message: reply.message,
                        result: None,
                        error: Some(Message::AssistantStoreFailed.to_string()),
                    },
                }
            }
        }
    }

    /// Validates each item on its own; invalid ones are logged and skipped.
    async fn create(&self, items: &[Value], today: NaiveDate) -> AppResult<ActionResult> {
        let valid: Vec<NewTask> = items
            .iter()
            .filter_map(|item| match validate_create(&resolve_item_due_date(item, today)) {
                Ok(task) => Some(task),
                Err(e) => {
                    tracing::warn!("{}", Message::AssistantSkippedItem(e.to_string()));
                    None
                }
            })
            .collect();

        if valid.is_empty() {
            return Ok(nothing(Message::AssistantNothingValid));
        }

        let created = self
            .tasks
            .run(Message::AssistantStoreFailed, move |tasks| {
                let first_index = tasks.next_order_index()?;
                tasks.insert_many(&valid, first_index)
            })
            .await?;
        Ok(ActionResult::Created {
            message: Message::AssistantCreated(created.len()).to_string(),
            created,
        })
    }

    async fn update(
        &self,
        conditions: &Map<String, Value>,
        updates: &Map<String, Value>,
        today: NaiveDate,
    ) -> AppResult<ActionResult> {
        let conditions = match parse_conditions(conditions) {
            Ok(conditions) => conditions,
            Err(e) => return Ok(rejected(e)),
        };
        let plan = match UpdatePlan::parse(updates, today) {
            Ok(plan) => plan,
            Err(e) => return Ok(rejected(e)),
        };

        let updated = self
            .tasks
            .run(Message::AssistantStoreFailed, move |tasks| {
                let current = tasks.fetch_all()?;
                let patches: Vec<_> = matching(&current, &conditions, today)
                    .into_iter()
                    .map(|t| (t.id.clone(), plan.patch_for(t)))
                    .collect();
                if patches.is_empty() {
                    return Ok(None);
                }
                tasks.update_each(&patches).map(Some)
            })
            .await?;

        Ok(match updated {
            None => nothing(Message::AssistantNoMatches),
            Some(updated) => ActionResult::Updated {
                message: Message::AssistantUpdated(updated.len()).to_string(),
                updated,
            },
        })
    }

    async fn delete(&self, conditions: &Map<String, Value>, today: NaiveDate) -> AppResult<ActionResult> {
        let conditions = match parse_conditions(conditions) {
            Ok(conditions) => conditions,
            Err(e) => return Ok(rejected(e)),
        };

        let (deleted, removed) = self
            .tasks
            .run(Message::AssistantStoreFailed, move |tasks| {
                let current = tasks.fetch_all()?;
                let targets: Vec<Task> = matching(&current, &conditions, today).into_iter().cloned().collect();
                let ids: Vec<String> = targets.iter().map(|t| t.id.clone()).collect();
                let removed = tasks.delete_many(&ids)?;
                Ok((targets, removed))
            })
            .await?;

        if deleted.is_empty() {
            return Ok(nothing(Message::AssistantNoMatches));
        }
        Ok(ActionResult::Deleted {
            message: Message::AssistantDeleted(removed).to_string(),
            deleted,
        })
    }
}

fn nothing(message: Message) -> ActionResult {
    ActionResult::Nothing {
        message: message.to_string(),
    }
}

fn rejected(error: ConditionError) -> ActionResult {
    tracing::warn!(error = %error, "assistant action rejected");
    let message = match error {
        ConditionError::UnsupportedKey(key) => Message::AssistantUnsupportedKey(key),
        ConditionError::InvalidValue { key, value } => Message::AssistantInvalidValue(key, value),
        ConditionError::Empty => Message::AssistantNoConditions,
        ConditionError::NoUpdates => Message::AssistantNoUpdates,
    };
    nothing(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::task::{Category, Priority};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn task(title: &str, due_date: Option<NaiveDate>, completed: bool) -> Task {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        Task {
            id: title.to_string(),
            title: title.to_string(),
            description: None,
            completed,
            priority: Priority::High,
            category: Category::Work,
            due_date,
            order_index: 1,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_read_stats_carry_the_task_stats_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let tasks = vec![
            task("a", Some(today), true),
            task("b", Some(today), false),
            task("c", None, false),
        ];

        let stats = ReadStats::from_tasks(&tasks, today);
        assert_eq!(stats.tasks, TaskStats::from_tasks(&tasks));
        assert_eq!((stats.today_total, stats.today_completed), (2, 1));

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["total"], json!(3));
        assert_eq!(value["highPriority"], json!(3));
        assert_eq!(value["byCategory"]["work"], json!(3));
        assert_eq!(value["todayTotal"], json!(2));
        assert_eq!(value["todayCompleted"], json!(1));
        assert!(value.get("tasks").is_none());
    }
}
