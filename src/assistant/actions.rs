//! Closed vocabularies for what the model may ask to match and to change.
//!
//! Replies carry `conditions` and `updates` as free-form JSON objects. They
//! are parsed here into [`Condition`] and [`FieldUpdate`] before the store is
//! touched, so a key outside these sets rejects the whole action.

use crate::libs::task::{Category, Task, TaskPatch};
use crate::libs::validation::validate_update;
use chrono::{Days, NaiveDate};
use serde_json::{Map, Value};
use thiserror::Error;

pub const TODAY_TOKENS: [&str; 2] = ["today", "오늘"];
pub const TOMORROW_TOKENS: [&str; 2] = ["tomorrow", "내일"];
pub const TIME_KEYS: [&str; 2] = ["time", "시간"];

/// Why a `conditions` or `updates` object was refused. No task is touched
/// when any of its keys fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("unsupported key '{0}'")]
    UnsupportedKey(String),
    #[error("invalid value {value} for '{key}'")]
    InvalidValue { key: String, value: String },
    #[error("no conditions given")]
    Empty,
    #[error("no updates given")]
    NoUpdates,
}

fn invalid(key: &str, value: &Value) -> ConditionError {
    ConditionError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Resolves `today`/`tomorrow` tokens (English or Korean) to a date.
pub fn resolve_relative_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let token = token.trim().to_lowercase();
    if TODAY_TOKENS.contains(&token.as_str()) {
        Some(today)
    } else if TOMORROW_TOKENS.contains(&token.as_str()) {
        today.checked_add_days(Days::new(1))
    } else {
        None
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

/// One filter on the task set. A set of conditions matches a task when all do.
///
/// | Key | Accepted value | Condition |
/// |---|---|---|
/// | `due_date` | `"today"` or `"오늘"` | [`Condition::DueToday`] |
/// | `title` | non-empty string | [`Condition::TitleContains`] |
/// | `category` | a category name | [`Condition::CategoryEquals`] |
/// | `completed` | boolean, or `"true"`/`"false"` | [`Condition::CompletedEquals`] |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Due date equals the request's "today".
    DueToday,
    /// Title contains the text, ASCII case folded.
    TitleContains(String),
    CategoryEquals(Category),
    CompletedEquals(bool),
}

impl Condition {
    /// Parses one `conditions` entry.
    ///
    /// # Arguments
    ///
    /// * `key` - Condition key as the model wrote it
    /// * `value` - Its JSON value
    ///
    /// # Returns
    ///
    /// [`ConditionError::UnsupportedKey`] for a key outside the table above,
    /// [`ConditionError::InvalidValue`] for a known key with an unusable value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use taskpad::assistant::actions::{Condition, ConditionError};
    ///
    /// let condition = Condition::parse("title", &json!("운동")).unwrap();
    /// assert_eq!(condition, Condition::TitleContains("운동".into()));
    /// assert_eq!(
    ///     Condition::parse("owner", &json!("me")),
    ///     Err(ConditionError::UnsupportedKey("owner".into()))
    /// );
    /// ```
    pub fn parse(key: &str, value: &Value) -> Result<Condition, ConditionError> {
        match key {
            "due_date" => match value.as_str() {
                Some(token) if TODAY_TOKENS.contains(&token.trim().to_lowercase().as_str()) => Ok(Condition::DueToday),
                _ => Err(invalid(key, value)),
            },
            "title" => match value.as_str().map(str::trim) {
                Some(title) if !title.is_empty() => Ok(Condition::TitleContains(title.to_string())),
                _ => Err(invalid(key, value)),
            },
            "category" => value
                .as_str()
                .and_then(|c| c.parse().ok())
                .map(Condition::CategoryEquals)
                .ok_or_else(|| invalid(key, value)),
            "completed" => as_bool(value).map(Condition::CompletedEquals).ok_or_else(|| invalid(key, value)),
            other => Err(ConditionError::UnsupportedKey(other.to_string())),
        }
    }

    /// Title matching folds ASCII case only, like the list search.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Condition::DueToday => task.due_date == Some(today),
            Condition::TitleContains(needle) => task.title.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()),
            Condition::CategoryEquals(category) => task.category == *category,
            Condition::CompletedEquals(completed) => task.completed == *completed,
        }
    }
}

/// Parses a `conditions` object. An empty object is rejected.
pub fn parse_conditions(raw: &Map<String, Value>) -> Result<Vec<Condition>, ConditionError> {
    if raw.is_empty() {
        return Err(ConditionError::Empty);
    }
    raw.iter().map(|(key, value)| Condition::parse(key, value)).collect()
}

/// The tasks that satisfy every condition, in the order given.
pub fn matching<'a>(tasks: &'a [Task], conditions: &[Condition], today: NaiveDate) -> Vec<&'a Task> {
    tasks.iter().filter(|t| conditions.iter().all(|c| c.matches(t, today))).collect()
}

/// One requested change.
///
/// `Time` has no column of its own: it is appended to each matched task's
/// description until the schema grows a time-of-day field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Field(TaskPatch),
    Time(String),
}

impl FieldUpdate {
    /// Parses one `updates` entry. Task fields go through the same validation
    /// as `PUT /tasks/{id}`; `due_date` also takes `today`/`tomorrow` tokens.
    pub fn parse(key: &str, value: &Value, today: NaiveDate) -> Result<FieldUpdate, ConditionError> {
        if TIME_KEYS.contains(&key) {
            return match value {
                Value::String(s) if !s.trim().is_empty() => Ok(FieldUpdate::Time(s.trim().to_string())),
                Value::Number(n) => Ok(FieldUpdate::Time(n.to_string())),
                _ => Err(invalid(key, value)),
            };
        }

        let value = match (key, value.as_str()) {
            ("due_date", Some(token)) => match resolve_relative_date(token, today) {
                Some(date) => Value::String(date.to_string()),
                None => value.clone(),
            },
            ("completed", _) => as_bool(value).map(Value::Bool).ok_or_else(|| invalid(key, value))?,
            _ => value.clone(),
        };

        match key {
            "title" | "description" | "completed" | "priority" | "category" | "due_date" => {
                let mut body = Map::new();
                body.insert(key.to_string(), value.clone());
                validate_update(&Value::Object(body))
                    .map(FieldUpdate::Field)
                    .map_err(|_| invalid(key, &value))
            }
            other => Err(ConditionError::UnsupportedKey(other.to_string())),
        }
    }
}

/// Parsed `updates` object, merged into one patch plus an optional time note.
///
/// The plan is built once per message. [`UpdatePlan::patch_for`] then turns it
/// into a patch for each matched task, because the time note depends on
/// that task's current description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdatePlan {
    /// Field changes shared by every matched task.
    pub patch: TaskPatch,
    /// `time`/`시간` value to fold into descriptions.
    pub time: Option<String>,
}

impl UpdatePlan {
    /// Parses a whole `updates` object.
    ///
    /// # Arguments
    ///
    /// * `raw` - The `updates` object from the model reply
    /// * `today` - Date that relative `due_date` tokens resolve against
    ///
    /// # Returns
    ///
    /// The merged plan, or the first key that failed. An empty object is
    /// [`ConditionError::NoUpdates`].
    pub fn parse(raw: &Map<String, Value>, today: NaiveDate) -> Result<UpdatePlan, ConditionError> {
        if raw.is_empty() {
            return Err(ConditionError::NoUpdates);
        }

        let mut plan = UpdatePlan::default();
        for (key, value) in raw {
            match FieldUpdate::parse(key, value, today)? {
                FieldUpdate::Time(time) => plan.time = Some(time),
                FieldUpdate::Field(patch) => merge(&mut plan.patch, patch),
            }
        }
        Ok(plan)
    }

    /// The patch for one matched task, with the time note folded into its description.
    ///
    /// `task` should be read right before the write so that a description
    /// changed in the meantime is kept.
    pub fn patch_for(&self, task: &Task) -> TaskPatch {
        let mut patch = self.patch.clone();
        if let Some(time) = &self.time {
            let base = match &patch.description {
                Some(new) => new.clone(),
                None => task.description.clone(),
            };
            let folded = match base.filter(|d| !d.is_empty()) {
                Some(description) => format!("{} (time: {})", description, time),
                None => format!("time: {}", time),
            };
            patch.description = Some(Some(folded));
        }
        patch
    }
}

fn merge(into: &mut TaskPatch, from: TaskPatch) {
    into.title = from.title.or(into.title.take());
    into.description = from.description.or(into.description.take());
    into.completed = from.completed.or(into.completed);
    into.priority = from.priority.or(into.priority);
    into.category = from.category.or(into.category);
    into.due_date = from.due_date.or(into.due_date);
    into.order_index = from.order_index.or(into.order_index);
}

/// Fills relative due-date tokens in a CREATE item before it is validated.
pub fn resolve_item_due_date(item: &Value, today: NaiveDate) -> Value {
    let mut item = item.clone();
    if let Some(obj) = item.as_object_mut() {
        let resolved = obj
            .get("due_date")
            .and_then(Value::as_str)
            .and_then(|token| resolve_relative_date(token, today));
        if let Some(date) = resolved {
            obj.insert("due_date".to_string(), Value::String(date.to_string()));
        }
    }
    item
}
