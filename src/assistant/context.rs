//! The bounded digest of the task list sent to the model.

use crate::libs::task::{Category, Priority, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Samples kept per date bucket and for the recent list.
pub const BUCKET_SAMPLE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBrief {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl From<&Task> for TaskBrief {
    fn from(task: &Task) -> Self {
        TaskBrief {
            title: task.title.clone(),
            category: task.category,
            priority: task.priority,
            completed: task.completed,
            due_date: task.due_date,
        }
    }
}

/// Full sizes of the date buckets; the sample lists are capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCounts {
    pub today: usize,
    pub today_completed: usize,
    pub upcoming: usize,
    pub past: usize,
    pub no_date: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    pub today: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub categories: BTreeMap<Category, usize>,
    pub priorities: BTreeMap<Priority, usize>,
    pub counts: BucketCounts,
    pub today_tasks: Vec<TaskBrief>,
    pub upcoming_tasks: Vec<TaskBrief>,
    pub past_tasks: Vec<TaskBrief>,
    pub no_date_tasks: Vec<TaskBrief>,
    pub recent_tasks: Vec<TaskBrief>,
}

fn sample<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<TaskBrief> {
    tasks.take(BUCKET_SAMPLE).map(TaskBrief::from).collect()
}

impl ContextSummary {
    /// Buckets `tasks` relative to `today`. `tasks` is expected newest first,
    /// which makes `recent_tasks` the most recently created ones.
    pub fn build(tasks: &[Task], today: NaiveDate) -> Self {
        let due_today = move || tasks.iter().filter(move |t| t.due_date == Some(today));
        let upcoming = move || tasks.iter().filter(move |t| t.due_date.is_some_and(|d| d > today));
        let past = move || tasks.iter().filter(move |t| t.due_date.is_some_and(|d| d < today));
        let no_date = move || tasks.iter().filter(|t| t.due_date.is_none());

        let mut categories = BTreeMap::new();
        let mut priorities = BTreeMap::new();
        for task in tasks {
            *categories.entry(task.category).or_insert(0) += 1;
            *priorities.entry(task.priority).or_insert(0) += 1;
        }

        ContextSummary {
            today,
            total: tasks.len(),
            completed: tasks.iter().filter(|t| t.completed).count(),
            categories,
            priorities,
            counts: BucketCounts {
                today: due_today().count(),
                today_completed: due_today().filter(|t| t.completed).count(),
                upcoming: upcoming().count(),
                past: past().count(),
                no_date: no_date().count(),
            },
            today_tasks: sample(due_today()),
            upcoming_tasks: sample(upcoming()),
            past_tasks: sample(past()),
            no_date_tasks: sample(no_date()),
            recent_tasks: sample(tasks.iter()),
        }
    }

    /// Pretty JSON for the prompt.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
