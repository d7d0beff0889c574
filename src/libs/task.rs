//! Task entity and the small closed vocabularies around it.
//!
//! Priorities and categories are closed sets; they are stored as text in the
//! database and rendered with an emoji badge in the terminal views.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a member of one of the task vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("must be one of {expected}")]
pub struct ParseEnumError {
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
    const EXPECTED: &'static str = "high, medium, low";

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Numeric rank used for sorting, higher is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Priority::High => "🔥",
            Priority::Medium => "⚡",
            Priority::Low => "🌱",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    #[default]
    Personal,
    Health,
    Shopping,
    Learning,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Shopping,
        Category::Learning,
    ];
    const EXPECTED: &'static str = "work, personal, health, shopping, learning";

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Shopping => "shopping",
            Category::Learning => "learning",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Work => "💼",
            Category::Personal => "🏠",
            Category::Health => "🏃",
            Category::Shopping => "🛒",
            Category::Learning => "📚",
        }
    }
}

/// Completion filter shared by the list endpoint and the UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    const EXPECTED: &'static str = "all, completed, pending";

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::Pending => "pending",
        }
    }

    pub fn accepts(&self, completed: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => completed,
            StatusFilter::Pending => !completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Priority,
    DueDate,
}

impl SortField {
    const EXPECTED: &'static str = "created_at, updated_at, priority, due_date";

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Priority => "priority",
            SortField::DueDate => "due_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    const EXPECTED: &'static str = "asc, desc";

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

macro_rules! text_enum {
    ($ty:ident { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    _ => Err(ParseEnumError { value: s.to_string(), expected: $ty::EXPECTED }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(Priority { "high" => High, "medium" => Medium, "low" => Low });
text_enum!(Category {
    "work" => Work,
    "personal" => Personal,
    "health" => Health,
    "shopping" => Shopping,
    "learning" => Learning,
});
text_enum!(StatusFilter { "all" => All, "completed" => Completed, "pending" => Pending });
text_enum!(SortField {
    "created_at" => CreatedAt,
    "updated_at" => UpdatedAt,
    "priority" => Priority,
    "due_date" => DueDate,
});
text_enum!(SortOrder { "asc" => Asc, "desc" => Desc });

macro_rules! sql_text_enum {
    ($ty:ident) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

sql_text_enum!(Priority);
sql_text_enum!(Category);

/// A persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized creation input, defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<Option<NaiveDate>>,
    pub order_index: Option<i64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }

    /// Request body understood by the update validator.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(title) = &self.title {
            body.insert("title".into(), json!(title));
        }
        if let Some(description) = &self.description {
            body.insert("description".into(), json!(description.as_deref()));
        }
        if let Some(completed) = self.completed {
            body.insert("completed".into(), json!(completed));
        }
        if let Some(priority) = self.priority {
            body.insert("priority".into(), json!(priority.as_str()));
        }
        if let Some(category) = self.category {
            body.insert("category".into(), json!(category.as_str()));
        }
        if let Some(due_date) = self.due_date {
            body.insert("due_date".into(), json!(due_date.map(|d| d.to_string())));
        }
        if let Some(order_index) = self.order_index {
            body.insert("order_index".into(), json!(order_index));
        }
        Value::Object(body)
    }
}

/// List filters accepted by `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TaskQuery {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl TaskQuery {
    /// Query-string pairs in the form the list endpoint expects.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("status", self.status.to_string())];
        if let Some(priority) = self.priority {
            params.push(("priority", priority.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("category", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        params.push(("sortBy", self.sort_by.to_string()));
        params.push(("sortOrder", self.sort_order.to_string()));
        params
    }
}

/// Aggregate counts over a task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high_priority: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut by_category: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
        let mut by_priority: BTreeMap<Priority, usize> = Priority::ALL.iter().map(|p| (*p, 0)).collect();
        for task in tasks {
            *by_category.entry(task.category).or_default() += 1;
            *by_priority.entry(task.priority).or_default() += 1;
        }
        let completed = tasks.iter().filter(|t| t.completed).count();

        TaskStats {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
            high_priority: tasks.iter().filter(|t| t.priority == Priority::High && !t.completed).count(),
            by_category,
            by_priority,
        }
    }
}
