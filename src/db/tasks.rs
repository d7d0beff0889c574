//! Task record store.
//!
//! [`Tasks`] wraps one SQLite connection shared by every request handler and
//! the assistant. All methods are synchronous; async callers go through
//! [`Tasks::run`], which moves the call onto tokio's blocking pool.
//!
//! ```rust
//! use taskpad::db::{db::Db, tasks::Tasks};
//! use taskpad::libs::task::NewTask;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tasks = Tasks::new(Db::in_memory()?);
//! let order_index = tasks.next_order_index()?;
//! let task = tasks.insert(&NewTask::new("Buy milk"), order_index)?;
//! assert_eq!(tasks.get(&task.id)?, Some(task));
//! # Ok(())
//! # }
//! ```

use super::db::Db;
use crate::libs::error::{AppError, AppResult};
use crate::libs::messages::Message;
use crate::libs::task::{NewTask, SortField, SortOrder, StatusFilter, Task, TaskPatch, TaskQuery};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};
use std::sync::Arc;
use uuid::Uuid;

const COLUMNS: &str = "id, title, description, completed, priority, category, due_date, order_index, created_at, updated_at";
const INSERT_TASK: &str = "INSERT INTO tasks (id, title, description, completed, priority, category, due_date, order_index, created_at, updated_at)
    VALUES (?1, ?2, ?3, FALSE, ?4, ?5, ?6, ?7, ?8, ?8)";
const SELECT_MAX_ORDER: &str = "SELECT COALESCE(MAX(order_index), 0) FROM tasks";
const PRIORITY_RANK: &str = "CASE priority WHEN 'high' THEN 3 WHEN 'medium' THEN 2 ELSE 1 END";

/// Timestamps are stored as fixed-width RFC 3339 text in UTC, so comparing
/// the text compares the instants.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, text: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_task(row: &Row) -> Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        priority: row.get(4)?,
        category: row.get(5)?,
        due_date: row.get(6)?,
        order_index: row.get(7)?,
        created_at: parse_timestamp(8, row.get(8)?)?,
        updated_at: parse_timestamp(9, row.get(9)?)?,
    })
}

/// `LIKE` pattern matching `term` literally anywhere in the text.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn order_clause(sort_by: SortField, order: SortOrder) -> String {
    let direction = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let key = match sort_by {
        SortField::CreatedAt => format!("created_at {}", direction),
        SortField::UpdatedAt => format!("updated_at {}", direction),
        SortField::Priority => format!("{} {}", PRIORITY_RANK, direction),
        SortField::DueDate => match order {
            SortOrder::Asc => "due_date ASC NULLS LAST".to_string(),
            SortOrder::Desc => "due_date DESC NULLS FIRST".to_string(),
        },
    };
    format!("ORDER BY {}, completed ASC, order_index ASC, id ASC", key)
}

fn patch_assignments(patch: &TaskPatch, updated_at: &DateTime<Utc>) -> (Vec<&'static str>, Vec<Value>) {
    let mut columns = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(title) = &patch.title {
        columns.push("title = ?");
        values.push(Value::Text(title.clone()));
    }
    if let Some(description) = &patch.description {
        columns.push("description = ?");
        values.push(description.clone().map_or(Value::Null, Value::Text));
    }
    if let Some(completed) = patch.completed {
        columns.push("completed = ?");
        values.push(Value::Integer(completed as i64));
    }
    if let Some(priority) = patch.priority {
        columns.push("priority = ?");
        values.push(Value::Text(priority.as_str().to_string()));
    }
    if let Some(category) = patch.category {
        columns.push("category = ?");
        values.push(Value::Text(category.as_str().to_string()));
    }
    if let Some(due_date) = patch.due_date {
        columns.push("due_date = ?");
        values.push(due_date.map_or(Value::Null, |d| Value::Text(d.to_string())));
    }
    if let Some(order_index) = patch.order_index {
        columns.push("order_index = ?");
        values.push(Value::Integer(order_index));
    }
    columns.push("updated_at = ?");
    values.push(Value::Text(format_timestamp(updated_at)));

    (columns, values)
}

/// Task record store over one shared SQLite connection.
///
/// Each method holds the connection lock only for its own statements; callers
/// never keep it across an `.await`.
#[derive(Clone)]
pub struct Tasks {
    conn: Arc<Mutex<Connection>>,
}

impl Tasks {
    /// Runs `op` against this store on the blocking pool.
    ///
    /// Store errors are tagged with `context`, the message API clients see.
    /// A blocking task that never returns (it panicked) becomes
    /// [`AppError::Internal`].
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let task = state
    ///     .tasks
    ///     .run(Message::FailedToFetchTask, move |tasks| tasks.get(&id))
    ///     .await?;
    /// ```
    pub async fn run<T, F>(&self, context: Message, op: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tasks) -> Result<T> + Send + 'static,
    {
        let tasks = self.clone();
        tokio::task::spawn_blocking(move || op(&tasks))
            .await
            .map_err(|e| AppError::Internal(Message::StoreTaskFailed(e.to_string()).to_string()))?
            .map_err(AppError::store(context))
    }

    /// Takes ownership of an opened, migrated database.
    pub fn new(db: Db) -> Tasks {
        Tasks {
            conn: Arc::new(Mutex::new(db.conn)),
        }
    }

    /// Filtered and ordered list, same semantics as `libs::filter::apply_query`.
    ///
    /// # Arguments
    ///
    /// * `query` - Status, priority, category and search filters plus the sort key
    ///
    /// # Returns
    ///
    /// Matching tasks ordered by the sort key, then pending before completed,
    /// then `order_index` and `id` so equal keys come back in a stable order.
    pub fn list(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        match query.status {
            StatusFilter::All => {}
            StatusFilter::Completed => clauses.push("completed = TRUE"),
            StatusFilter::Pending => clauses.push("completed = FALSE"),
        }
        if let Some(priority) = query.priority {
            clauses.push("priority = ?");
            values.push(Value::Text(priority.as_str().to_string()));
        }
        if let Some(category) = query.category {
            clauses.push("category = ?");
            values.push(Value::Text(category.as_str().to_string()));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            clauses.push("(title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')");
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM tasks {} {}",
            COLUMNS,
            where_sql,
            order_clause(query.sort_by, query.sort_order)
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt.query_map(params_from_iter(values.iter()), row_to_task)?.collect::<Result<Vec<_>>>()?;

        Ok(tasks)
    }

    /// Every task, newest first.
    pub fn fetch_all(&self) -> Result<Vec<Task>> {
        self.list(&TaskQuery::default())
    }

    /// One task by id, `None` when no row has it.
    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        let conn = self.conn.lock();
        Self::get_locked(&conn, id)
    }

    fn get_locked(conn: &Connection, id: &str) -> Result<Option<Task>> {
        conn.query_row(&format!("SELECT {} FROM tasks WHERE id = ?1", COLUMNS), params![id], row_to_task)
            .optional()
    }

    /// `max(order_index) + 1`, or 1 for an empty table.
    ///
    /// Reading the maximum and inserting are separate calls, so two concurrent
    /// creations can receive the same index.
    pub fn next_order_index(&self) -> Result<i64> {
        let max: i64 = self.conn.lock().query_row(SELECT_MAX_ORDER, [], |row| row.get(0))?;
        Ok(max + 1)
    }

    /// Inserts one task with a fresh UUID and `created_at == updated_at`.
    ///
    /// # Arguments
    ///
    /// * `task` - Validated input with defaults applied
    /// * `order_index` - Usually the value [`Tasks::next_order_index`] just returned
    ///
    /// # Returns
    ///
    /// The stored record, `completed` false.
    pub fn insert(&self, task: &NewTask, order_index: i64) -> Result<Task> {
        let conn = self.conn.lock();
        Self::insert_locked(&conn, task, order_index, timestamp_now())
    }

    fn insert_locked(conn: &Connection, task: &NewTask, order_index: i64, now: DateTime<Utc>) -> Result<Task> {
        let id = Uuid::new_v4().to_string();
        conn.execute(
            INSERT_TASK,
            params![
                id,
                task.title,
                task.description,
                task.priority,
                task.category,
                task.due_date,
                order_index,
                format_timestamp(&now)
            ],
        )?;

        Ok(Task {
            id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: false,
            priority: task.priority,
            category: task.category,
            due_date: task.due_date,
            order_index,
            created_at: now,
            updated_at: now,
        })
    }

    /// Inserts all items atomically with consecutive order indices from `first_index`.
    pub fn insert_many(&self, items: &[NewTask], first_index: i64) -> Result<Vec<Task>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let now = timestamp_now();
        let mut created = Vec::with_capacity(items.len());
        for (offset, item) in items.iter().enumerate() {
            created.push(Self::insert_locked(&tx, item, first_index + offset as i64, now)?);
        }
        tx.commit()?;

        Ok(created)
    }

    /// Applies `patch` and bumps `updated_at`. `None` when no task has `id`.
    pub fn update(&self, id: &str, patch: &TaskPatch) -> Result<Option<Task>> {
        let conn = self.conn.lock();
        Self::update_locked(&conn, id, patch, &timestamp_now())
    }

    fn update_locked(conn: &Connection, id: &str, patch: &TaskPatch, now: &DateTime<Utc>) -> Result<Option<Task>> {
        let (columns, mut values) = patch_assignments(patch, now);
        values.push(Value::Text(id.to_string()));
        let sql = format!("UPDATE tasks SET {} WHERE id = ?", columns.join(", "));

        if conn.execute(&sql, params_from_iter(values.iter()))? == 0 {
            return Ok(None);
        }
        Self::get_locked(conn, id)
    }

    /// Applies one patch per id in a single transaction. Ids that no longer
    /// exist are skipped.
    ///
    /// # Arguments
    ///
    /// * `patches` - Pairs of task id and the patch for that task; patches
    ///   may differ per task, as the assistant's time notes do
    ///
    /// # Returns
    ///
    /// The updated records in input order. Every row shares one `updated_at`.
    pub fn update_each(&self, patches: &[(String, TaskPatch)]) -> Result<Vec<Task>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let now = timestamp_now();
        let mut updated = Vec::with_capacity(patches.len());
        for (id, patch) in patches {
            if let Some(task) = Self::update_locked(&tx, id, patch, &now)? {
                updated.push(task);
            }
        }
        tx.commit()?;

        Ok(updated)
    }

    /// Removes one task. Returns whether a row was deleted.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.conn.lock().execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Deletes every listed id, returning how many rows went away.
    pub fn delete_many(&self, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!("DELETE FROM tasks WHERE id IN ({})", vec!["?"; ids.len()].join(", "));
        self.conn.lock().execute(&sql, params_from_iter(ids.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_order_clause_tie_breakers() {
        let sql = order_clause(SortField::DueDate, SortOrder::Desc);
        assert_eq!(sql, "ORDER BY due_date DESC NULLS FIRST, completed ASC, order_index ASC, id ASC");
    }

    #[tokio::test]
    async fn test_run_tags_store_errors_with_context() {
        let tasks = Tasks::new(Db::in_memory().unwrap());
        let err = tasks
            .run(Message::FailedToFetchTasks, |_| Err::<(), _>(rusqlite::Error::InvalidQuery))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
        assert!(err.to_string().starts_with("Failed to fetch tasks"));

        let count = tasks.run(Message::FailedToFetchTasks, |t| t.fetch_all().map(|all| all.len())).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_run_reports_a_panicked_call_as_internal() {
        let tasks = Tasks::new(Db::in_memory().unwrap());
        let err = tasks
            .run(Message::FailedToFetchTasks, |_| -> Result<()> { panic!("boom") })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_timestamp_text_is_fixed_width() {
        let a = format_timestamp(&timestamp_now());
        assert_eq!(a.len(), "2024-01-01T00:00:00.000000Z".len());
        assert!(a.ends_with('Z'));
    }
}
