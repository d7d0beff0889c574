//! Client-side query cache.
//!
//! Reads made by [`crate::api::client::TaskClient`] are kept for a staleness
//! window keyed by the operation and its arguments. Mutations drop the keys
//! they can affect instead of patching cached lists.

use crate::libs::task::{Task, TaskQuery, TaskStats};
use moka::sync::Cache;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    List(TaskQuery),
    Task(String),
    Stats,
}

impl CacheKey {
    /// Keys whose answer depends on the whole task set.
    fn is_aggregate(&self) -> bool {
        matches!(self, CacheKey::List(_) | CacheKey::Stats)
    }
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    List(Vec<Task>),
    Task(Task),
    Stats(TaskStats),
}

#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<CacheKey, CachedValue>,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        let entries = Cache::builder()
            .time_to_live(stale_after)
            .support_invalidation_closures()
            .build();
        Self { entries }
    }

    pub fn list(&self, query: &TaskQuery) -> Option<Vec<Task>> {
        match self.entries.get(&CacheKey::List(query.clone()))? {
            CachedValue::List(tasks) => Some(tasks),
            _ => None,
        }
    }

    pub fn put_list(&self, query: &TaskQuery, tasks: Vec<Task>) {
        self.entries.insert(CacheKey::List(query.clone()), CachedValue::List(tasks));
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        match self.entries.get(&CacheKey::Task(id.to_string()))? {
            CachedValue::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn put_task(&self, task: Task) {
        self.entries.insert(CacheKey::Task(task.id.clone()), CachedValue::Task(task));
    }

    pub fn stats(&self) -> Option<TaskStats> {
        match self.entries.get(&CacheKey::Stats)? {
            CachedValue::Stats(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn put_stats(&self, stats: TaskStats) {
        self.entries.insert(CacheKey::Stats, CachedValue::Stats(stats));
    }

    /// Drops every list and the stats, leaving per-task entries alone.
    pub fn invalidate_lists(&self) {
        if let Err(e) = self.entries.invalidate_entries_if(|key, _| key.is_aggregate()) {
            tracing::warn!(error = %e, "falling back to a full cache clear");
            self.entries.invalidate_all();
        }
    }

    pub fn invalidate_task(&self, id: &str) {
        self.entries.invalidate(&CacheKey::Task(id.to_string()));
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
