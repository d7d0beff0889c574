//! In-memory filtering and ordering of task lists.
//!
//! [`apply_query`] is the reference semantics of the list endpoint; the SQL
//! built in `db::tasks` must return exactly the same sequence. [`refilter`]
//! is the extra pass the terminal views run over a fetched list.

use super::task::{SortField, SortOrder, Task, TaskQuery};
use std::cmp::Ordering;

/// ASCII case-insensitive substring test, the same folding SQLite's `LIKE` applies.
pub fn matches_search(task: &Task, term: &str) -> bool {
    let needle = term.to_ascii_lowercase();
    let hit = |text: &str| text.to_ascii_lowercase().contains(&needle);
    hit(&task.title) || task.description.as_deref().is_some_and(hit)
}

fn matches(task: &Task, query: &TaskQuery) -> bool {
    query.status.accepts(task.completed)
        && query.priority.is_none_or(|p| task.priority == p)
        && query.category.is_none_or(|c| task.category == c)
        && query.search.as_deref().is_none_or(|s| s.is_empty() || matches_search(task, s))
}

/// Order on the requested key alone, direction applied.
fn compare_key(a: &Task, b: &Task, sort_by: SortField, order: SortOrder) -> Ordering {
    let ascending = match sort_by {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortField::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            // Undated tasks go after dated ones when ascending; reversal below
            // puts them first when descending.
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (None, None) => Ordering::Equal,
        },
    };
    match order {
        SortOrder::Asc => ascending,
        SortOrder::Desc => ascending.reverse(),
    }
}

/// Full list ordering: requested key, then incomplete before completed,
/// then `order_index` and `id` ascending.
pub fn compare(a: &Task, b: &Task, sort_by: SortField, order: SortOrder) -> Ordering {
    compare_key(a, b, sort_by, order)
        .then(a.completed.cmp(&b.completed))
        .then(a.order_index.cmp(&b.order_index))
        .then_with(|| a.id.cmp(&b.id))
}

/// Filters and sorts `tasks` the way `GET /tasks` does.
pub fn apply_query(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let mut result: Vec<Task> = tasks.iter().filter(|t| matches(t, query)).cloned().collect();
    result.sort_by(|a, b| compare(a, b, query.sort_by, query.sort_order));
    result
}

/// Client-side pass over an already fetched list: re-applies the filters with
/// Unicode lowercase matching, then orders by priority (high first) and newest first.
pub fn refilter(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let term = query.search.as_deref().unwrap_or_default().to_lowercase();
    let mut result: Vec<Task> = tasks
        .iter()
        .filter(|t| query.status.accepts(t.completed))
        .filter(|t| query.category.is_none_or(|c| t.category == c))
        .filter(|t| query.priority.is_none_or(|p| t.priority == p))
        .filter(|t| {
            term.is_empty()
                || t.title.to_lowercase().contains(&term)
                || t.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&term))
        })
        .cloned()
        .collect();

    result.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()).then(b.created_at.cmp(&a.created_at)));
    result
}
