//! Task CRUD routes.
//!
//! Handlers validate first, then hand the store call to [`Tasks::run`] so
//! SQLite work never runs on an async worker thread. Each store failure is
//! tagged with the generic message its route reports.
//!
//! [`Tasks::run`]: crate::db::tasks::Tasks::run

use super::response::Envelope;
use super::AppState;
use crate::libs::error::{AppError, AppResult};
use crate::libs::messages::Message;
use crate::libs::task::{Task, TaskStats};
use crate::libs::validation::{validate_create, validate_query, validate_update, ValidationError};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Bodies are read as raw bytes so malformed JSON gets the same 400 envelope
/// as any other invalid input.
pub(super) fn json_body(body: &Bytes) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|e| ValidationError::single("body", format!("is not valid JSON ({})", e)))
}

/// `GET /health`. Answers without touching the store.
pub async fn health() -> Json<Envelope<Value>> {
    Json(Envelope::ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// `GET /tasks`. Query keys: `status`, `priority`, `category`, `search`,
/// `sortBy`, `sortOrder`. An unknown value for any enum key is a 400.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<Vec<Task>>>> {
    let query = validate_query(&params)?;
    let tasks = state
        .tasks
        .run(Message::FailedToFetchTasks, move |tasks| tasks.list(&query))
        .await?;
    let count = tasks.len();
    Ok(Json(Envelope::ok(tasks).with_count(count)))
}

/// `POST /tasks`. Answers 201 with the stored task.
pub async fn create_task(State(state): State<AppState>, body: Bytes) -> AppResult<(StatusCode, Json<Envelope<Task>>)> {
    let input = validate_create(&json_body(&body)?)?;

    // Read-then-insert is two separate store calls; two concurrent creates
    // may share an order_index.
    let order_index = state
        .tasks
        .run(Message::FailedToCreateTask, |tasks| tasks.next_order_index())
        .await?;
    let task = state
        .tasks
        .run(Message::FailedToCreateTask, move |tasks| tasks.insert(&input, order_index))
        .await?;

    tracing::info!(id = %task.id, order_index, "task created");
    Ok((StatusCode::CREATED, Json(Envelope::ok(task))))
}

pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Envelope<Task>>> {
    let task = state.tasks.run(Message::FailedToFetchTask, move |tasks| tasks.get(&id)).await?;
    task.map(|task| Json(Envelope::ok(task))).ok_or(AppError::NotFound)
}

/// `PUT /tasks/{id}`. The body is validated before the id is looked up, so
/// an invalid body is a 400 even for an unknown id.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Envelope<Task>>> {
    let patch = validate_update(&json_body(&body)?)?;
    let task = state
        .tasks
        .run(Message::FailedToUpdateTask, move |tasks| tasks.update(&id, &patch))
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(id = %task.id, "task updated");
    Ok(Json(Envelope::ok(task)))
}

/// `DELETE /tasks/{id}`. Succeeds whether or not the id existed.
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Envelope<()>>> {
    let target = id.clone();
    let removed = state
        .tasks
        .run(Message::FailedToDeleteTask, move |tasks| tasks.delete(&target))
        .await?;
    tracing::info!(id = %id, removed, "task delete");
    Ok(Json(Envelope::message(Message::TaskDeletedSuccessfully.to_string())))
}

/// `GET /tasks/stats`.
pub async fn task_stats(State(state): State<AppState>) -> AppResult<Json<Envelope<TaskStats>>> {
    let stats = state
        .tasks
        .run(Message::FailedToFetchStats, |tasks| tasks.fetch_all().map(|all| TaskStats::from_tasks(&all)))
        .await?;
    Ok(Json(Envelope::ok(stats)))
}
