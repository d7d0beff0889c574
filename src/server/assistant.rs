use super::handlers::json_body;
use super::response::Envelope;
use super::AppState;
use crate::assistant::ChatReply;
use crate::libs::error::AppResult;
use crate::libs::messages::Message;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

/// `POST /assistant/chat`. Answers 200 whenever a message was given; the
/// envelope's `success` reports whether the chosen action reached the store
/// without error.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let body = json_body(&body)?;
    let Some(message) = body.get("message").and_then(Value::as_str).filter(|m| !m.is_empty()) else {
        let envelope = Envelope::<ChatReply>::failure(Message::AssistantMessageRequired.to_string(), None);
        return Ok((StatusCode::BAD_REQUEST, Json(envelope)).into_response());
    };

    let outcome = state.assistant.handle(message).await?;
    tracing::info!(action = %outcome.reply.action, success = outcome.success, "assistant reply");

    let mut envelope = Envelope::ok(outcome.reply);
    envelope.success = outcome.success;
    Ok(Json(envelope).into_response())
}
