//! The JSON envelope every route answers with.
//!
//! Successes carry `data`, plus `count` for lists or `message` for deletes.
//! Failures carry `error` and, for validation failures, `details`. Store
//! errors are logged with their source but answered with a fixed message,
//! so SQL text never leaves the process.

use crate::libs::error::AppError;
use crate::libs::messages::Message;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// `{ success, data?, count?, message?, error?, details? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T> Envelope<T> {
    /// A success carrying `data`.
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            count: None,
            message: None,
            error: None,
            details: None,
        }
    }

    /// Adds the number of items, as list responses do.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// A failure with a user-facing `error` and optional `details`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let body = Envelope::<()>::failure("Invalid input data", Some("title: is required".into()));
    /// assert!(!body.success);
    /// ```
    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            count: None,
            message: None,
            error: Some(error.into()),
            details,
        }
    }
}

impl Envelope<()> {
    /// A success carrying only a message, as returned by delete.
    pub fn message(message: impl Into<String>) -> Self {
        Envelope {
            success: true,
            data: None,
            count: None,
            message: Some(message.into()),
            error: None,
            details: None,
        }
    }
}

/// Maps each error kind to its status: validation 400, not found 404,
/// everything else 500.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(e) => {
                tracing::debug!(details = %e, "request rejected");
                (
                    StatusCode::BAD_REQUEST,
                    Envelope::<()>::failure(Message::InvalidInputData.to_string(), Some(e.to_string())),
                )
            }
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Envelope::failure(Message::TaskNotFound.to_string(), None),
            ),
            AppError::Store { context, source } => {
                tracing::error!(error = %source, "{}", context);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::failure(context.to_string(), None),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "store call did not complete");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::failure(Message::InternalServerError.to_string(), None),
                )
            }
            AppError::ExternalService(e) => {
                tracing::error!(error = %e, "chat completion error reached the HTTP layer");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::failure(Message::InternalServerError.to_string(), None),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::validation::ValidationError;
    use serde_json::json;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_400_with_details() {
        let response = AppError::from(ValidationError::single("title", "is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(response).await,
            json!({"success": false, "error": "Invalid input data", "details": "title: is required"})
        );
    }

    #[tokio::test]
    async fn test_store_error_hides_source() {
        let response = AppError::Store {
            context: Message::FailedToCreateTask,
            source: rusqlite::Error::InvalidQuery,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, json!({"success": false, "error": "Failed to create task"}));
    }

    #[tokio::test]
    async fn test_internal_error_is_generic_500() {
        let response = AppError::Internal(Message::StoreTaskFailed("task panicked".to_string()).to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, json!({"success": false, "error": "Internal server error"}));
    }

    #[test]
    fn test_list_envelope_shape() {
        let value = serde_json::to_value(Envelope::ok(vec![1, 2]).with_count(2)).unwrap();
        assert_eq!(value, json!({"success": true, "data": [1, 2], "count": 2}));
    }
}
