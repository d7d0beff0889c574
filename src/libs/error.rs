use crate::api::llm::LlmError;
use crate::libs::messages::Message;
use crate::libs::validation::ValidationError;
use thiserror::Error;

/// Failures of the task service, classified by how a caller should react.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before reaching the store.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{}", Message::TaskNotFound)]
    NotFound,

    /// The store failed. `context` is the generic text shown to clients;
    /// the source is only logged.
    #[error("{context}: {source}")]
    Store {
        context: Message,
        #[source]
        source: rusqlite::Error,
    },

    /// A store call could not be run to completion, e.g. its blocking task panicked.
    #[error("{0}")]
    Internal(String),

    /// The chat-completion service failed. The assistant recovers from these
    /// itself, so they never become an HTTP status.
    #[error(transparent)]
    ExternalService(#[from] LlmError),
}

impl AppError {
    /// Adapter for `map_err` that tags a store error with its client-facing message.
    pub fn store(context: Message) -> impl FnOnce(rusqlite::Error) -> AppError {
        move |source| AppError::Store { context, source }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_keeps_generic_context() {
        let err = Err::<(), _>(rusqlite::Error::InvalidQuery).map_err(AppError::store(Message::FailedToFetchTasks)).unwrap_err();
        match &err {
            AppError::Store { context, .. } => assert_eq!(context.to_string(), "Failed to fetch tasks"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().starts_with("Failed to fetch tasks: "));
    }

    #[test]
    fn test_not_found_text() {
        assert_eq!(AppError::NotFound.to_string(), "Task not found");
    }
}
