//! Outbound HTTP: the chat-completion model used by the assistant and the
//! client the terminal front-end uses to reach a running service.

pub mod client;
pub mod llm;

pub use client::TaskClient;
pub use llm::{ChatCompletion, OpenAiCompatible};
