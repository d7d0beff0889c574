//! Chat-completion client.
//!
//! The assistant talks to the model through the [`ChatCompletion`] trait so
//! tests can script replies. [`OpenAiCompatible`] is the production
//! implementation and works with any `/chat/completions` endpoint (Groq,
//! OpenAI, Ollama, vLLM and the like).

use crate::libs::config::LlmConfig;
use crate::libs::messages::Message;
use crate::msg_debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling settings for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("chat completion endpoint is not configured")]
    NotConfigured,
    #[error("chat completion request failed: {0}")]
    RequestFailed(String),
    #[error("chat completion response could not be parsed: {0}")]
    ParseError(String),
    #[error("chat completion request timed out")]
    Timeout,
    #[error("chat completion endpoint unreachable: {0}")]
    Unreachable(String),
}

#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends the conversation and returns the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage], params: &CompletionParams) -> Result<String, LlmError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

pub struct OpenAiCompatible {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompatible {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.base_url.trim().is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait::async_trait]
impl ChatCompletion for OpenAiCompatible {
    async fn complete(&self, messages: &[ChatMessage], params: &CompletionParams) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        msg_debug!(Message::LlmRequestStarted(self.model.clone()));

        let mut req = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else if e.is_connect() {
                LlmError::Unreachable(e.to_string())
            } else {
                LlmError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let reply: ChatCompletionResponse = response.json().await.map_err(|e| LlmError::ParseError(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::ParseError("no content in response".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Stand-in used when no endpoint is configured. Every call fails, so the
/// assistant answers with its fallback texts.
pub struct Disabled;

#[async_trait::async_trait]
impl ChatCompletion for Disabled {
    async fn complete(&self, _messages: &[ChatMessage], _params: &CompletionParams) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }

    fn model(&self) -> &str {
        "none"
    }
}

/// Builds the configured client, or [`Disabled`] when that is impossible.
pub fn from_config_or_disabled(config: &LlmConfig) -> std::sync::Arc<dyn ChatCompletion> {
    match OpenAiCompatible::from_config(config) {
        Ok(llm) => std::sync::Arc::new(llm),
        Err(e) => {
            tracing::warn!(error = %e, "{}", Message::LlmNotConfigured);
            std::sync::Arc::new(Disabled)
        }
    }
}
