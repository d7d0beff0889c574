//! HTTP client for a running taskpad service.
//!
//! Every read goes through a [`QueryCache`]; every successful write drops the
//! cached lists and stats so the next read reaches the service.

use crate::assistant::ChatOutcome;
use crate::assistant::ChatReply;
use crate::libs::cache::QueryCache;
use crate::libs::config::ClientConfig;
use crate::libs::messages::Message;
use crate::libs::task::{NewTask, Task, TaskPatch, TaskQuery, TaskStats};
use crate::server::response::Envelope;
use crate::{msg_debug, msg_error_anyhow};
use anyhow::Result;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

#[derive(Clone)]
pub struct TaskClient {
    client: Client,
    base_url: String,
    cache: QueryCache,
}

impl TaskClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            cache: QueryCache::new(Duration::from_secs(config.stale_secs)),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and unwraps the envelope, turning any failure into a
    /// user-facing error.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(error = %e, "request failed");
            msg_error_anyhow!(Message::ServiceUnreachable(self.base_url.clone()))
        })?;

        let status = response.status();
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| msg_error_anyhow!(Message::ServiceError(format!("HTTP {}: {}", status, e))))?;

        if !status.is_success() {
            let error = envelope.error.clone().unwrap_or_else(|| status.to_string());
            let text = match &envelope.details {
                Some(details) => format!("{} ({})", error, details),
                None => error,
            };
            return Err(msg_error_anyhow!(Message::ServiceError(text)));
        }

        Ok(envelope)
    }

    async fn send_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| msg_error_anyhow!(Message::ServiceError("response carried no data".to_string())))
    }

    pub async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        if let Some(tasks) = self.cache.list(query) {
            msg_debug!(Message::CacheHit("list".to_string()));
            return Ok(tasks);
        }

        let request = self.client.get(self.url("/tasks")).query(&query.to_params());
        let tasks: Vec<Task> = self.send_data(request).await?;
        self.cache.put_list(query, tasks.clone());
        Ok(tasks)
    }

    pub async fn get(&self, id: &str) -> Result<Task> {
        if let Some(task) = self.cache.task(id) {
            msg_debug!(Message::CacheHit(format!("task {}", id)));
            return Ok(task);
        }

        let task: Task = self.send_data(self.client.get(self.url(&format!("/tasks/{}", id)))).await?;
        self.cache.put_task(task.clone());
        Ok(task)
    }

    pub async fn create(&self, task: &NewTask) -> Result<Task> {
        let created: Task = self.send_data(self.client.post(self.url("/tasks")).json(task)).await?;
        self.cache.invalidate_lists();
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let request = self.client.put(self.url(&format!("/tasks/{}", id))).json(&patch.to_json());
        let updated: Task = self.send_data(request).await?;
        self.cache.invalidate_lists();
        self.cache.put_task(updated.clone());
        Ok(updated)
    }

    /// Flips the completion flag of the task as currently known.
    pub async fn toggle(&self, id: &str) -> Result<Task> {
        let current = self.get(id).await?;
        let patch = TaskPatch {
            completed: Some(!current.completed),
            ..TaskPatch::default()
        };
        self.update(id, &patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.send::<serde_json::Value>(self.client.delete(self.url(&format!("/tasks/{}", id))))
            .await?;
        self.cache.invalidate_lists();
        self.cache.invalidate_task(id);
        Ok(())
    }

    pub async fn stats(&self) -> Result<TaskStats> {
        if let Some(stats) = self.cache.stats() {
            msg_debug!(Message::CacheHit("stats".to_string()));
            return Ok(stats);
        }

        let stats: TaskStats = self.send_data(self.client.get(self.url("/tasks/stats"))).await?;
        self.cache.put_stats(stats.clone());
        Ok(stats)
    }

    /// Sends one chat message. A reply that may have changed tasks clears the whole cache.
    pub async fn chat(&self, message: &str) -> Result<ChatOutcome> {
        let request = self.client.post(self.url("/assistant/chat")).json(&json!({ "message": message }));
        let envelope: Envelope<ChatReply> = self.send(request).await?;
        let reply = envelope
            .data
            .ok_or_else(|| msg_error_anyhow!(Message::ServiceError("response carried no data".to_string())))?;

        if reply.action.mutates() {
            self.cache.clear();
        }

        Ok(ChatOutcome {
            success: envelope.success,
            reply,
        })
    }
}
