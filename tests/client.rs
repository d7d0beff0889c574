#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use taskpad::api::client::TaskClient;
    use taskpad::api::llm::Disabled;
    use taskpad::db::db::Db;
    use taskpad::db::tasks::Tasks;
    use taskpad::libs::config::ClientConfig;
    use taskpad::libs::task::{NewTask, TaskPatch, TaskQuery};
    use taskpad::server::{router, AppState};
    use test_context::{test_context, AsyncTestContext};
    use tokio::task::JoinHandle;

    struct ServiceContext {
        tasks: Tasks,
        client: TaskClient,
        server: JoinHandle<()>,
    }

    impl AsyncTestContext for ServiceContext {
        async fn setup() -> Self {
            let tasks = Tasks::new(Db::in_memory().unwrap());
            let app = router(AppState::new(tasks.clone(), Arc::new(Disabled)), false);
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let server = tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = TaskClient::new(&ClientConfig {
                api_url: format!("http://{}/", addr),
                stale_secs: 300,
            });
            ServiceContext { tasks, client, server }
        }

        async fn teardown(self) {
            self.server.abort();
        }
    }

    impl ServiceContext {
        /// Writes behind the client's back, so its cache cannot know.
        fn insert_directly(&self, title: &str) {
            let order_index = self.tasks.next_order_index().unwrap();
            self.tasks.insert(&NewTask::new(title), order_index).unwrap();
        }
    }

    #[test_context(ServiceContext)]
    #[tokio::test]
    async fn test_list_is_served_from_cache_until_a_write(ctx: &mut ServiceContext) {
        let query = TaskQuery::default();
        assert!(ctx.client.list(&query).await.unwrap().is_empty());

        ctx.insert_directly("Hidden");
        assert!(ctx.client.list(&query).await.unwrap().is_empty());

        ctx.client.create(&NewTask::new("Visible")).await.unwrap();
        let titles: Vec<String> = ctx.client.list(&query).await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Hidden".to_string()));
        assert!(titles.contains(&"Visible".to_string()));
    }

    #[test_context(ServiceContext)]
    #[tokio::test]
    async fn test_stats_are_refreshed_after_update(ctx: &mut ServiceContext) {
        let task = ctx.client.create(&NewTask::new("Water plants")).await.unwrap();
        assert_eq!(ctx.client.stats().await.unwrap().completed, 0);

        let patch = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };
        let updated = ctx.client.update(&task.id, &patch).await.unwrap();
        assert!(updated.completed);

        assert_eq!(ctx.client.stats().await.unwrap().completed, 1);
        assert!(ctx.client.get(&task.id).await.unwrap().completed);
    }

    #[test_context(ServiceContext)]
    #[tokio::test]
    async fn test_toggle_flips_completion(ctx: &mut ServiceContext) {
        let task = ctx.client.create(&NewTask::new("Call mom")).await.unwrap();

        assert!(ctx.client.toggle(&task.id).await.unwrap().completed);
        assert!(!ctx.client.toggle(&task.id).await.unwrap().completed);
        assert!(!ctx.tasks.get(&task.id).unwrap().unwrap().completed);
    }

    #[test_context(ServiceContext)]
    #[tokio::test]
    async fn test_delete_drops_cached_task(ctx: &mut ServiceContext) {
        let task = ctx.client.create(&NewTask::new("Old errand")).await.unwrap();
        ctx.client.get(&task.id).await.unwrap();

        ctx.client.delete(&task.id).await.unwrap();

        assert!(ctx.client.cache().task(&task.id).is_none());
        let err = ctx.client.get(&task.id).await.unwrap_err();
        assert!(err.to_string().contains("Task not found"));
    }

    #[test_context(ServiceContext)]
    #[tokio::test]
    async fn test_validation_details_reach_the_caller(ctx: &mut ServiceContext) {
        let err = ctx.client.create(&NewTask::new("")).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Invalid input data"));
        assert!(text.contains("title"));
    }

    #[test_context(ServiceContext)]
    #[tokio::test]
    async fn test_chat_without_model_answers_with_apology(ctx: &mut ServiceContext) {
        let outcome = ctx.client.chat("what's up?").await.unwrap();
        assert!(outcome.success);
        assert!(outcome.reply.message.starts_with("Sorry"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = TaskClient::new(&ClientConfig {
            api_url: format!("http://{}", addr),
            stale_secs: 300,
        });
        assert!(client.stats().await.is_err());
    }
}
