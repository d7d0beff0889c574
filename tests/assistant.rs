#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use taskpad::api::llm::{ChatCompletion, ChatMessage, CompletionParams, LlmError};
    use taskpad::assistant::{ActionResult, Assistant, Intent};
    use taskpad::db::db::Db;
    use taskpad::db::tasks::Tasks;
    use taskpad::libs::task::{Category, NewTask, Priority, Task, TaskPatch};
    use test_context::{test_context, AsyncTestContext};

    type StoreEdit = Box<dyn FnOnce() + Send>;

    /// Replays queued replies and records every call.
    #[derive(Default)]
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: Mutex<Vec<(Vec<ChatMessage>, CompletionParams)>>,
        during_call: Mutex<Option<StoreEdit>>,
    }

    impl ScriptedModel {
        fn reply(&self, text: &str) {
            self.replies.lock().push_back(Ok(text.to_string()));
        }

        fn fail(&self, error: LlmError) {
            self.replies.lock().push_back(Err(error));
        }

        /// Runs `edit` inside the next call, before its reply is returned.
        fn meanwhile(&self, edit: impl FnOnce() + Send + 'static) {
            *self.during_call.lock() = Some(Box::new(edit));
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl ChatCompletion for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage], params: &CompletionParams) -> Result<String, LlmError> {
            self.calls.lock().push((messages.to_vec(), *params));
            let edit = self.during_call.lock().take();
            if let Some(edit) = edit {
                edit();
            }
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::RequestFailed("no scripted reply".to_string())))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct AssistantContext {
        tasks: Tasks,
        model: Arc<ScriptedModel>,
        assistant: Assistant,
    }

    impl AsyncTestContext for AssistantContext {
        async fn setup() -> Self {
            let tasks = Tasks::new(Db::in_memory().unwrap());
            let model = Arc::new(ScriptedModel::default());
            let assistant = Assistant::new(tasks.clone(), model.clone());
            AssistantContext { tasks, model, assistant }
        }
    }

    impl AssistantContext {
        fn add(&self, title: &str, category: Category, due_date: Option<NaiveDate>) -> Task {
            let task = NewTask {
                title: title.to_string(),
                description: Some(format!("{} notes", title)),
                priority: Priority::High,
                category,
                due_date,
            };
            let order_index = self.tasks.next_order_index().unwrap();
            self.tasks.insert(&task, order_index).unwrap()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_exercise_done_updates_only_completed(ctx: &mut AssistantContext) {
        let workout = ctx.add("아침 운동", Category::Health, Some(today()));
        let other = ctx.add("Shopping", Category::Shopping, None);
        ctx.model.reply(
            r#"{"action":"UPDATE","data":{"conditions":{"title":"운동","completed":false},"updates":{"completed":true}},"message":"운동 완료!"}"#,
        );

        let outcome = ctx.assistant.handle_at("운동 완료했어", today()).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.reply.action, Intent::Update);
        assert_eq!(outcome.reply.message, "운동 완료!");
        match outcome.reply.result {
            Some(ActionResult::Updated { updated, .. }) => assert_eq!(updated.len(), 1),
            other => panic!("unexpected result {:?}", other),
        }

        let after = ctx.tasks.get(&workout.id).unwrap().unwrap();
        assert!(after.completed);
        assert_eq!(after.title, workout.title);
        assert_eq!(after.description, workout.description);
        assert_eq!(after.priority, workout.priority);
        assert_eq!(after.category, workout.category);
        assert_eq!(after.due_date, workout.due_date);
        assert_eq!(after.order_index, workout.order_index);
        assert_eq!(after.created_at, workout.created_at);

        assert_eq!(ctx.tasks.get(&other.id).unwrap().unwrap(), other);
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_unparseable_reply_is_read_without_writes(ctx: &mut AssistantContext) {
        ctx.add("Pay rent", Category::Personal, None);
        let before = ctx.tasks.fetch_all().unwrap();
        ctx.model.reply("I think you should take a rest today.");

        let outcome = ctx.assistant.handle_at("delete everything", today()).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.reply.action, Intent::Read);
        assert_eq!(outcome.reply.message, "I think you should take a rest today.");
        assert_eq!(ctx.model.call_count(), 1);
        assert_eq!(ctx.tasks.fetch_all().unwrap(), before);
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_model_failure_answers_with_apology(ctx: &mut AssistantContext) {
        ctx.model.fail(LlmError::Timeout);

        let outcome = ctx.assistant.handle_at("what's up?", today()).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.reply.action, Intent::Read);
        assert!(outcome.reply.message.starts_with("Sorry"));
        assert!(ctx.tasks.fetch_all().unwrap().is_empty());
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_create_resolves_dates_and_skips_invalid_items(ctx: &mut AssistantContext) {
        ctx.add("existing", Category::Work, None);
        ctx.model.reply(
            r#"Here you go: {"action":"CREATE","data":{"tasks":[
                {"title":"밥먹기","category":"personal","due_date":"오늘"},
                {"title":"","category":"health"},
                {"title":"운동","category":"health","priority":"high","due_date":"tomorrow"},
                {"title":"쇼핑","category":"errands"}
            ]},"message":"추가했어요"}"#,
        );

        let outcome = ctx.assistant.handle_at("밥먹고 운동하고 쇼핑갈거야", today()).await.unwrap();

        let created = match outcome.reply.result {
            Some(ActionResult::Created { created, .. }) => created,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].title, "밥먹기");
        assert_eq!(created[0].due_date, Some(today()));
        assert_eq!(created[0].priority, Priority::Medium);
        assert_eq!(created[1].due_date, today().succ_opt());
        assert_eq!(created[1].category, Category::Health);
        assert_eq!((created[0].order_index, created[1].order_index), (2, 3));
        assert_eq!(ctx.tasks.fetch_all().unwrap().len(), 3);
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_delete_matches_all_conditions(ctx: &mut AssistantContext) {
        let keep = ctx.add("Buy shoes", Category::Shopping, None);
        let gone = ctx.add("Buy milk", Category::Shopping, Some(today()));
        ctx.add("Buy time", Category::Work, Some(today()));
        ctx.model
            .reply(r#"{"action":"DELETE","data":{"conditions":{"category":"shopping","due_date":"today"}},"message":"Removed"}"#);

        let outcome = ctx.assistant.handle_at("cancel today's shopping", today()).await.unwrap();

        match outcome.reply.result {
            Some(ActionResult::Deleted { deleted, message }) => {
                assert_eq!(deleted.len(), 1);
                assert_eq!(deleted[0].id, gone.id);
                assert_eq!(message, "1 task(s) deleted");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(ctx.tasks.get(&keep.id).unwrap().is_some());
        assert!(ctx.tasks.get(&gone.id).unwrap().is_none());
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_unsupported_condition_key_mutates_nothing(ctx: &mut AssistantContext) {
        ctx.add("Buy milk", Category::Shopping, None);
        let before = ctx.tasks.fetch_all().unwrap();
        ctx.model
            .reply(r#"{"action":"DELETE","data":{"conditions":{"priority":"high"}},"message":"Deleting high priority"}"#);

        let outcome = ctx.assistant.handle_at("delete high priority", today()).await.unwrap();

        match outcome.reply.result {
            Some(ActionResult::Nothing { message }) => assert!(message.contains("'priority'")),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(ctx.tasks.fetch_all().unwrap(), before);
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_empty_conditions_are_rejected(ctx: &mut AssistantContext) {
        ctx.add("Buy milk", Category::Shopping, None);
        let before = ctx.tasks.fetch_all().unwrap();
        ctx.model
            .reply(r#"{"action":"UPDATE","data":{"conditions":{},"updates":{"completed":true}},"message":"All done"}"#);

        let outcome = ctx.assistant.handle_at("mark everything done", today()).await.unwrap();

        assert!(matches!(outcome.reply.result, Some(ActionResult::Nothing { .. })));
        assert_eq!(ctx.tasks.fetch_all().unwrap(), before);
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_time_is_folded_into_description(ctx: &mut AssistantContext) {
        let meeting = ctx.add("Team meeting", Category::Work, Some(today()));
        ctx.model.reply(
            r#"{"action":"UPDATE","data":{"conditions":{"title":"meeting"},"updates":{"time":"15:00"}},"message":"Time set"}"#,
        );

        ctx.assistant.handle_at("the meeting is at 3pm", today()).await.unwrap();

        let after = ctx.tasks.get(&meeting.id).unwrap().unwrap();
        assert_eq!(after.description.as_deref(), Some("Team meeting notes (time: 15:00)"));
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_read_runs_a_second_lower_temperature_call(ctx: &mut AssistantContext) {
        ctx.add("Run", Category::Health, Some(today()));
        ctx.model
            .reply(r#"{"action":"READ","data":{"query":"today"},"message":"Let me check"}"#);
        ctx.model.reply("## Today\n- **Run**");

        let outcome = ctx.assistant.handle_at("what's on today?", today()).await.unwrap();

        assert_eq!(outcome.reply.action, Intent::Read);
        assert_eq!(outcome.reply.message, "## Today\n- **Run**");
        match outcome.reply.result {
            Some(ActionResult::Read { stats, .. }) => {
                assert_eq!(stats.tasks.total, 1);
                assert_eq!(stats.today_total, 1);
            }
            other => panic!("unexpected result {:?}", other),
        }

        let calls = ctx.model.calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.temperature, 0.7);
        assert_eq!(calls[0].1.max_tokens, 1000);
        assert_eq!(calls[1].1.temperature, 0.3);
        assert!(calls[0].0[0].content.contains("\"todayTasks\""));
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_read_falls_back_to_template(ctx: &mut AssistantContext) {
        ctx.add("Run", Category::Health, Some(today()));
        ctx.model
            .reply(r#"{"action":"READ","data":{"query":"today"},"message":"Let me check"}"#);
        ctx.model.fail(LlmError::Unreachable("offline".to_string()));

        let outcome = ctx.assistant.handle_at("오늘 할 일 뭐야?", today()).await.unwrap();

        assert!(outcome.success);
        assert!(outcome.reply.message.starts_with("## 📋 Today's tasks (2024-05-10)"));
        assert!(outcome.reply.message.contains("- **Run** (health, high)"));
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_update_matches_tasks_added_while_the_model_answers(ctx: &mut AssistantContext) {
        let first = ctx.add("운동 1", Category::Health, Some(today()));
        let tasks = ctx.tasks.clone();
        let late = Arc::new(Mutex::new(None));
        let slot = late.clone();
        ctx.model.meanwhile(move || {
            let task = NewTask {
                title: "운동 2".to_string(),
                description: None,
                priority: Priority::Low,
                category: Category::Health,
                due_date: None,
            };
            let order_index = tasks.next_order_index().unwrap();
            *slot.lock() = Some(tasks.insert(&task, order_index).unwrap());
        });
        ctx.model.reply(
            r#"{"action":"UPDATE","data":{"conditions":{"title":"운동"},"updates":{"completed":true}},"message":"done"}"#,
        );

        let outcome = ctx.assistant.handle_at("운동 다 했어", today()).await.unwrap();

        match outcome.reply.result {
            Some(ActionResult::Updated { updated, .. }) => assert_eq!(updated.len(), 2),
            other => panic!("unexpected result {:?}", other),
        }
        let late = late.lock().clone().unwrap();
        assert!(ctx.tasks.get(&first.id).unwrap().unwrap().completed);
        assert!(ctx.tasks.get(&late.id).unwrap().unwrap().completed);
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_delete_skips_tasks_that_stopped_matching(ctx: &mut AssistantContext) {
        let finished_meanwhile = ctx.add("Laundry", Category::Personal, None);
        let still_open = ctx.add("Dishes", Category::Personal, None);
        let tasks = ctx.tasks.clone();
        let id = finished_meanwhile.id.clone();
        ctx.model.meanwhile(move || {
            let patch = TaskPatch {
                completed: Some(true),
                ..Default::default()
            };
            tasks.update(&id, &patch).unwrap();
        });
        ctx.model.reply(
            r#"{"action":"DELETE","data":{"conditions":{"completed":false}},"message":"cleared"}"#,
        );

        let outcome = ctx.assistant.handle_at("clear my open tasks", today()).await.unwrap();

        match outcome.reply.result {
            Some(ActionResult::Deleted { deleted, .. }) => {
                assert_eq!(deleted.len(), 1);
                assert_eq!(deleted[0].id, still_open.id);
            }
            other => panic!("unexpected result {:?}", other),
        }
        let kept = ctx.tasks.get(&finished_meanwhile.id).unwrap().unwrap();
        assert!(kept.completed);
        assert!(ctx.tasks.get(&still_open.id).unwrap().is_none());
    }

    #[test_context(AssistantContext)]
    #[tokio::test]
    async fn test_time_fold_keeps_a_description_edited_meanwhile(ctx: &mut AssistantContext) {
        let meeting = ctx.add("Team meeting", Category::Work, Some(today()));
        let tasks = ctx.tasks.clone();
        let id = meeting.id.clone();
        ctx.model.meanwhile(move || {
            let patch = TaskPatch {
                description: Some(Some("room 4".to_string())),
                ..Default::default()
            };
            tasks.update(&id, &patch).unwrap();
        });
        ctx.model.reply(
            r#"{"action":"UPDATE","data":{"conditions":{"title":"meeting"},"updates":{"time":"15:00"}},"message":"Time set"}"#,
        );

        ctx.assistant.handle_at("the meeting is at 3pm", today()).await.unwrap();

        let after = ctx.tasks.get(&meeting.id).unwrap().unwrap();
        assert_eq!(after.description.as_deref(), Some("room 4 (time: 15:00)"));
    }
}
