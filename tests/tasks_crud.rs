#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;
    use taskpad::db::db::Db;
    use taskpad::db::tasks::Tasks;
    use taskpad::libs::filter::apply_query;
    use taskpad::libs::task::{Category, NewTask, Priority, SortField, SortOrder, StatusFilter, TaskPatch, TaskQuery};
    use taskpad::libs::validation::validate_create;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct StoreContext {
        _temp_dir: TempDir,
        tasks: Tasks,
    }

    impl TestContext for StoreContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(&temp_dir.path().join("taskpad.db")).unwrap();
            StoreContext {
                tasks: Tasks::new(db),
                _temp_dir: temp_dir,
            }
        }
    }

    impl StoreContext {
        fn create(&self, task: NewTask) -> taskpad::libs::task::Task {
            let order_index = self.tasks.next_order_index().unwrap();
            self.tasks.insert(&task, order_index).unwrap()
        }

        fn seed(&self) {
            let date = |d| NaiveDate::from_ymd_opt(2024, 5, d);
            let items = [
                ("Write report", Some("quarterly numbers"), Priority::High, Category::Work, date(10)),
                ("Buy milk", None, Priority::Low, Category::Shopping, None),
                ("Morning run", Some("5 km 100% effort"), Priority::Medium, Category::Health, date(9)),
                ("Read a book", Some("Rust REPORT chapter"), Priority::Low, Category::Learning, date(12)),
                ("Call mom", None, Priority::High, Category::Personal, None),
                ("Plan_sprint", None, Priority::Medium, Category::Work, date(10)),
            ];
            for (title, description, priority, category, due_date) in items {
                self.create(NewTask {
                    title: title.to_string(),
                    description: description.map(str::to_string),
                    priority,
                    category,
                    due_date,
                });
            }
            let run = self
                .tasks
                .fetch_all()
                .unwrap()
                .into_iter()
                .find(|t| t.title == "Morning run")
                .unwrap();
            let done = TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            };
            self.tasks.update(&run.id, &done).unwrap();
        }
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_create_then_get_round_trip(ctx: &mut StoreContext) {
        let input = NewTask {
            title: "Water the plants".to_string(),
            description: Some("balcony first".to_string()),
            priority: Priority::High,
            category: Category::Personal,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        };
        let created = ctx.create(input.clone());
        let fetched = ctx.tasks.get(&created.id).unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, input.title);
        assert_eq!(fetched.description, input.description);
        assert_eq!(fetched.priority, input.priority);
        assert_eq!(fetched.category, input.category);
        assert_eq!(fetched.due_date, input.due_date);
        assert!(!fetched.completed);
        assert!(!fetched.id.is_empty());
        assert_eq!(fetched.order_index, 1);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_defaults_are_applied_on_create(ctx: &mut StoreContext) {
        let input = validate_create(&json!({"title": "Just a title"})).unwrap();
        let created = ctx.create(input);

        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.category, Category::Personal);
        assert!(Priority::ALL.contains(&created.priority));
        assert!(Category::ALL.contains(&created.category));
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_order_index_follows_maximum(ctx: &mut StoreContext) {
        let first = ctx.create(NewTask::new("one"));
        let second = ctx.create(NewTask::new("two"));
        ctx.tasks
            .update(
                &second.id,
                &TaskPatch {
                    order_index: Some(10),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        let third = ctx.create(NewTask::new("three"));

        assert_eq!(first.order_index, 1);
        assert_eq!(second.order_index, 2);
        assert_eq!(third.order_index, 11);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_two_creates_without_a_read_between_may_share_order_index(ctx: &mut StoreContext) {
        ctx.create(NewTask::new("existing"));

        // Both requests read the maximum before either inserts.
        let a_index = ctx.tasks.next_order_index().unwrap();
        let b_index = ctx.tasks.next_order_index().unwrap();
        let a = ctx.tasks.insert(&NewTask::new("a"), a_index).unwrap();
        let b = ctx.tasks.insert(&NewTask::new("b"), b_index).unwrap();

        assert_eq!(a.order_index, 2);
        assert_eq!(b.order_index, 2);
        assert_ne!(a.id, b.id);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_update_of_missing_id_changes_nothing(ctx: &mut StoreContext) {
        ctx.seed();
        let before = ctx.tasks.fetch_all().unwrap();

        let patch = TaskPatch {
            title: Some("renamed".to_string()),
            completed: Some(true),
            ..TaskPatch::default()
        };
        assert_eq!(ctx.tasks.update("no-such-id", &patch).unwrap(), None);

        assert_eq!(ctx.tasks.fetch_all().unwrap(), before);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_partial_update_leaves_other_fields(ctx: &mut StoreContext) {
        let created = ctx.create(NewTask {
            title: "Dentist".to_string(),
            description: Some("bring card".to_string()),
            due_date: NaiveDate::from_ymd_opt(2024, 7, 2),
            ..NewTask::default()
        });

        let patch = TaskPatch {
            priority: Some(Priority::High),
            due_date: Some(None),
            ..TaskPatch::default()
        };
        let updated = ctx.tasks.update(&created.id, &patch).unwrap().unwrap();

        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_deleted_task_is_gone_everywhere(ctx: &mut StoreContext) {
        ctx.seed();
        let victim = ctx.tasks.fetch_all().unwrap().remove(0);

        assert!(ctx.tasks.delete(&victim.id).unwrap());
        assert_eq!(ctx.tasks.get(&victim.id).unwrap(), None);

        let queries = [
            TaskQuery::default(),
            TaskQuery {
                status: StatusFilter::Pending,
                ..TaskQuery::default()
            },
            TaskQuery {
                search: Some(victim.title.clone()),
                ..TaskQuery::default()
            },
        ];
        for query in &queries {
            assert!(ctx.tasks.list(query).unwrap().iter().all(|t| t.id != victim.id));
        }

        // A second delete is not an error, it just removes nothing.
        assert!(!ctx.tasks.delete(&victim.id).unwrap());
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_list_matches_in_memory_filter(ctx: &mut StoreContext) {
        ctx.seed();
        let all = ctx.tasks.fetch_all().unwrap();

        let statuses = [StatusFilter::All, StatusFilter::Completed, StatusFilter::Pending];
        let priorities = [None, Some(Priority::High), Some(Priority::Low)];
        let categories = [None, Some(Category::Work), Some(Category::Health)];
        let searches = [None, Some("report"), Some("100%"), Some("_"), Some("nothing matches this")];
        let sorts = [SortField::CreatedAt, SortField::UpdatedAt, SortField::Priority, SortField::DueDate];
        let orders = [SortOrder::Asc, SortOrder::Desc];

        let mut checked = 0;
        for status in statuses {
            for priority in priorities {
                for category in categories {
                    for search in searches {
                        for sort_by in sorts {
                            for sort_order in orders {
                                let query = TaskQuery {
                                    status,
                                    priority,
                                    category,
                                    search: search.map(str::to_string),
                                    sort_by,
                                    sort_order,
                                };
                                assert_eq!(ctx.tasks.list(&query).unwrap(), apply_query(&all, &query), "{:?}", query);
                                checked += 1;
                            }
                        }
                    }
                }
            }
        }
        assert_eq!(checked, 3 * 3 * 3 * 5 * 4 * 2);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_search_wildcards_are_literal(ctx: &mut StoreContext) {
        ctx.seed();

        let query = |term: &str| TaskQuery {
            search: Some(term.to_string()),
            ..TaskQuery::default()
        };
        let titles = |term: &str| -> Vec<String> { ctx.tasks.list(&query(term)).unwrap().into_iter().map(|t| t.title).collect() };

        assert_eq!(titles("_"), vec!["Plan_sprint".to_string()]);
        assert_eq!(titles("100%"), vec!["Morning run".to_string()]);
        assert_eq!(titles("REPORT").len(), 2);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_due_date_ascending_order(ctx: &mut StoreContext) {
        ctx.seed();
        let query = TaskQuery {
            sort_by: SortField::DueDate,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let titles: Vec<String> = ctx.tasks.list(&query).unwrap().into_iter().map(|t| t.title).collect();

        assert_eq!(titles[0], "Morning run");
        assert_eq!(&titles[1..3], ["Write report".to_string(), "Plan_sprint".to_string()]);
        assert_eq!(titles[3], "Read a book");
        // Undated tasks come last when ascending.
        assert!(titles[4..].contains(&"Buy milk".to_string()));
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_insert_many_uses_consecutive_indices(ctx: &mut StoreContext) {
        ctx.create(NewTask::new("first"));
        let start = ctx.tasks.next_order_index().unwrap();
        let created = ctx
            .tasks
            .insert_many(&[NewTask::new("a"), NewTask::new("b"), NewTask::new("c")], start)
            .unwrap();

        let indices: Vec<i64> = created.iter().map(|t| t.order_index).collect();
        assert_eq!(indices, vec![2, 3, 4]);
        assert_eq!(ctx.tasks.fetch_all().unwrap().len(), 4);
    }
}
