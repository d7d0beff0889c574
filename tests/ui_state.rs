#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use std::fs;
    use std::path::PathBuf;
    use taskpad::libs::task::{Category, Priority, StatusFilter};
    use taskpad::libs::ui_state::{UiState, UI_STATE_FILE_NAME};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct StateFileContext {
        _temp_dir: TempDir,
        path: PathBuf,
    }

    impl TestContext for StateFileContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join(UI_STATE_FILE_NAME);
            StateFileContext {
                _temp_dir: temp_dir,
                path,
            }
        }
    }

    #[test_context(StateFileContext)]
    #[test]
    fn test_only_theme_and_filter_are_written(ctx: &mut StateFileContext) {
        let mut state = UiState::default();
        state.set_filter(StatusFilter::Completed);
        state.set_search_term("milk");
        state.set_selected_category(Some(Category::Shopping));
        state.set_selected_priority(Some(Priority::High));
        state.start_editing("abc");
        state.toggle_dark_mode();

        state.save_to(&ctx.path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&ctx.path).unwrap()).unwrap();
        assert_eq!(written, json!({ "isDarkMode": false, "filter": "completed" }));
    }

    #[test_context(StateFileContext)]
    #[test]
    fn test_reload_restores_persisted_fields_only(ctx: &mut StateFileContext) {
        let mut state = UiState::default();
        state.set_filter(StatusFilter::Pending);
        state.set_search_term("report");
        state.start_editing("abc");
        state.save_to(&ctx.path).unwrap();

        let reloaded = UiState::load_from(&ctx.path);

        assert_eq!(reloaded.filter, StatusFilter::Pending);
        assert!(reloaded.is_dark_mode);
        assert!(reloaded.search_term.is_empty());
        assert_eq!(reloaded.editing_id, None);
        assert!(!reloaded.is_form_open);
    }

    #[test_context(StateFileContext)]
    #[test]
    fn test_missing_file_gives_dark_defaults(ctx: &mut StateFileContext) {
        let state = UiState::load_from(&ctx.path);
        assert_eq!(state, UiState::default());
        assert!(state.is_dark_mode);
        assert_eq!(state.filter, StatusFilter::All);
    }

    #[test_context(StateFileContext)]
    #[test]
    fn test_corrupt_file_falls_back_to_defaults(ctx: &mut StateFileContext) {
        fs::write(&ctx.path, "{ not json").unwrap();
        assert_eq!(UiState::load_from(&ctx.path), UiState::default());

        fs::write(&ctx.path, r#"{ "filter": "archived" }"#).unwrap();
        assert_eq!(UiState::load_from(&ctx.path), UiState::default());
    }

    #[test_context(StateFileContext)]
    #[test]
    fn test_partial_file_fills_missing_fields(ctx: &mut StateFileContext) {
        fs::write(&ctx.path, r#"{ "filter": "pending" }"#).unwrap();
        let state = UiState::load_from(&ctx.path);
        assert_eq!(state.filter, StatusFilter::Pending);
        assert!(state.is_dark_mode);
    }
}
