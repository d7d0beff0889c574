//! State of the terminal front-end.
//!
//! [`UiState`] holds every selection the list view renders from. Only
//! [`PersistedUiState`] (theme and status filter) is written to disk; the
//! other fields start empty in every session.

use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::task::{Category, Priority, StatusFilter, TaskQuery};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const UI_STATE_FILE_NAME: &str = "ui_state.json";

/// The part of [`UiState`] that survives a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedUiState {
    #[serde(default = "dark")]
    pub is_dark_mode: bool,
    #[serde(default)]
    pub filter: StatusFilter,
}

fn dark() -> bool {
    true
}

impl Default for PersistedUiState {
    fn default() -> Self {
        PersistedUiState {
            is_dark_mode: true,
            filter: StatusFilter::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub filter: StatusFilter,
    pub search_term: String,
    pub selected_category: Option<Category>,
    pub selected_priority: Option<Priority>,
    pub editing_id: Option<String>,
    pub is_form_open: bool,
    pub is_dark_mode: bool,
}

impl Default for UiState {
    fn default() -> Self {
        UiState::from(PersistedUiState::default())
    }
}

impl From<PersistedUiState> for UiState {
    fn from(persisted: PersistedUiState) -> Self {
        UiState {
            filter: persisted.filter,
            search_term: String::new(),
            selected_category: None,
            selected_priority: None,
            editing_id: None,
            is_form_open: false,
            is_dark_mode: persisted.is_dark_mode,
        }
    }
}

impl UiState {
    /// Loads from the data directory. Unreadable state is reported and replaced by defaults.
    pub fn load() -> Self {
        match DataStorage::new().get_path(UI_STATE_FILE_NAME) {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::warn!("{}", Message::UiStateLoadFailed(e.to_string()));
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let persisted = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str::<PersistedUiState>(&text).map_err(anyhow::Error::from));

        match persisted {
            Ok(persisted) => Self::from(persisted),
            Err(e) => {
                tracing::warn!("{}", Message::UiStateLoadFailed(e.to_string()));
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = DataStorage::new().get_path(UI_STATE_FILE_NAME)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(&self.persisted())?)?;
        Ok(())
    }

    pub fn persisted(&self) -> PersistedUiState {
        PersistedUiState {
            is_dark_mode: self.is_dark_mode,
            filter: self.filter,
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_selected_category(&mut self, category: Option<Category>) {
        self.selected_category = category;
    }

    pub fn set_selected_priority(&mut self, priority: Option<Priority>) {
        self.selected_priority = priority;
    }

    pub fn set_editing_id(&mut self, id: Option<String>) {
        self.editing_id = id;
    }

    pub fn set_form_open(&mut self, open: bool) {
        self.is_form_open = open;
    }

    /// Opens the form on `id`.
    pub fn start_editing(&mut self, id: &str) {
        self.set_editing_id(Some(id.to_string()));
        self.set_form_open(true);
    }

    pub fn close_form(&mut self) {
        self.set_editing_id(None);
        self.set_form_open(false);
    }

    pub fn toggle_dark_mode(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
    }

    /// Resets search, category, priority and status filter. Theme and form state are kept.
    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.selected_category = None;
        self.selected_priority = None;
        self.filter = StatusFilter::All;
    }

    /// The list query the current selections describe.
    ///
    /// The sort is left at the service default. The list view reorders the
    /// result with `filter::refilter` unless a sort is asked for explicitly.
    pub fn query(&self) -> TaskQuery {
        TaskQuery {
            status: self.filter,
            priority: self.selected_priority,
            category: self.selected_category,
            search: Some(self.search_term.clone()).filter(|s| !s.is_empty()),
            ..TaskQuery::default()
        }
    }
}
