//! Per-user data directory holding the config, UI state and default database.
//!
//! | OS      | Location                                          |
//! |---------|---------------------------------------------------|
//! | Windows | `%LOCALAPPDATA%\lacodda\taskpad`                  |
//! | macOS   | `~/Library/Application Support/lacodda/taskpad`  |
//! | other   | `~/.local/share/lacodda/taskpad`                  |
//!
//! `TASKPAD_HOME` replaces the whole path when set.

use anyhow::Result;
use std::env::consts::OS;
use std::env::var;
use std::fs;
use std::path::{Path, PathBuf};

pub const VENDOR_NAME: &str = "lacodda";
pub const APP_NAME: &str = "taskpad";

#[derive(Debug, Clone)]
pub struct DataStorage {
    base_path: PathBuf,
}

impl DataStorage {
    pub fn new() -> Self {
        if let Ok(home) = var("TASKPAD_HOME") {
            return Self::at(home);
        }

        let base_path = match OS {
            "windows" => var("LOCALAPPDATA").unwrap_or_else(|_| ".".into()),
            "macos" => var("HOME").unwrap_or_else(|_| ".".into()) + "/Library/Application Support",
            _ => var("HOME").unwrap_or_else(|_| ".".into()) + "/.local/share",
        };

        Self::at(Path::new(&base_path).join(VENDOR_NAME).join(APP_NAME))
    }

    /// Storage rooted at an explicit directory.
    pub fn at(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    /// Path of `file_name` inside the data directory, creating the directory on first use.
    pub fn get_path(&self, file_name: &str) -> Result<PathBuf> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path)?;
        }

        Ok(self.base_path.join(file_name))
    }
}

impl Default for DataStorage {
    fn default() -> Self {
        Self::new()
    }
}
