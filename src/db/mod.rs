//! SQLite persistence.
//!
//! ```rust,ignore
//! use taskpad::db::{db::Db, tasks::Tasks};
//!
//! let tasks = Tasks::new(Db::in_memory()?);
//! let order_index = tasks.next_order_index()?;
//! let task = tasks.insert(&NewTask::new("Water the plants"), order_index)?;
//! ```

/// Connection setup; opening a database also brings its schema up to date.
pub mod db;

/// Versioned schema changes, applied in order inside one transaction.
pub mod migrations;

/// The task record store.
pub mod tasks;
