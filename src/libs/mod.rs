//! Shared building blocks: the task model and its rules, configuration,
//! storage paths, user-facing messages, client-side state and rendering.

pub mod cache;
pub mod calendar;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod filter;
pub mod messages;
pub mod task;
pub mod ui_state;
pub mod validation;
pub mod view;
