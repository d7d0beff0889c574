//! # taskpad
//!
//! A personal task manager: an HTTP JSON service over a SQLite task store, a
//! chat assistant that turns one sentence into one task operation, and a
//! terminal front-end that talks to the service.
//!
//! ## Layout
//!
//! - [`server`]: axum routes, JSON envelope, error to status mapping
//! - [`assistant`]: intent classification, dispatch and the READ analysis pipeline
//! - [`db`]: SQLite store and its migrations
//! - [`api`]: chat-completion client and the HTTP client used by the CLI
//! - [`libs`]: task model, validation, filtering, config, UI state, rendering
//! - [`commands`]: the `taskpad` CLI
//!
//! ```rust,no_run
//! use taskpad::commands::Cli;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::parse().run().await
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod commands;
pub mod db;
pub mod libs;
pub mod server;
