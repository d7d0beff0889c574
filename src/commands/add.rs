//! Creates a task from the command line.
//!
//! The request goes through the HTTP service, so the same validation applies
//! as for any other client. The created task is printed as a card.

use crate::libs::messages::Message;
use crate::libs::task::{Category, NewTask, Priority};
use crate::libs::ui_state::UiState;
use crate::libs::validation::parse_date;
use crate::libs::view::View;
use crate::{msg_error_anyhow, msg_success};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

/// Command-line arguments for `add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title
    #[arg(required = true)]
    title: String,
    /// Free-form notes; an empty string is treated as none
    #[arg(short, long)]
    description: Option<String>,
    /// low, medium or high; medium by default
    #[arg(short, long)]
    priority: Option<Priority>,
    /// work, personal, shopping, health or other; other by default
    #[arg(short, long)]
    category: Option<Category>,
    /// Due date, YYYY-MM-DD
    #[arg(long)]
    due: Option<String>,
}

/// Parses a `--due` value, reporting the offending text on failure.
pub(crate) fn parse_due(text: &str) -> Result<NaiveDate> {
    parse_date(text).ok_or_else(|| msg_error_anyhow!(Message::InvalidDueDate(text.to_string())))
}

/// Executes the `add` command.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments
///
/// # Returns
///
/// `Ok(())` after the task is created and shown. A malformed `--due` fails
/// before any request is sent; a rejected request surfaces the service's
/// error message.
pub async fn cmd(args: AddArgs) -> Result<()> {
    let task = NewTask {
        title: args.title,
        description: args.description.filter(|d| !d.is_empty()),
        priority: args.priority.unwrap_or_default(),
        category: args.category.unwrap_or_default(),
        due_date: args.due.as_deref().map(parse_due).transpose()?,
    };

    let created = super::client()?.create(&task).await?;
    msg_success!(Message::TaskCreated(created.title.clone()));
    View::for_state(&UiState::load()).task_card(&created);
    Ok(())
}
