//! Changes fields of an existing task.
//!
//! Two modes:
//!
//! - **Flags**: any of `--title`, `--description`, `--priority`, `--category`,
//!   `--due`, `--completed` builds the patch directly. An empty
//!   `--description` or `--due` clears the field.
//! - **Form**: with no flags an interactive form opens, prefilled with the
//!   current values. Only fields that differ from those values are sent.
//!
//! Either way a single `PUT /tasks/{id}` carries the change, and an empty
//! patch sends nothing.

use super::add::parse_due;
use crate::libs::messages::Message;
use crate::libs::task::{Category, Priority, Task, TaskPatch};
use crate::libs::ui_state::UiState;
use crate::libs::view::View;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

/// Command-line arguments for `edit`.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task id or a unique prefix of it
    #[arg(required = true)]
    id: String,
    /// New title
    #[arg(short, long)]
    title: Option<String>,
    /// New description; an empty value clears it
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    priority: Option<Priority>,
    #[arg(short, long)]
    category: Option<Category>,
    /// New due date, YYYY-MM-DD; an empty value clears it
    #[arg(long)]
    due: Option<String>,
    /// true or false
    #[arg(long)]
    completed: Option<bool>,
}

impl EditArgs {
    fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.category.is_some()
            || self.due.is_some()
            || self.completed.is_some()
    }
}

fn optional_text(text: String) -> Option<String> {
    Some(text).filter(|t| !t.is_empty())
}

fn patch_from_flags(args: EditArgs) -> Result<TaskPatch> {
    Ok(TaskPatch {
        title: args.title,
        description: args.description.map(optional_text),
        completed: args.completed,
        priority: args.priority,
        category: args.category,
        due_date: args
            .due
            .map(|due| optional_text(due).as_deref().map(parse_due).transpose())
            .transpose()?,
        order_index: None,
    })
}

/// Form prefilled with `task`; only fields that changed end up in the patch.
fn patch_from_form(task: &Task) -> Result<TaskPatch> {
    let theme = ColorfulTheme::default();
    let mut patch = TaskPatch::default();

    let title: String = Input::with_theme(&theme)
        .with_prompt(Message::PromptTaskTitle.to_string())
        .default(task.title.clone())
        .interact_text()?;
    if title != task.title {
        patch.title = Some(title);
    }

    let description: String = Input::with_theme(&theme)
        .with_prompt(Message::PromptTaskDescription.to_string())
        .default(task.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    let description = optional_text(description);
    if description != task.description {
        patch.description = Some(description);
    }

    let priority = Priority::ALL[Select::with_theme(&theme)
        .with_prompt(Message::PromptTaskPriority.to_string())
        .items(&Priority::ALL.map(|p| format!("{} {}", p.emoji(), p)))
        .default(Priority::ALL.iter().position(|p| *p == task.priority).unwrap_or(0))
        .interact()?];
    if priority != task.priority {
        patch.priority = Some(priority);
    }

    let category = Category::ALL[Select::with_theme(&theme)
        .with_prompt(Message::PromptTaskCategory.to_string())
        .items(&Category::ALL.map(|c| format!("{} {}", c.emoji(), c)))
        .default(Category::ALL.iter().position(|c| *c == task.category).unwrap_or(0))
        .interact()?];
    if category != task.category {
        patch.category = Some(category);
    }

    let due: String = Input::with_theme(&theme)
        .with_prompt(Message::PromptTaskDueDate.to_string())
        .default(task.due_date.map(|d| d.to_string()).unwrap_or_default())
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            match input.is_empty() || parse_due(input).is_ok() {
                true => Ok(()),
                false => Err(Message::InvalidDueDate(input.clone()).to_string()),
            }
        })
        .interact_text()?;
    let due_date = optional_text(due).as_deref().map(parse_due).transpose()?;
    if due_date != task.due_date {
        patch.due_date = Some(due_date);
    }

    let completed = Confirm::with_theme(&theme)
        .with_prompt(Message::PromptTaskCompleted.to_string())
        .default(task.completed)
        .interact()?;
    if completed != task.completed {
        patch.completed = Some(completed);
    }

    Ok(patch)
}

/// Executes the `edit` command.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments; no change flags opens the form
///
/// # Returns
///
/// `Ok(())` when the task was updated or there was nothing to change. Fails
/// when the id does not resolve to exactly one task or the service rejects
/// the patch.
pub async fn cmd(args: EditArgs) -> Result<()> {
    let client = super::client()?;
    let id = super::resolve_id(&client, &args.id).await?;

    let mut state = UiState::load();
    let patch = if args.has_changes() {
        patch_from_flags(args)?
    } else {
        let task = client.get(&id).await?;
        state.start_editing(&task.id);
        let patch = patch_from_form(&task)?;
        state.close_form();
        patch
    };

    if patch.is_empty() {
        msg_info!(Message::NothingToUpdate);
        return Ok(());
    }

    let updated = client.update(&id, &patch).await?;
    msg_success!(Message::TaskUpdated(updated.title.clone()));
    View::for_state(&state).task_card(&updated);
    Ok(())
}
