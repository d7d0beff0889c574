//! Lists tasks with the saved or given filters.
//!
//! Filters given on the command line update the in-memory [`UiState`] for
//! this run only. The rows shown are ordered by priority, high first, then
//! newest, unless `--sort-by` asks for the service's ordering.

use crate::libs::filter::refilter;
use crate::libs::messages::Message;
use crate::libs::task::{Category, Priority, SortField, SortOrder, StatusFilter};
use crate::libs::ui_state::UiState;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

/// Command-line arguments for `list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// all, completed or pending; defaults to the saved filter
    #[arg(short, long)]
    status: Option<StatusFilter>,
    #[arg(short, long)]
    category: Option<Category>,
    #[arg(short, long)]
    priority: Option<Priority>,
    /// Substring of the title or description
    #[arg(long)]
    search: Option<String>,
    /// Keep the service's order for this field instead of priority-then-newest
    #[arg(long)]
    sort_by: Option<SortField>,
    /// asc or desc; only with --sort-by
    #[arg(long, requires = "sort_by")]
    order: Option<SortOrder>,
}

/// Executes the `list` command.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments
///
/// # Returns
///
/// `Ok(())` after printing the table, or a notice when nothing matches.
pub async fn cmd(args: ListArgs) -> Result<()> {
    let mut state = UiState::load();
    if let Some(status) = args.status {
        state.set_filter(status);
    }
    if let Some(search) = args.search {
        state.set_search_term(search);
    }
    state.set_selected_category(args.category);
    state.set_selected_priority(args.priority);

    let mut query = state.query();
    let tasks = match args.sort_by {
        Some(sort_by) => {
            query.sort_by = sort_by;
            query.sort_order = args.order.unwrap_or_default();
            super::client()?.list(&query).await?
        }
        None => {
            let fetched = super::client()?.list(&query).await?;
            refilter(&fetched, &query)
        }
    };

    if tasks.is_empty() {
        msg_info!(Message::TasksEmpty);
        return Ok(());
    }

    msg_print!(Message::TasksHeader(tasks.len()), true);
    View::for_state(&state).tasks(&tasks);
    Ok(())
}
