//! Month view of tasks by due date.

use crate::libs::calendar::{parse_month, MonthGrid};
use crate::libs::messages::Message;
use crate::libs::task::TaskQuery;
use crate::libs::ui_state::UiState;
use crate::libs::view::View;
use crate::msg_error_anyhow;
use anyhow::Result;
use chrono::Local;
use clap::Args;

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Month to show, YYYY-MM; the current month by default
    #[arg(short, long)]
    month: Option<String>,
}

/// Shows one month as a grid, marking days that have tasks due.
///
/// Every task is fetched; the grid itself decides which fall in the month.
pub async fn cmd(args: CalendarArgs) -> Result<()> {
    let today = Local::now().date_naive();
    let month = match args.month.as_deref() {
        Some(text) => parse_month(text).ok_or_else(|| msg_error_anyhow!(Message::InvalidMonth(text.to_string())))?,
        None => today,
    };

    let tasks = super::client()?.list(&TaskQuery::default()).await?;
    let grid = MonthGrid::build(month, &tasks, today).ok_or_else(|| msg_error_anyhow!(Message::InvalidMonth(month.to_string())))?;
    View::for_state(&UiState::load()).calendar(&grid);
    Ok(())
}
