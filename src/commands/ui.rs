//! Theme and saved list filter.
//!
//! The state lives in `ui_state.json` next to the configuration and is read
//! by every command that renders tables.

use crate::libs::messages::Message;
use crate::libs::task::StatusFilter;
use crate::libs::ui_state::UiState;
use crate::libs::view::View;
use crate::{msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct UiArgs {
    #[command(subcommand)]
    command: Option<UiCommand>,
}

#[derive(Debug, Subcommand)]
enum UiCommand {
    /// Switch between dark and light tables
    Theme,
    /// Status filter used by `list` when none is given
    Filter { status: StatusFilter },
    /// Reset the saved filter
    Clear,
    /// Print the saved state
    Show,
}

/// Applies the subcommand and saves the state. `Show` is the default.
pub fn cmd(args: UiArgs) -> Result<()> {
    let mut state = UiState::load();

    match args.command.unwrap_or(UiCommand::Show) {
        UiCommand::Theme => {
            state.toggle_dark_mode();
            state.save()?;
            msg_success!(Message::ThemeSwitched(state.is_dark_mode));
        }
        UiCommand::Filter { status } => {
            state.set_filter(status);
            state.save()?;
            msg_success!(Message::UiStateSaved);
        }
        UiCommand::Clear => {
            state.clear_filters();
            state.save()?;
            msg_success!(Message::FiltersCleared);
        }
        UiCommand::Show => {
            msg_print!(Message::UiStateHeader, true);
            View::for_state(&state).ui_state(&state);
        }
    }

    Ok(())
}
