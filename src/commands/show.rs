//! Prints one task as a card.

use crate::libs::ui_state::UiState;
use crate::libs::view::View;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Task id or a unique prefix of it
    #[arg(required = true)]
    id: String,
}

pub async fn cmd(args: ShowArgs) -> Result<()> {
    let client = super::client()?;
    let id = super::resolve_id(&client, &args.id).await?;
    let task = client.get(&id).await?;
    View::for_state(&UiState::load()).task_card(&task);
    Ok(())
}
