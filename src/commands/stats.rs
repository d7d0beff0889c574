use crate::libs::ui_state::UiState;
use crate::libs::view::View;
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let stats = super::client()?.stats().await?;
    View::for_state(&UiState::load()).stats(&stats);
    Ok(())
}
