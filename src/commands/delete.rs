//! Deletes a task after confirmation.

use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_success, msg_warning};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Task id or a unique prefix of it
    #[arg(required = true)]
    id: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

/// Resolves the id, asks for confirmation unless `--yes` is given, then deletes.
///
/// Declining the prompt is not an error.
pub async fn cmd(args: DeleteArgs) -> Result<()> {
    let client = super::client()?;
    let id = super::resolve_id(&client, &args.id).await?;
    let task = client.get(&id).await?;

    let confirmed = args.yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteTask(task.title.clone()).to_string())
            .default(false)
            .interact()?;

    if !confirmed {
        msg_warning!(Message::DeleteCancelled);
        return Ok(());
    }

    client.delete(&id).await?;
    msg_success!(Message::TaskDeleted(View::short_id(&id).to_string()));
    Ok(())
}
