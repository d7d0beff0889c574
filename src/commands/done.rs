//! Toggles a task between done and pending.

use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct DoneArgs {
    /// Task id or a unique prefix of it
    #[arg(required = true)]
    id: String,
}

pub async fn cmd(args: DoneArgs) -> Result<()> {
    let client = super::client()?;
    let id = super::resolve_id(&client, &args.id).await?;
    let task = client.toggle(&id).await?;

    if task.completed {
        msg_success!(Message::TaskMarkedDone(task.title));
    } else {
        msg_success!(Message::TaskMarkedPending(task.title));
    }
    Ok(())
}
