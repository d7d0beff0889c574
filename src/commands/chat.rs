//! One-shot or interactive assistant session.
//!
//! With a message on the command line a single turn is sent. Without one a
//! prompt loop runs until an empty line or one of `exit`, `quit`, `q`.

use crate::api::client::TaskClient;
use crate::libs::messages::Message;
use crate::libs::ui_state::UiState;
use crate::libs::view::View;
use crate::{msg_error, msg_info, msg_print};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Message to send; starts an interactive session when omitted
    message: Vec<String>,
}

/// Sends one turn and renders the reply.
async fn send(client: &TaskClient, view: &View, message: &str) -> Result<()> {
    msg_info!(Message::ChatThinking);
    let outcome = client.chat(message).await?;
    view.chat_reply(&outcome);
    Ok(())
}

/// Executes the `chat` command.
///
/// # Arguments
///
/// * `args` - Words of the message; empty for an interactive session
///
/// # Returns
///
/// In one-shot mode, the error of the single turn if it failed. In
/// interactive mode failed turns are printed and only prompt errors end the
/// session with an error.
pub async fn cmd(args: ChatArgs) -> Result<()> {
    let client = super::client()?;
    let view = View::for_state(&UiState::load());

    if !args.message.is_empty() {
        return send(&client, &view, &args.message.join(" ")).await;
    }

    msg_print!(Message::ChatWelcome, true);
    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ChatPrompt.to_string())
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();

        if line.is_empty() || EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }

        // A failed turn is reported and the session goes on.
        if let Err(e) = send(&client, &view, line).await {
            msg_error!(e);
        }
    }

    msg_print!(Message::ChatGoodbye);
    Ok(())
}
