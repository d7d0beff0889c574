//! Command-line interface.
//!
//! `serve` runs the HTTP service in-process; every other command talks to a
//! running service through [`TaskClient`].

pub mod add;
pub mod calendar;
pub mod chat;
pub mod delete;
pub mod done;
pub mod edit;
pub mod init;
pub mod list;
pub mod serve;
pub mod show;
pub mod stats;
pub mod ui;

use crate::api::client::TaskClient;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::task::TaskQuery;
use crate::msg_bail_anyhow;
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP task service")]
    Serve(serve::ServeArgs),
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "List tasks", visible_alias = "ls")]
    List(list::ListArgs),
    #[command(about = "Create a task")]
    Add(add::AddArgs),
    #[command(about = "Show one task")]
    Show(show::ShowArgs),
    #[command(about = "Change a task")]
    Edit(edit::EditArgs),
    #[command(about = "Toggle a task between done and pending")]
    Done(done::DoneArgs),
    #[command(about = "Delete a task", visible_alias = "rm")]
    Delete(delete::DeleteArgs),
    #[command(about = "Month view of due dates")]
    Calendar(calendar::CalendarArgs),
    #[command(about = "Task statistics")]
    Stats,
    #[command(about = "Talk to the assistant")]
    Chat(chat::ChatArgs),
    #[command(about = "Theme and saved list filter")]
    Ui(ui::UiArgs),
}

/// Top-level parser. `main` builds it and calls [`Cli::run`].
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    /// More log output; repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Dispatches to the selected command.
    ///
    /// `init` and `ui` are synchronous and run on the calling task; all the
    /// others are awaited.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::cmd(args).await,
            Commands::Init(args) => init::cmd(args),
            Commands::List(args) => list::cmd(args).await,
            Commands::Add(args) => add::cmd(args).await,
            Commands::Show(args) => show::cmd(args).await,
            Commands::Edit(args) => edit::cmd(args).await,
            Commands::Done(args) => done::cmd(args).await,
            Commands::Delete(args) => delete::cmd(args).await,
            Commands::Calendar(args) => calendar::cmd(args).await,
            Commands::Stats => stats::cmd().await,
            Commands::Chat(args) => chat::cmd(args).await,
            Commands::Ui(args) => ui::cmd(args),
        }
    }
}

/// Client for the configured service.
pub(crate) fn client() -> Result<TaskClient> {
    Ok(TaskClient::new(&Config::load()?.client()))
}

/// Full id of the one task whose id starts with `prefix`.
///
/// # Arguments
///
/// * `client` - Client for the running service
/// * `prefix` - Leading characters of an id, or a whole id
///
/// # Returns
///
/// The full id when exactly one task matches. No match and several matches
/// are both errors; the latter reports how many ids share the prefix.
pub(crate) async fn resolve_id(client: &TaskClient, prefix: &str) -> Result<String> {
    let tasks = client.list(&TaskQuery::default()).await?;
    let matches: Vec<&str> = tasks
        .iter()
        .map(|t| t.id.as_str())
        .filter(|id| id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => msg_bail_anyhow!(Message::TaskNotFound),
        many => msg_bail_anyhow!(Message::AmbiguousTaskId(prefix.to_string(), many.len())),
    }
}
