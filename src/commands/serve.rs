//! Runs the HTTP task service in the foreground.
//!
//! Command-line flags override the `server` section of the configuration
//! for this run; nothing is written back to `config.json`.

use crate::libs::config::{Config, ServerConfig};
use crate::server;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
    /// SQLite file to use instead of the one in the data directory
    #[arg(long)]
    database: Option<String>,
}

/// Starts the service and returns only when it stops.
///
/// # Returns
///
/// An error if the configuration cannot be loaded, the database cannot be
/// opened or migrated, or the address cannot be bound.
pub async fn cmd(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;
    let server_config = config.server.get_or_insert_with(ServerConfig::default);
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }
    if let Some(database) = args.database {
        server_config.database = Some(database);
    }

    server::serve(&config).await
}
