//! Interactive configuration wizard.
//!
//! Walks through the server, model and client settings and writes the result
//! to `config.json` in the data directory. Values already present are offered
//! as defaults, so running `init` again edits the current configuration.

use crate::{
    libs::{config::Config, messages::Message},
    msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;

/// Command-line arguments for the initialization command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove the existing configuration instead of editing it
    ///
    /// Only `config.json` is removed. The task database and the saved UI
    /// state stay where they are.
    #[arg(short, long)]
    delete: bool,
}

/// Executes the initialization command.
///
/// # Arguments
///
/// * `init_args` - Parsed command-line arguments
///
/// # Returns
///
/// `Ok(())` once the configuration is saved or removed. With `--delete` and
/// no configuration on disk this is reported and still succeeds.
pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.delete {
        if Config::delete()? {
            msg_success!(Message::ConfigDeleted);
        } else {
            msg_info!(Message::ConfigMissing);
        }
        return Ok(());
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}
