//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod cover;
pub mod devices;
pub mod login;
mod util;

use calypshome_api::CalypshomeClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs a gateway session.
pub async fn dispatch(
    cmd: Command,
    client: &CalypshomeClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login => login::handle(client, global).await,
        Command::Devices(args) => devices::handle(client, args, global).await,
        Command::Cover(args) => cover::handle(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
