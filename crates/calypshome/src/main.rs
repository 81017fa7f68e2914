mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use calypshome_api::CalypshomeClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch the network
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;

            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "calypshome", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let client_config = config::resolve_client_config(&cli.global)?;
            let client = CalypshomeClient::new(client_config)?;

            tracing::debug!(command = ?cmd, base_url = %client.base_url(), "dispatching command");
            commands::dispatch(cmd, &client, &cli.global).await
        }
    }
}
