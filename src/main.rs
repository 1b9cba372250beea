//! Groupie Tracker CLI - inspect artists and their concerts
//!
//! Builds a `GroupieClient` from command-line options, runs one retrieval
//! command and prints the result as JSON on stdout. Logs go to stderr and are
//! filtered through the `LOG_LEVEL` environment variable.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use groupie_tracker::cli::{run_command, Cli, CliError};
use groupie_tracker::GroupieClient;

/// Installs the stderr log subscriber, defaulting to `info`
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let config = cli.client_config()?;
    let client = GroupieClient::with_config(config)?;
    run_command(&client, &cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
