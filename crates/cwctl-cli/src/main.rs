//! CLI entry point - the composition root.
//!
//! Wiring happens in [`bootstrap`]; this file only sets up the process
//! environment and routes commands to handlers.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cwctl_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    load_env_files();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::with_defaults()?.with_timeout(cli.timeout);
    let ctx = bootstrap(config).await?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::RegistrySecrets { command } => {
            handlers::registry_secrets::execute(&ctx, command, &mut stdout).await?;
        }
        Commands::Connections { command } => {
            handlers::connections::execute(&ctx, command, &mut stdout)?;
        }
    }
    Ok(())
}

/// `./.env` first, then `.env` in the data directory. Existing variables win.
fn load_env_files() {
    dotenvy::dotenv().ok();
    if let Ok(path) = cwctl_core::env_file_path() {
        dotenvy::from_path(path).ok();
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}
