//! CLI argument parser.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for managing Codewind connections and the image
/// registry secrets they hold.
#[derive(Parser)]
#[command(name = "cwctl")]
#[command(about = "Manage Codewind connections and image registry secrets")]
#[command(version)]
pub struct Cli {
    /// Request timeout in seconds
    #[arg(
        long,
        global = true,
        env = "CWCTL_TIMEOUT",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Log at debug level when RUST_LOG is not set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
