//! Top-level commands.

use clap::Subcommand;

use crate::registry_secrets_commands::{ConnectionsCommand, RegistrySecretsCommand};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage the image registry secrets held by a connection
    #[command(name = "registrysecrets")]
    RegistrySecrets {
        #[command(subcommand)]
        command: RegistrySecretsCommand,
    },

    /// Inspect configured connections
    Connections {
        #[command(subcommand)]
        command: ConnectionsCommand,
    },
}
