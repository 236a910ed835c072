//! Registry secret and connection subcommands.

use clap::Subcommand;
use cwctl_core::LOCAL_CONNECTION_ID;

/// Registry secret operations against one connection.
#[derive(Subcommand)]
pub enum RegistrySecretsCommand {
    /// List the registry secrets on a connection
    Get {
        /// Connection identifier
        #[arg(long, default_value = LOCAL_CONNECTION_ID)]
        conid: String,
    },

    /// Add or replace a registry secret
    Add {
        /// Connection identifier
        #[arg(long, default_value = LOCAL_CONNECTION_ID)]
        conid: String,
        /// Registry address (e.g. "docker.io")
        #[arg(long)]
        address: String,
        /// Registry username
        #[arg(long)]
        username: String,
        /// Registry password or access token
        #[arg(long, env = "CWCTL_REGISTRY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Remove a registry secret
    Remove {
        /// Connection identifier
        #[arg(long, default_value = LOCAL_CONNECTION_ID)]
        conid: String,
        /// Registry address to remove
        #[arg(long)]
        address: String,
    },
}

/// Read-only views of the connection registry.
#[derive(Subcommand)]
pub enum ConnectionsCommand {
    /// List all known connections
    List,

    /// Show one connection and its resolved endpoint
    Show {
        /// Connection identifier
        id: String,
    },
}
