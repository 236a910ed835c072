//! CLI-specific error types and mappings.
//!
//! Maps the core error taxonomy to exit codes and user-facing messages.

use cwctl_core::{ConnectionError, PathError, RegistrySecretError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Missing, malformed or misconfigured connection data.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local storage could not be read or written.
    #[error("IO error: {0}")]
    Io(String),

    /// The remote could not be reached.
    #[error("{0}")]
    Unavailable(String),

    /// The remote answered, but not with what was asked for.
    #[error("{0}")]
    Remote(String),

    /// Credentials were rejected or could not be refreshed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Interrupted by the user.
    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories (see sysexits.h)
    /// - 130: Terminated by Ctrl-C
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2,
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,          // EX_IOERR
            Self::Remote(_) => 76,      // EX_PROTOCOL
            Self::Auth(_) => 77,        // EX_NOPERM
            Self::Config(_) => 78,      // EX_CONFIG
            Self::Cancelled => 130,
        }
    }
}

impl From<RegistrySecretError> for CliError {
    fn from(err: RegistrySecretError) -> Self {
        let message = err.to_string();
        match err {
            RegistrySecretError::Connection(e) => e.into(),
            RegistrySecretError::Validation(_) => Self::Arguments(message),
            RegistrySecretError::Auth(e) => Self::Auth(e.to_string()),
            RegistrySecretError::Network(_) => Self::Unavailable(message),
            RegistrySecretError::Remote { .. } | RegistrySecretError::Decode(_) => {
                Self::Remote(message)
            }
            RegistrySecretError::Cancelled => Self::Cancelled,
            RegistrySecretError::Store(_) => Self::Io(message),
        }
    }
}

impl From<ConnectionError> for CliError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::Unavailable(_) => Self::Io(err.to_string()),
            ConnectionError::NotFound(_)
            | ConnectionError::Config { .. }
            | ConnectionError::Invalid(_) => Self::Config(err.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
