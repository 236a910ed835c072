//! Authentication capability consumed by the secure dispatcher.
//!
//! The core never acquires tokens itself. It only asks for the current
//! `Authorization` value and, after a rejection, for a refresh.

use async_trait::async_trait;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::Connection;

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The remote rejected the request after the single refresh attempt.
    #[error("Authentication rejected for connection '{0}'")]
    Rejected(String),

    /// No refresh token is available for the connection.
    #[error("No refresh token stored for connection '{0}'; log in again")]
    MissingRefreshToken(String),

    /// The token endpoint refused or failed the refresh.
    #[error("Token refresh failed for connection '{connection}': {reason}")]
    RefreshFailed {
        /// Connection being refreshed
        connection: String,
        /// Failure description
        reason: String,
    },

    /// Stored credentials could not be read or written.
    #[error("Credential lookup failed: {0}")]
    Keychain(String),
}

/// Supplies and refreshes per-connection credentials.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Value for the `Authorization` header, if any credentials are held.
    async fn authorization(
        &self,
        connection: &Connection,
    ) -> Result<Option<Zeroizing<String>>, AuthError>;

    /// Obtain fresh credentials after the remote rejected the current ones.
    async fn refresh(&self, connection: &Connection) -> Result<(), AuthError>;
}

/// Authenticator for deployments where every connection is unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl Authenticator for NoAuth {
    async fn authorization(
        &self,
        _connection: &Connection,
    ) -> Result<Option<Zeroizing<String>>, AuthError> {
        Ok(None)
    }

    async fn refresh(&self, connection: &Connection) -> Result<(), AuthError> {
        Err(AuthError::MissingRefreshToken(connection.id.to_string()))
    }
}
