//! Remote registry-secrets API port.
//!
//! All three operations return the full list of registry entries the remote
//! service holds after the call. The actual implementation lives in `cwctl-http`.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use super::AuthError;
use crate::domain::{Connection, RegistryCredentials, RegistrySecret};

/// Path of the registry-secrets collection relative to a connection origin.
pub const REGISTRY_SECRETS_PATH: &str = "/api/v1/registrysecrets";

/// Errors from an authenticated remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Authentication rejected after the single refresh attempt, or refresh failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The remote answered with a non-success status.
    #[error("Remote request failed: {status} {status_text}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        status_text: String,
    },

    /// Transport failure (DNS, refused connection, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The request could not be built (bad URL, unserializable payload).
    #[error("Invalid request: {0}")]
    Request(String),
}

/// Remote registry-secrets collection for one connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrySecretsPort: Send + Sync {
    /// `GET {origin}/api/v1/registrysecrets`
    async fn list(
        &self,
        connection: &Connection,
        origin: &Url,
    ) -> Result<Vec<RegistrySecret>, DispatchError>;

    /// `POST {origin}/api/v1/registrysecrets` with `{address, credentials}`.
    async fn add(
        &self,
        connection: &Connection,
        origin: &Url,
        address: &str,
        credentials: &RegistryCredentials,
    ) -> Result<Vec<RegistrySecret>, DispatchError>;

    /// `DELETE {origin}/api/v1/registrysecrets` with `{address}`.
    async fn remove(
        &self,
        connection: &Connection,
        origin: &Url,
        address: &str,
    ) -> Result<Vec<RegistrySecret>, DispatchError>;
}
