//! Connection registry trait definition.
//!
//! The registry is populated by connection-management commands that live
//! outside this crate. From the core's point of view it is read-only.

use thiserror::Error;
use url::Url;

use crate::domain::Connection;

/// Errors from resolving a connection or deriving its endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// No connection matches the normalized identifier.
    #[error("Connection not found: {0}")]
    NotFound(String),

    /// The connection exists but has no usable origin URL.
    #[error("Connection '{id}' has no usable endpoint: {reason}")]
    Config {
        /// The connection identifier
        id: String,
        /// What is wrong with the stored URL
        reason: String,
    },

    /// The registry contents violate an invariant (duplicate IDs, several local connections).
    #[error("Invalid connection registry: {0}")]
    Invalid(String),

    /// The registry could not be read.
    #[error("Connection registry unavailable: {0}")]
    Unavailable(String),
}

/// Lookup over the set of known connections.
///
/// Implementations hold already-loaded state; every method is a pure lookup.
pub trait ConnectionRegistry: Send + Sync {
    /// Resolve an identifier to its connection.
    ///
    /// The identifier is trimmed and lowercased before lookup.
    fn resolve(&self, identifier: &str) -> Result<Connection, ConnectionError>;

    /// Base URL used for API calls against `connection`.
    fn endpoint_origin(&self, connection: &Connection) -> Result<Url, ConnectionError>;

    /// All known connections in registry order.
    fn list(&self) -> Vec<Connection>;
}
