//! Key-value secret facility port.
//!
//! Entries are addressed by `(service, account)`. The service name for a
//! connection is `"{namespace}.{connection_id}"`; accounts distinguish the
//! kinds of secret stored for it (registry secrets, access token, refresh token).

use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::ConnectionId;

/// Default service namespace for keychain entries.
pub const DEFAULT_KEYCHAIN_NAMESPACE: &str = "org.eclipse.codewind";

/// Build the keychain service name for a connection.
pub fn keychain_service(namespace: &str, connection: &ConnectionId) -> String {
    format!("{namespace}.{connection}")
}

/// Errors from the secret facility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeychainError {
    /// The platform secret service is not available.
    #[error("Keychain unavailable: {0}")]
    Unavailable(String),

    /// The platform refused access to the entry.
    #[error("Keychain access denied: {0}")]
    AccessDenied(String),

    /// The stored value could not be read as text or is too large to store.
    #[error("Invalid keychain value: {0}")]
    InvalidValue(String),
}

/// Opaque get/set/delete over a platform secret store.
///
/// Calls may block; async callers should run them on a blocking thread.
pub trait KeychainPort: Send + Sync {
    /// Read a secret. Returns `None` when no entry exists.
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<String>>, KeychainError>;

    /// Create or replace a secret.
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError>;

    /// Delete a secret. Returns whether an entry existed.
    fn delete(&self, service: &str, account: &str) -> Result<bool, KeychainError>;
}
