//! Credential store trait definition.
//!
//! This port defines the interface for persisting registry credentials of
//! the local connection. Implementations choose the medium (OS keychain,
//! encrypted file) and handle serialization internally.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ConnectionId, CredentialRecord};

/// Errors from the local persistence medium.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing medium could not be reached or refused access.
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    /// The record could not be serialized for storage.
    #[error("Failed to serialize credential record: {0}")]
    Serialization(String),

    /// A stored record exists but cannot be decoded.
    #[error("Corrupt credential record for '{connection}': {reason}")]
    Corrupt {
        /// Connection the record belongs to
        connection: String,
        /// Decoding failure
        reason: String,
    },
}

/// Per-connection store of registry credentials.
///
/// # Contract
///
/// - `get` returns an empty record when nothing is stored; absence is not an error
/// - `set` replaces the whole record and either fully succeeds or leaves the
///   previous record in place
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the record for a connection.
    async fn get(&self, connection: &ConnectionId) -> Result<CredentialRecord, StoreError>;

    /// Replace the record for a connection.
    async fn set(&self, connection: &ConnectionId, record: &CredentialRecord)
    -> Result<(), StoreError>;
}
