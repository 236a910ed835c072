//! Registry secret service - keeps the remote registry list and the local
//! credential store in step.
//!
//! Every operation follows the same shape:
//!
//! 1. Resolve the connection and its origin
//! 2. Call the remote registry-secrets API (cancellable)
//! 3. For ADD/REMOVE on the local connection, mirror the change locally
//! 4. Return the list the remote reported
//!
//! The remote list is the source of truth for which addresses exist. A remote
//! failure ends the operation before the credential store is read or written.
//! A local failure after a remote success is returned as a [`LocalSyncError`]
//! next to the remote result; nothing is rolled back or retried.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{Connection, ConnectionId, CredentialRecord, RegistryCredentials, RegistrySecret};
use crate::ports::{
    AuthError, ConnectionError, ConnectionRegistry, CredentialStore, DispatchError,
    RegistrySecretsPort, StoreError,
};

/// Fatal errors from a registry secret operation.
#[derive(Debug, Error)]
pub enum RegistrySecretError {
    /// Unknown or misconfigured connection.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Authentication rejected after one refresh attempt.
    #[error(transparent)]
    Auth(AuthError),

    /// The remote answered with a non-success status.
    #[error("Registry secrets request failed: {status} {status_text}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        status_text: String,
    },

    /// Transport failure or timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote returned something other than a registry list.
    #[error("Invalid registry secrets response: {0}")]
    Decode(String),

    /// Caller input rejected before any remote call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The caller cancelled the in-flight request.
    #[error("Operation cancelled")]
    Cancelled,

    /// Local persistence failure on a read-only path.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DispatchError> for RegistrySecretError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Auth(e) => Self::Auth(e),
            DispatchError::Remote {
                status,
                status_text,
            } => Self::Remote {
                status,
                status_text,
            },
            DispatchError::Network(msg) => Self::Network(msg),
            DispatchError::Decode(msg) => Self::Decode(msg),
            DispatchError::Request(msg) => Self::Validation(msg),
        }
    }
}

/// The local credential store could not be updated after a remote success.
///
/// Non-fatal: the remote mutation stands and the local cache is now stale.
/// A subsequent GET shows the authoritative list.
#[derive(Debug, Error)]
#[error(
    "Registry secret for '{address}' was updated remotely, but the local credential store for \
     connection '{connection}' could not be updated: {source}"
)]
pub struct LocalSyncError {
    /// Connection whose local record is stale
    pub connection: ConnectionId,
    /// Address that failed to sync
    pub address: String,
    /// Underlying store failure
    #[source]
    pub source: StoreError,
}

/// Result of a successful ADD or REMOVE.
#[derive(Debug)]
pub struct RegistrySecretsOutcome {
    /// Registry entries reported by the remote after the mutation
    pub secrets: Vec<RegistrySecret>,
    /// Set when mirroring into the local store failed
    pub local_sync: Option<LocalSyncError>,
}

impl RegistrySecretsOutcome {
    /// Whether the local credential store is consistent with the remote result.
    pub const fn is_in_sync(&self) -> bool {
        self.local_sync.is_none()
    }
}

/// Service for registry secret operations.
pub struct RegistrySecretService {
    connections: Arc<dyn ConnectionRegistry>,
    remote: Arc<dyn RegistrySecretsPort>,
    store: Arc<dyn CredentialStore>,
}

impl RegistrySecretService {
    /// Create a new registry secret service.
    pub fn new(
        connections: Arc<dyn ConnectionRegistry>,
        remote: Arc<dyn RegistrySecretsPort>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            connections,
            remote,
            store,
        }
    }

    /// List the registry secrets a connection holds.
    #[tracing::instrument(skip_all, fields(connection = %ConnectionId::new(identifier)))]
    pub async fn get(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RegistrySecret>, RegistrySecretError> {
        let (connection, origin) = self.target(identifier)?;
        let secrets = cancellable(cancel, self.remote.list(&connection, &origin)).await?;
        debug!(count = secrets.len(), "Fetched registry secrets");
        Ok(secrets)
    }

    /// Add (or replace) a registry secret.
    ///
    /// On the local connection the caller-supplied password is cached locally
    /// once the remote has accepted the entry.
    #[tracing::instrument(skip_all, fields(connection = %ConnectionId::new(identifier), address))]
    pub async fn add(
        &self,
        identifier: &str,
        address: &str,
        credentials: RegistryCredentials,
        cancel: &CancellationToken,
    ) -> Result<RegistrySecretsOutcome, RegistrySecretError> {
        let address = normalize_address(address)?;
        tracing::Span::current().record("address", address);
        if credentials.username().trim().is_empty() {
            return Err(RegistrySecretError::Validation(
                "username cannot be empty".to_string(),
            ));
        }

        let (connection, origin) = self.target(identifier)?;
        let secrets = cancellable(
            cancel,
            self.remote.add(&connection, &origin, address, &credentials),
        )
        .await?;
        info!(count = secrets.len(), "Registry secret added");

        let local_sync = if connection.is_local() {
            self.mirror(&connection.id, address, |record| {
                record.upsert(address, credentials);
                true
            })
            .await
        } else {
            None
        };

        Ok(RegistrySecretsOutcome {
            secrets,
            local_sync,
        })
    }

    /// Remove a registry secret.
    ///
    /// Removing an address with no local entry leaves the local store untouched.
    #[tracing::instrument(skip_all, fields(connection = %ConnectionId::new(identifier), address))]
    pub async fn remove(
        &self,
        identifier: &str,
        address: &str,
        cancel: &CancellationToken,
    ) -> Result<RegistrySecretsOutcome, RegistrySecretError> {
        let address = normalize_address(address)?;
        tracing::Span::current().record("address", address);

        let (connection, origin) = self.target(identifier)?;
        let secrets =
            cancellable(cancel, self.remote.remove(&connection, &origin, address)).await?;
        info!(count = secrets.len(), "Registry secret removed");

        let local_sync = if connection.is_local() {
            self.mirror(&connection.id, address, |record| record.remove(address))
                .await
        } else {
            None
        };

        Ok(RegistrySecretsOutcome {
            secrets,
            local_sync,
        })
    }

    /// Credentials cached locally for a connection.
    ///
    /// Remote connections never have a local record, so this is empty for them.
    pub async fn local_credentials(
        &self,
        identifier: &str,
    ) -> Result<CredentialRecord, RegistrySecretError> {
        let connection = self.connections.resolve(identifier)?;
        if !connection.is_local() {
            return Ok(CredentialRecord::new());
        }
        Ok(self.store.get(&connection.id).await?)
    }

    fn target(&self, identifier: &str) -> Result<(Connection, Url), RegistrySecretError> {
        let connection = self.connections.resolve(identifier)?;
        let origin = self.connections.endpoint_origin(&connection)?;
        debug!(origin = %origin, local = connection.is_local(), "Resolved connection");
        Ok((connection, origin))
    }

    /// Apply `mutate` to the stored record; `mutate` returns whether it changed anything.
    async fn mirror<F>(
        &self,
        connection: &ConnectionId,
        address: &str,
        mutate: F,
    ) -> Option<LocalSyncError>
    where
        F: FnOnce(&mut CredentialRecord) -> bool + Send,
    {
        match self.apply_local(connection, mutate).await {
            Ok(()) => None,
            Err(source) => {
                warn!(
                    error = %source,
                    "Local credential store is out of sync with the remote registry list"
                );
                Some(LocalSyncError {
                    connection: connection.clone(),
                    address: address.to_string(),
                    source,
                })
            }
        }
    }

    async fn apply_local<F>(&self, connection: &ConnectionId, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut CredentialRecord) -> bool + Send,
    {
        let mut record = self.store.get(connection).await?;
        if !mutate(&mut record) {
            debug!("No local credential change required");
            return Ok(());
        }
        self.store.set(connection, &record).await?;
        debug!(entries = record.len(), "Local credential store updated");
        Ok(())
    }
}

fn normalize_address(address: &str) -> Result<&str, RegistrySecretError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(RegistrySecretError::Validation(
            "registry address cannot be empty".to_string(),
        ));
    }
    Ok(address)
}

/// Race a remote call against cancellation. A cancelled call is dropped mid-flight.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, DispatchError>>,
) -> Result<T, RegistrySecretError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(RegistrySecretError::Cancelled),
        result = call => result.map_err(RegistrySecretError::from),
    }
}
