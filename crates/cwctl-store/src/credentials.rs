//! `CredentialStore` over a `KeychainPort`.
//!
//! The whole record for a connection lives in one keychain entry, so each
//! `set` is a single atomic replace on the platform side.

use std::sync::Arc;

use async_trait::async_trait;
use cwctl_core::{
    ConnectionId, CredentialRecord, CredentialStore, KeychainError, KeychainPort, StoreError,
    keychain_service,
};
use tracing::debug;
use zeroize::Zeroizing;

/// Keychain account under which registry credentials are stored.
pub const REGISTRY_SECRETS_ACCOUNT: &str = "registrysecrets";

/// Stores each connection's registry credentials as one JSON keychain entry.
pub struct KeychainCredentialStore {
    keychain: Arc<dyn KeychainPort>,
    namespace: String,
}

impl KeychainCredentialStore {
    pub fn new(keychain: Arc<dyn KeychainPort>, namespace: impl Into<String>) -> Self {
        Self {
            keychain,
            namespace: namespace.into(),
        }
    }

    /// Run a blocking keychain call for `connection` off the async executor.
    async fn with_keychain<T, F>(
        &self,
        connection: &ConnectionId,
        op: F,
    ) -> Result<Result<T, KeychainError>, StoreError>
    where
        F: FnOnce(&dyn KeychainPort, &str) -> Result<T, KeychainError> + Send + 'static,
        T: Send + 'static,
    {
        let keychain = Arc::clone(&self.keychain);
        let service = keychain_service(&self.namespace, connection);
        tokio::task::spawn_blocking(move || op(keychain.as_ref(), &service))
            .await
            .map_err(|e| StoreError::Unavailable(format!("keychain task failed: {e}")))
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn get(&self, connection: &ConnectionId) -> Result<CredentialRecord, StoreError> {
        let stored = self
            .with_keychain(connection, |keychain, service| {
                keychain.get(service, REGISTRY_SECRETS_ACCOUNT)
            })
            .await?;

        let json = match stored {
            Ok(Some(json)) => json,
            Ok(None) => return Ok(CredentialRecord::new()),
            Err(KeychainError::InvalidValue(reason)) => {
                return Err(StoreError::Corrupt {
                    connection: connection.to_string(),
                    reason,
                });
            }
            Err(e) => return Err(StoreError::Unavailable(e.to_string())),
        };

        serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
            connection: connection.to_string(),
            reason: e.to_string(),
        })
    }

    async fn set(
        &self,
        connection: &ConnectionId,
        record: &CredentialRecord,
    ) -> Result<(), StoreError> {
        if record.is_empty() {
            let result = self
                .with_keychain(connection, |keychain, service| {
                    keychain.delete(service, REGISTRY_SECRETS_ACCOUNT)
                })
                .await?;
            let existed = result.map_err(write_error)?;
            debug!(connection = %connection, existed, "Cleared stored registry credentials");
            return Ok(());
        }

        let json = Zeroizing::new(
            serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?,
        );
        self.with_keychain(connection, move |keychain, service| {
            keychain.set(service, REGISTRY_SECRETS_ACCOUNT, &json)
        })
        .await?
        .map_err(write_error)?;

        debug!(connection = %connection, entries = record.len(), "Stored registry credentials");
        Ok(())
    }
}

fn write_error(err: KeychainError) -> StoreError {
    match err {
        KeychainError::InvalidValue(reason) => StoreError::Serialization(reason),
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keychain::MemoryKeychain;
    use cwctl_core::{DEFAULT_KEYCHAIN_NAMESPACE, RegistryCredentials};

    const SERVICE: &str = "org.eclipse.codewind.local";

    fn setup() -> (KeychainCredentialStore, Arc<MemoryKeychain>) {
        let keychain = Arc::new(MemoryKeychain::new());
        let store = KeychainCredentialStore::new(keychain.clone(), DEFAULT_KEYCHAIN_NAMESPACE);
        (store, keychain)
    }

    fn local() -> ConnectionId {
        ConnectionId::new("local")
    }

    #[tokio::test]
    async fn test_missing_record_is_empty() {
        let (store, _) = setup();
        assert!(store.get(&local()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (store, keychain) = setup();
        let mut record = CredentialRecord::new();
        record.upsert("docker.io", RegistryCredentials::new("alice", "secret"));

        store.set(&local(), &record).await.unwrap();

        assert_eq!(store.get(&local()).await.unwrap(), record);
        assert!(
            keychain
                .secret(SERVICE, REGISTRY_SECRETS_ACCOUNT)
                .is_some_and(|json| json.contains("docker.io"))
        );
    }

    #[tokio::test]
    async fn test_records_are_per_connection() {
        let (store, _) = setup();
        let mut record = CredentialRecord::new();
        record.upsert("quay.io", RegistryCredentials::new("bob", "pw"));

        store.set(&local(), &record).await.unwrap();

        assert!(store.get(&ConnectionId::new("other")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_record_deletes_entry() {
        let (store, keychain) = setup();
        let mut record = CredentialRecord::new();
        record.upsert("docker.io", RegistryCredentials::new("alice", "secret"));
        store.set(&local(), &record).await.unwrap();

        store.set(&local(), &CredentialRecord::new()).await.unwrap();

        assert_eq!(keychain.secret(SERVICE, REGISTRY_SECRETS_ACCOUNT), None);
        assert!(store.get(&local()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_record() {
        let (store, keychain) = setup();
        keychain.insert(SERVICE, REGISTRY_SECRETS_ACCOUNT, "{not json");

        assert!(matches!(
            store.get(&local()).await,
            Err(StoreError::Corrupt { ref connection, .. }) if connection == "local"
        ));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_record() {
        let (store, keychain) = setup();
        let mut first = CredentialRecord::new();
        first.upsert("docker.io", RegistryCredentials::new("alice", "secret"));
        store.set(&local(), &first).await.unwrap();

        keychain.fail_with(KeychainError::Unavailable("locked".to_string()));
        let mut second = first.clone();
        second.upsert("quay.io", RegistryCredentials::new("bob", "pw"));
        assert!(matches!(
            store.set(&local(), &second).await,
            Err(StoreError::Unavailable(_))
        ));

        keychain.clear_failure();
        assert_eq!(store.get(&local()).await.unwrap(), first);
    }
}
