//! Composition utilities for the store adapters.
//!
//! Construction only; no domain logic.

use std::path::Path;
use std::sync::Arc;

use cwctl_core::{ConnectionError, KeychainPort};
use url::Url;

use crate::connections::FileConnectionRegistry;
use crate::credentials::KeychainCredentialStore;
use crate::keychain::OsKeychain;

/// Factory for the local persistence adapters.
pub struct StoreFactory;

impl StoreFactory {
    /// The platform keychain as a shared port.
    pub fn os_keychain() -> Arc<dyn KeychainPort> {
        Arc::new(OsKeychain::new())
    }

    /// Load the connection registry from `path`.
    pub fn connection_registry(
        path: &Path,
        local_origin: Url,
    ) -> Result<Arc<FileConnectionRegistry>, ConnectionError> {
        Ok(Arc::new(FileConnectionRegistry::load(path, local_origin)?))
    }

    /// Credential store over `keychain`, entries namespaced by `namespace`.
    pub fn credential_store(
        keychain: Arc<dyn KeychainPort>,
        namespace: &str,
    ) -> Arc<KeychainCredentialStore> {
        Arc::new(KeychainCredentialStore::new(keychain, namespace))
    }
}
