//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or `keyring` types in any signature
//! - Secrets cross port boundaries only inside `Zeroizing` buffers
//! - "Not found" is an error for connections but an empty value for credentials

pub mod authenticator;
pub mod connection_registry;
pub mod credential_store;
pub mod keychain;
pub mod registry_secrets;

pub use authenticator::{AuthError, Authenticator, NoAuth};
pub use connection_registry::{ConnectionError, ConnectionRegistry};
pub use credential_store::{CredentialStore, StoreError};
pub use keychain::{DEFAULT_KEYCHAIN_NAMESPACE, KeychainError, KeychainPort, keychain_service};
pub use registry_secrets::{DispatchError, REGISTRY_SECRETS_PATH, RegistrySecretsPort};

#[cfg(test)]
pub use credential_store::MockCredentialStore;
#[cfg(test)]
pub use registry_secrets::MockRegistrySecretsPort;
