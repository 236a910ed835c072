#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AuthContext, Connection, ConnectionId, CredentialRecord, LOCAL_CONNECTION_ID, RegistryCredentials,
    RegistrySecret,
};
pub use ports::{
    AuthError, Authenticator, ConnectionError, ConnectionRegistry, CredentialStore,
    DEFAULT_KEYCHAIN_NAMESPACE, DispatchError, KeychainError, KeychainPort, NoAuth,
    RegistrySecretsPort, StoreError, keychain_service,
};
pub use services::{
    LocalSyncError, RegistrySecretError, RegistrySecretService, RegistrySecretsOutcome,
};

// Re-export path utilities
pub use paths::{PathError, connections_path, data_root, env_file_path};
