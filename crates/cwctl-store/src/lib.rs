#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod connections;
pub mod credentials;
pub mod factory;
pub mod keychain;

pub use connections::{FileConnectionRegistry, SUPPORTED_SCHEMA_VERSION};
pub use credentials::{KeychainCredentialStore, REGISTRY_SECRETS_ACCOUNT};
pub use factory::StoreFactory;
pub use keychain::OsKeychain;

#[cfg(any(test, feature = "test-utils"))]
pub use keychain::MemoryKeychain;
