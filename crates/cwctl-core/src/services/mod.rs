//! Core services - orchestrate ports into use cases.

mod registry_secrets;

pub use registry_secrets::{
    LocalSyncError, RegistrySecretError, RegistrySecretService, RegistrySecretsOutcome,
};
