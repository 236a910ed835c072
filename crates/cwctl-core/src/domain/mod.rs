//! Domain types for connections and registry secrets.
//!
//! These types are storage- and transport-agnostic. Adapters convert their
//! wire formats into these at the boundary.

mod connection;
mod registry_secret;

pub use connection::{AuthContext, Connection, ConnectionId, LOCAL_CONNECTION_ID};
pub use registry_secret::{CredentialRecord, RegistryCredentials, RegistrySecret};
