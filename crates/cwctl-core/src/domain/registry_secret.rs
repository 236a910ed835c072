//! Registry secret domain types.
//!
//! A registry secret pairs a Docker image-registry address with the
//! credentials used to pull or push images. The remote API only ever echoes
//! `address` and `username`; passwords travel one way and are kept locally
//! only for the local connection.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

/// Registry entry as reported by the remote registry-secrets API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrySecret {
    /// Registry host (e.g. `docker.io`)
    pub address: String,
    /// User the credentials belong to
    pub username: String,
}

impl RegistrySecret {
    /// Create a new registry entry.
    pub fn new(address: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
        }
    }
}

/// Username and password for a registry.
///
/// The password buffer is zeroed on drop and never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl RegistryCredentials {
    /// Create credentials, taking ownership of the password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// The registry username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The registry password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Encode as the base64 JSON envelope `base64({"username","password"})`
    /// expected by the remote API.
    pub fn to_envelope(&self) -> Result<Zeroizing<String>, serde_json::Error> {
        let json = Zeroizing::new(serde_json::to_vec(self)?);
        Ok(Zeroizing::new(STANDARD.encode(json.as_slice())))
    }
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct CredentialsRef<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct CredentialsOwned {
    username: String,
    password: String,
}

impl Serialize for RegistryCredentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CredentialsRef {
            username: &self.username,
            password: &self.password,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RegistryCredentials {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let owned = CredentialsOwned::deserialize(deserializer)?;
        Ok(Self {
            username: owned.username,
            password: Zeroizing::new(owned.password),
        })
    }
}

/// Locally cached registry credentials for one connection, keyed by address.
///
/// Address is the natural key, so a record holds at most one entry per
/// registry. An empty record is equivalent to no record at all.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(default)]
    entries: BTreeMap<String, RegistryCredentials>,
}

impl CredentialRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the credentials for `address`.
    pub fn upsert(&mut self, address: impl Into<String>, credentials: RegistryCredentials) {
        self.entries.insert(address.into(), credentials);
    }

    /// Remove the entry for `address`, returning whether one existed.
    pub fn remove(&mut self, address: &str) -> bool {
        self.entries.remove(address).is_some()
    }

    /// Credentials stored for `address`.
    pub fn get(&self, address: &str) -> Option<&RegistryCredentials> {
        self.entries.get(address)
    }

    /// Whether the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
