//! File-backed connection registry.
//!
//! Reads `connections.json` once at construction. Connection management
//! commands own the file; this registry never writes it.

use std::fs;
use std::io;
use std::path::Path;

use cwctl_core::{
    AuthContext, Connection, ConnectionError, ConnectionId, ConnectionRegistry,
};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Highest `schemaversion` this registry understands.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct ConnectionsFile {
    #[serde(rename = "schemaversion", default = "default_schema_version")]
    schema_version: u32,
    #[serde(default)]
    connections: Vec<StoredConnection>,
}

const fn default_schema_version() -> u32 {
    SUPPORTED_SCHEMA_VERSION
}

/// One entry as written by the connection-management commands.
#[derive(Debug, Deserialize)]
struct StoredConnection {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    url: String,
    /// OIDC authority base URL; empty for unauthenticated connections
    #[serde(default)]
    auth: String,
    #[serde(default)]
    realm: String,
    #[serde(default, rename = "clientid")]
    client_id: String,
    #[serde(default)]
    username: String,
}

impl StoredConnection {
    fn into_connection(self) -> Connection {
        let id = ConnectionId::new(&self.id);
        let auth = if self.auth.trim().is_empty() {
            AuthContext::None
        } else {
            AuthContext::Bearer {
                authority: self.auth.trim().to_string(),
                realm: self.realm,
                client_id: self.client_id,
                username: self.username,
            }
        };

        if id.is_local() {
            let mut local = Connection::local();
            if !self.label.is_empty() {
                local.label = self.label;
            }
            local.url = self.url;
            local.auth = auth;
            local
        } else {
            Connection::remote(id.as_str(), self.label, self.url, auth)
        }
    }
}

/// Connection registry loaded from `connections.json`.
#[derive(Debug, Clone)]
pub struct FileConnectionRegistry {
    connections: Vec<Connection>,
    local_origin: Url,
}

impl FileConnectionRegistry {
    /// Load the registry from `path`.
    ///
    /// A missing file yields a registry holding only the built-in local
    /// connection. `local_origin` is used for the local connection when it
    /// has no stored URL.
    pub fn load(path: &Path, local_origin: Url) -> Result<Self, ConnectionError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                debug!(path = %path.display(), "Loading connection registry");
                Self::from_json(&contents, local_origin)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No connection registry, using local connection only");
                Self::from_connections(vec![Connection::local()], local_origin)
            }
            Err(e) => Err(ConnectionError::Unavailable(format!(
                "{}: {e}",
                path.display()
            ))),
        }
    }

    /// Parse a registry document.
    pub fn from_json(json: &str, local_origin: Url) -> Result<Self, ConnectionError> {
        let file: ConnectionsFile = serde_json::from_str(json)
            .map_err(|e| ConnectionError::Invalid(format!("malformed registry: {e}")))?;

        if file.schema_version > SUPPORTED_SCHEMA_VERSION {
            return Err(ConnectionError::Invalid(format!(
                "unsupported schema version {} (expected at most {SUPPORTED_SCHEMA_VERSION})",
                file.schema_version
            )));
        }

        let connections = file
            .connections
            .into_iter()
            .map(StoredConnection::into_connection)
            .collect();
        Self::from_connections(connections, local_origin)
    }

    /// Build a registry from already-constructed connections.
    ///
    /// The built-in local connection is added first when none is present.
    pub fn from_connections(
        mut connections: Vec<Connection>,
        local_origin: Url,
    ) -> Result<Self, ConnectionError> {
        validate(&connections)?;
        if !connections.iter().any(Connection::is_local) {
            connections.insert(0, Connection::local());
        }
        Ok(Self {
            connections,
            local_origin,
        })
    }
}

fn validate(connections: &[Connection]) -> Result<(), ConnectionError> {
    let mut seen: Vec<&ConnectionId> = Vec::with_capacity(connections.len());
    for connection in connections {
        if connection.id.is_empty() {
            return Err(ConnectionError::Invalid(
                "connection with an empty identifier".to_string(),
            ));
        }
        if seen.contains(&&connection.id) {
            return Err(ConnectionError::Invalid(format!(
                "duplicate connection identifier '{}'",
                connection.id
            )));
        }
        if connection.id.is_local() && !connection.is_local() {
            return Err(ConnectionError::Invalid(format!(
                "'{}' is reserved for the local connection",
                connection.id
            )));
        }
        seen.push(&connection.id);
    }

    let locals = connections.iter().filter(|c| c.is_local()).count();
    if locals > 1 {
        return Err(ConnectionError::Invalid(format!(
            "{locals} connections are marked local; at most one is allowed"
        )));
    }
    Ok(())
}

fn parse_origin(connection: &Connection, raw: &str) -> Result<Url, ConnectionError> {
    let config_error = |reason: String| ConnectionError::Config {
        id: connection.id.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|e| config_error(format!("'{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(config_error(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(config_error(format!("'{raw}' has no host")));
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

impl ConnectionRegistry for FileConnectionRegistry {
    fn resolve(&self, identifier: &str) -> Result<Connection, ConnectionError> {
        let id = ConnectionId::new(identifier);
        self.connections
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ConnectionError::NotFound(id.to_string()))
    }

    fn endpoint_origin(&self, connection: &Connection) -> Result<Url, ConnectionError> {
        let raw = connection.url.trim();
        if raw.is_empty() {
            if connection.is_local() {
                return Ok(self.local_origin.clone());
            }
            return Err(ConnectionError::Config {
                id: connection.id.to_string(),
                reason: "no URL configured".to_string(),
            });
        }
        parse_origin(connection, raw)
    }

    fn list(&self) -> Vec<Connection> {
        self.connections.clone()
    }
}
