//! Connection domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the connection that represents the user's own machine.
pub const LOCAL_CONNECTION_ID: &str = "local";

/// Normalized connection identifier.
///
/// Identifiers are case-insensitive and ignore surrounding whitespace, so
/// `" Local "` and `"local"` produce the same `ConnectionId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Normalize a raw identifier (trim, lowercase).
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// The normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier names the local connection.
    pub fn is_local(&self) -> bool {
        self.0 == LOCAL_CONNECTION_ID
    }

    /// Whether the identifier is empty after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// How requests to a connection are authenticated.
///
/// The context only describes *where* credentials come from. Tokens themselves
/// are held by an [`Authenticator`](crate::ports::Authenticator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthContext {
    /// No authentication; requests are sent unmodified.
    #[default]
    None,
    /// OIDC bearer tokens issued by a Keycloak-style authority.
    Bearer {
        /// Authority base URL (e.g. `https://auth.example.com/auth`)
        authority: String,
        /// Realm the client is registered in
        realm: String,
        /// OIDC client identifier
        client_id: String,
        /// User the tokens were issued to
        username: String,
    },
}

impl AuthContext {
    /// Whether a rejected request may be retried after refreshing credentials.
    pub const fn supports_refresh(&self) -> bool {
        matches!(self, Self::Bearer { .. })
    }

    /// Whether requests go out without any authentication.
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A named development-environment endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    /// Unique, normalized identifier
    pub id: ConnectionId,
    /// Human readable label
    pub label: String,
    /// Stored endpoint URL; may be empty for the local connection
    pub url: String,
    /// Authentication context
    pub auth: AuthContext,
    /// Whether this is the connection to the user's own machine
    pub local: bool,
}

impl Connection {
    /// The built-in local connection: no stored URL, no authentication.
    pub fn local() -> Self {
        Self {
            id: ConnectionId::new(LOCAL_CONNECTION_ID),
            label: "Codewind local connection".to_string(),
            url: String::new(),
            auth: AuthContext::None,
            local: true,
        }
    }

    /// A remote connection with the given URL and authentication context.
    pub fn remote(id: &str, label: impl Into<String>, url: impl Into<String>, auth: AuthContext) -> Self {
        Self {
            id: ConnectionId::new(id),
            label: label.into(),
            url: url.into(),
            auth,
            local: false,
        }
    }

    /// Whether this is the local connection (eligible for credential mirroring).
    pub const fn is_local(&self) -> bool {
        self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_is_trimmed_and_lowercased() {
        assert_eq!(ConnectionId::new(" Local "), ConnectionId::new("local"));
        assert_eq!(ConnectionId::new("\tREMOTE-1\n").as_str(), "remote-1");
        assert!(ConnectionId::new("  LOCAL").is_local());
        assert!(ConnectionId::new("   ").is_empty());
    }

    #[test]
    fn test_auth_context_refresh_support() {
        assert!(!AuthContext::None.supports_refresh());
        let bearer = AuthContext::Bearer {
            authority: "https://auth.example.com/auth".to_string(),
            realm: "codewind".to_string(),
            client_id: "codewind-backend".to_string(),
            username: "developer".to_string(),
        };
        assert!(bearer.supports_refresh());
        assert!(!bearer.is_none());
    }

    #[test]
    fn test_local_connection_defaults() {
        let local = Connection::local();
        assert!(local.is_local());
        assert!(local.auth.is_none());
        assert!(local.url.is_empty());
        assert_eq!(local.id.to_string(), LOCAL_CONNECTION_ID);
    }

    #[test]
    fn test_auth_context_serializes_with_type_tag() {
        let json = serde_json::to_value(AuthContext::None).unwrap();
        assert_eq!(json["type"], "none");
    }
}
