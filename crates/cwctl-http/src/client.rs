//! Registry-secrets API client.
//!
//! Implements the core-owned `RegistrySecretsPort` on top of
//! [`SecureDispatcher`]. GET, POST and DELETE all return the full registry
//! list and share one decoder.

use std::sync::Arc;

use async_trait::async_trait;
use cwctl_core::ports::REGISTRY_SECRETS_PATH;
use cwctl_core::{
    Authenticator, Connection, DispatchError, RegistryCredentials, RegistrySecret,
    RegistrySecretsPort,
};
use serde::Serialize;
use url::Url;
use zeroize::Zeroizing;

use crate::dispatch::SecureDispatcher;
use crate::error::{HttpError, HttpResult};
use crate::http::{HttpBackend, HttpRequest, HttpResponse, Method};

// ============================================================================
// Client
// ============================================================================

/// Client for the `/api/v1/registrysecrets` collection of a connection.
pub struct RegistrySecretsClient<B: HttpBackend> {
    dispatcher: SecureDispatcher<B>,
}

impl<B: HttpBackend> RegistrySecretsClient<B> {
    /// Create a client over an explicit transport.
    pub fn with_backend(backend: B, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            dispatcher: SecureDispatcher::new(backend, authenticator),
        }
    }

    async fn call(
        &self,
        connection: &Connection,
        request: HttpRequest,
    ) -> HttpResult<Vec<RegistrySecret>> {
        let response = self.dispatcher.dispatch(connection, request).await?;
        decode_registry_list(&response)
    }
}

// ============================================================================
// Request Building
// ============================================================================

#[derive(Serialize)]
struct AddRegistrySecret<'a> {
    address: &'a str,
    credentials: &'a str,
}

#[derive(Serialize)]
struct RemoveRegistrySecret<'a> {
    address: &'a str,
}

/// `{origin}/api/v1/registrysecrets`, keeping any path prefix on the origin.
fn registry_secrets_url(origin: &Url) -> HttpResult<Url> {
    let base = origin.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}{REGISTRY_SECRETS_PATH}"))?)
}

fn json_body<T: Serialize>(payload: &T) -> HttpResult<Zeroizing<Vec<u8>>> {
    Ok(Zeroizing::new(serde_json::to_vec(payload)?))
}

/// Shared decoder: only a 200 with a JSON array of `{address, username}` is accepted.
fn decode_registry_list(response: &HttpResponse) -> HttpResult<Vec<RegistrySecret>> {
    if response.status != 200 {
        return Err(response.status_error());
    }
    serde_json::from_slice(&response.body).map_err(|e| HttpError::Decode(e.to_string()))
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `HttpError` to core `DispatchError`.
fn map_error(err: HttpError) -> DispatchError {
    match err {
        HttpError::Status {
            status,
            status_text,
        } => DispatchError::Remote {
            status,
            status_text,
        },
        HttpError::Auth(e) => DispatchError::Auth(e),
        HttpError::Timeout => DispatchError::Network("request timed out".to_string()),
        HttpError::Transport(msg) | HttpError::Client(msg) => DispatchError::Network(msg),
        HttpError::Decode(msg) => DispatchError::Decode(msg),
        HttpError::InvalidUrl(e) => DispatchError::Request(e.to_string()),
        HttpError::Encode(e) => DispatchError::Request(e.to_string()),
        HttpError::InvalidRequest(msg) => DispatchError::Request(msg),
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> RegistrySecretsPort for RegistrySecretsClient<B> {
    async fn list(
        &self,
        connection: &Connection,
        origin: &Url,
    ) -> Result<Vec<RegistrySecret>, DispatchError> {
        let url = registry_secrets_url(origin).map_err(map_error)?;
        self.call(connection, HttpRequest::new(Method::Get, url))
            .await
            .map_err(map_error)
    }

    async fn add(
        &self,
        connection: &Connection,
        origin: &Url,
        address: &str,
        credentials: &RegistryCredentials,
    ) -> Result<Vec<RegistrySecret>, DispatchError> {
        let url = registry_secrets_url(origin).map_err(map_error)?;
        let envelope = credentials
            .to_envelope()
            .map_err(|e| DispatchError::Request(e.to_string()))?;
        let body = json_body(&AddRegistrySecret {
            address,
            credentials: &envelope,
        })
        .map_err(map_error)?;

        self.call(
            connection,
            HttpRequest::new(Method::Post, url).with_json_body(body),
        )
        .await
        .map_err(map_error)
    }

    async fn remove(
        &self,
        connection: &Connection,
        origin: &Url,
        address: &str,
    ) -> Result<Vec<RegistrySecret>, DispatchError> {
        let url = registry_secrets_url(origin).map_err(map_error)?;
        let body = json_body(&RemoveRegistrySecret { address }).map_err(map_error)?;

        self.call(
            connection,
            HttpRequest::new(Method::Delete, url).with_json_body(body),
        )
        .await
        .map_err(map_error)
    }
}
