//! Bearer-token authenticator backed by the platform keychain.
//!
//! Tokens are stored per connection under the keychain service
//! `"{namespace}.{connection_id}"` with the accounts [`ACCESS_TOKEN_ACCOUNT`]
//! and [`REFRESH_TOKEN_ACCOUNT`]. Refresh uses the OIDC refresh-token grant
//! against `{authority}/realms/{realm}/protocol/openid-connect/token`.

use std::sync::Arc;

use async_trait::async_trait;
use cwctl_core::{
    AuthContext, AuthError, Authenticator, Connection, KeychainError, KeychainPort,
    keychain_service,
};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;
use url::form_urlencoded;
use zeroize::{Zeroize, Zeroizing};

use crate::http::{HttpBackend, HttpRequest, Method};

/// Keychain account holding the current access token.
pub const ACCESS_TOKEN_ACCOUNT: &str = "access_token";

/// Keychain account holding the refresh token.
pub const REFRESH_TOKEN_ACCOUNT: &str = "refresh_token";

/// Token endpoint response. Only the fields we persist are read.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl Drop for TokenResponse {
    fn drop(&mut self) {
        self.access_token.zeroize();
        self.refresh_token.zeroize();
    }
}

/// Reads bearer tokens from the keychain and refreshes them on demand.
pub struct KeychainAuthenticator<B: HttpBackend> {
    keychain: Arc<dyn KeychainPort>,
    namespace: String,
    backend: B,
}

impl<B: HttpBackend> KeychainAuthenticator<B> {
    /// `backend` is used only for token refresh requests.
    pub fn new(keychain: Arc<dyn KeychainPort>, namespace: impl Into<String>, backend: B) -> Self {
        Self {
            keychain,
            namespace: namespace.into(),
            backend,
        }
    }

    async fn read(
        &self,
        connection: &Connection,
        account: &'static str,
    ) -> Result<Option<Zeroizing<String>>, AuthError> {
        let keychain = Arc::clone(&self.keychain);
        let service = keychain_service(&self.namespace, &connection.id);
        let result = tokio::task::spawn_blocking(move || keychain.get(&service, account))
            .await
            .map_err(|e| AuthError::Keychain(e.to_string()))?;
        result.map_err(keychain_error)
    }

    async fn write(
        &self,
        connection: &Connection,
        account: &'static str,
        secret: Zeroizing<String>,
    ) -> Result<(), AuthError> {
        let keychain = Arc::clone(&self.keychain);
        let service = keychain_service(&self.namespace, &connection.id);
        let result = tokio::task::spawn_blocking(move || keychain.set(&service, account, &secret))
            .await
            .map_err(|e| AuthError::Keychain(e.to_string()))?;
        result.map_err(keychain_error)
    }

    async fn request_tokens(
        &self,
        connection: &Connection,
        endpoint: Url,
        client_id: &str,
        refresh_token: &str,
    ) -> Result<TokenResponse, AuthError> {
        let failed = |reason: String| AuthError::RefreshFailed {
            connection: connection.id.to_string(),
            reason,
        };

        let form = Zeroizing::new(
            form_urlencoded::Serializer::new(String::new())
                .append_pair("grant_type", "refresh_token")
                .append_pair("client_id", client_id)
                .append_pair("refresh_token", refresh_token)
                .finish(),
        );
        let request =
            HttpRequest::new(Method::Post, endpoint).with_form_body(Zeroizing::new(form.as_bytes().to_vec()));

        let response = self
            .backend
            .send(&request)
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !response.is_success() {
            return Err(failed(format!(
                "token endpoint returned {} {}",
                response.status,
                response.status_text()
            )));
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| failed(format!("invalid token response: {e}")))
    }
}

#[async_trait]
impl<B: HttpBackend> Authenticator for KeychainAuthenticator<B> {
    async fn authorization(
        &self,
        connection: &Connection,
    ) -> Result<Option<Zeroizing<String>>, AuthError> {
        if connection.auth.is_none() {
            return Ok(None);
        }
        let token = self.read(connection, ACCESS_TOKEN_ACCOUNT).await?;
        Ok(token.map(|token| Zeroizing::new(format!("Bearer {}", token.as_str()))))
    }

    #[tracing::instrument(skip_all, fields(connection = %connection.id))]
    async fn refresh(&self, connection: &Connection) -> Result<(), AuthError> {
        let AuthContext::Bearer {
            authority,
            realm,
            client_id,
            ..
        } = &connection.auth
        else {
            return Err(AuthError::MissingRefreshToken(connection.id.to_string()));
        };

        let refresh_token = self
            .read(connection, REFRESH_TOKEN_ACCOUNT)
            .await?
            .ok_or_else(|| AuthError::MissingRefreshToken(connection.id.to_string()))?;

        let endpoint = token_endpoint(authority, realm).map_err(|e| AuthError::RefreshFailed {
            connection: connection.id.to_string(),
            reason: format!("invalid authority URL: {e}"),
        })?;
        debug!(endpoint = %endpoint, "Requesting new access token");

        let tokens = self
            .request_tokens(connection, endpoint, client_id, &refresh_token)
            .await?;

        self.write(
            connection,
            ACCESS_TOKEN_ACCOUNT,
            Zeroizing::new(tokens.access_token.clone()),
        )
        .await?;
        if let Some(ref rotated) = tokens.refresh_token {
            self.write(
                connection,
                REFRESH_TOKEN_ACCOUNT,
                Zeroizing::new(rotated.clone()),
            )
            .await?;
        }

        info!("Access token refreshed");
        Ok(())
    }
}

fn token_endpoint(authority: &str, realm: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/realms/{realm}/protocol/openid-connect/token",
        authority.trim_end_matches('/')
    ))
}

fn keychain_error(err: KeychainError) -> AuthError {
    AuthError::Keychain(err.to_string())
}
