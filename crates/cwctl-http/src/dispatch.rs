//! Secure dispatch: credential attachment and the bounded refresh cycle.

use std::sync::Arc;

use cwctl_core::{AuthError, Authenticator, Connection};
use tracing::{debug, warn};

use crate::error::HttpResult;
use crate::http::{HttpBackend, HttpRequest, HttpResponse};

const UNAUTHORIZED: u16 = 401;

/// An outbound request paired with the connection whose credentials it
/// carries, plus whether a refresh has already been spent on it.
#[derive(Debug)]
pub struct AuthenticatedRequest<'a> {
    request: HttpRequest,
    connection: &'a Connection,
    refresh_attempted: bool,
}

impl<'a> AuthenticatedRequest<'a> {
    pub const fn new(request: HttpRequest, connection: &'a Connection) -> Self {
        Self {
            request,
            connection,
            refresh_attempted: false,
        }
    }

    pub const fn connection(&self) -> &Connection {
        self.connection
    }

    pub const fn refresh_attempted(&self) -> bool {
        self.refresh_attempted
    }

    const fn may_refresh(&self) -> bool {
        !self.refresh_attempted && self.connection.auth.supports_refresh()
    }
}

/// Sends requests on behalf of a connection.
///
/// Stateless across calls. The only per-call state is the refresh flag on
/// [`AuthenticatedRequest`].
pub struct SecureDispatcher<B: HttpBackend> {
    backend: B,
    authenticator: Arc<dyn Authenticator>,
}

impl<B: HttpBackend> SecureDispatcher<B> {
    pub fn new(backend: B, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            backend,
            authenticator,
        }
    }

    /// Send `request` for `connection` and return a 2xx response.
    ///
    /// - Unauthenticated connections get the request unmodified
    /// - A 401 on a connection that supports refresh triggers exactly one
    ///   refresh and resend; a second 401 is [`AuthError::Rejected`]
    /// - Any other non-2xx is [`HttpError::Status`](crate::HttpError::Status)
    /// - Transport failures are returned as-is, never retried
    #[tracing::instrument(
        skip_all,
        fields(connection = %connection.id, method = %request.method, path = request.url.path())
    )]
    pub async fn dispatch(
        &self,
        connection: &Connection,
        request: HttpRequest,
    ) -> HttpResult<HttpResponse> {
        let mut call = AuthenticatedRequest::new(request, connection);

        loop {
            let response = self.send_once(&call).await?;
            debug!(
                status = response.status,
                refreshed = call.refresh_attempted,
                "Received response"
            );

            if response.is_success() {
                return Ok(response);
            }
            if response.status != UNAUTHORIZED || call.connection.auth.is_none() {
                return Err(response.status_error());
            }
            if !call.may_refresh() {
                warn!("Credentials rejected after refresh");
                return Err(AuthError::Rejected(call.connection.id.to_string()).into());
            }

            debug!("Credentials rejected, refreshing");
            self.authenticator.refresh(call.connection).await?;
            call.refresh_attempted = true;
        }
    }

    async fn send_once(&self, call: &AuthenticatedRequest<'_>) -> HttpResult<HttpResponse> {
        if call.connection.auth.is_none() {
            return self.backend.send(&call.request).await;
        }

        let request = match self.authenticator.authorization(call.connection).await? {
            Some(value) => call.request.clone().with_authorization(value),
            None => {
                debug!("No access token stored, sending unauthenticated");
                call.request.clone()
            }
        };
        self.backend.send(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::http::Method;
    use crate::http::testing::FakeBackend;
    use async_trait::async_trait;
    use cwctl_core::AuthContext;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;
    use zeroize::Zeroizing;

    /// Hands out `Bearer token-N` where N is the number of refreshes so far.
    #[derive(Default)]
    struct CountingAuthenticator {
        lookups: AtomicUsize,
        refreshes: AtomicUsize,
        refresh_error: Mutex<Option<AuthError>>,
        no_token: bool,
    }

    impl CountingAuthenticator {
        fn failing_refresh(error: AuthError) -> Self {
            Self {
                refresh_error: Mutex::new(Some(error)),
                ..Self::default()
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        fn refreshes(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Authenticator for CountingAuthenticator {
        async fn authorization(
            &self,
            _connection: &Connection,
        ) -> Result<Option<Zeroizing<String>>, AuthError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.no_token {
                return Ok(None);
            }
            let n = self.refreshes();
            Ok(Some(Zeroizing::new(format!("Bearer token-{n}"))))
        }

        async fn refresh(&self, _connection: &Connection) -> Result<(), AuthError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            match self.refresh_error.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn bearer() -> Connection {
        Connection::remote(
            "remote",
            "Remote",
            "https://codewind.example.com",
            AuthContext::Bearer {
                authority: "https://auth.example.com/auth".to_string(),
                realm: "codewind".to_string(),
                client_id: "codewind-backend".to_string(),
                username: "developer".to_string(),
            },
        )
    }

    fn request() -> HttpRequest {
        HttpRequest::new(
            Method::Get,
            Url::parse("https://codewind.example.com/api/v1/registrysecrets").unwrap(),
        )
    }

    fn setup(
        backend: FakeBackend,
        auth: CountingAuthenticator,
    ) -> (
        SecureDispatcher<Arc<FakeBackend>>,
        Arc<FakeBackend>,
        Arc<CountingAuthenticator>,
    ) {
        let backend = Arc::new(backend);
        let auth = Arc::new(auth);
        let dispatcher = SecureDispatcher::new(Arc::clone(&backend), auth.clone());
        (dispatcher, backend, auth)
    }

    fn auth_header(request: &HttpRequest) -> Option<&str> {
        request.authorization.as_ref().map(|v| v.as_str())
    }

    #[tokio::test]
    async fn test_unauthenticated_connection_sent_unmodified() {
        let (dispatcher, backend, auth) = setup(
            FakeBackend::new().with_json(200, &json!([])),
            CountingAuthenticator::default(),
        );

        let response = dispatcher
            .dispatch(&Connection::local(), request())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(auth.lookups(), 0);
        assert_eq!(auth_header(&backend.requests()[0]), None);
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let (dispatcher, backend, _auth) = setup(
            FakeBackend::new().with_json(200, &json!([])),
            CountingAuthenticator::default(),
        );

        dispatcher.dispatch(&bearer(), request()).await.unwrap();

        assert_eq!(
            auth_header(&backend.requests()[0]),
            Some("Bearer token-0")
        );
    }

    #[tokio::test]
    async fn test_missing_token_sends_unauthenticated() {
        let (dispatcher, backend, _auth) = setup(
            FakeBackend::new().with_json(200, &json!([])),
            CountingAuthenticator {
                no_token: true,
                ..CountingAuthenticator::default()
            },
        );

        dispatcher.dispatch(&bearer(), request()).await.unwrap();
        assert_eq!(auth_header(&backend.requests()[0]), None);
    }

    #[tokio::test]
    async fn test_single_refresh_then_success() {
        let (dispatcher, backend, auth) = setup(
            FakeBackend::new()
                .with_status(401)
                .with_json(200, &json!([])),
            CountingAuthenticator::default(),
        );

        let response = dispatcher.dispatch(&bearer(), request()).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(auth.refreshes(), 1);
        let sent = backend.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(auth_header(&sent[0]), Some("Bearer token-0"));
        assert_eq!(auth_header(&sent[1]), Some("Bearer token-1"));
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_terminal() {
        let (dispatcher, backend, auth) = setup(
            FakeBackend::new()
                .with_status(401)
                .with_status(401)
                .with_json(200, &json!([])),
            CountingAuthenticator::default(),
        );

        let err = dispatcher.dispatch(&bearer(), request()).await.unwrap_err();

        assert!(matches!(
            err,
            HttpError::Auth(AuthError::Rejected(ref id)) if id == "remote"
        ));
        assert_eq!(auth.refreshes(), 1);
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_without_refresh_support_is_remote_error() {
        let (dispatcher, backend, auth) = setup(
            FakeBackend::new().with_status(401),
            CountingAuthenticator::default(),
        );

        let err = dispatcher
            .dispatch(&Connection::local(), request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HttpError::Status { status: 401, ref status_text } if status_text == "Unauthorized"
        ));
        assert_eq!(auth.refreshes(), 0);
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_surfaces_auth_error() {
        let (dispatcher, backend, _auth) = setup(
            FakeBackend::new().with_status(401),
            CountingAuthenticator::failing_refresh(AuthError::RefreshFailed {
                connection: "remote".to_string(),
                reason: "invalid_grant".to_string(),
            }),
        );

        let err = dispatcher.dispatch(&bearer(), request()).await.unwrap_err();

        assert!(matches!(
            err,
            HttpError::Auth(AuthError::RefreshFailed { .. })
        ));
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let (dispatcher, backend, auth) = setup(
            FakeBackend::new()
                .with_status(500)
                .with_json(200, &json!([])),
            CountingAuthenticator::default(),
        );

        let err = dispatcher.dispatch(&bearer(), request()).await.unwrap_err();

        assert!(matches!(err, HttpError::Status { status: 500, .. }));
        assert_eq!(auth.refreshes(), 0);
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_not_retried() {
        let (dispatcher, backend, _auth) = setup(
            FakeBackend::new()
                .with_error(HttpError::Timeout)
                .with_json(200, &json!([])),
            CountingAuthenticator::default(),
        );

        let err = dispatcher.dispatch(&bearer(), request()).await.unwrap_err();

        assert!(matches!(err, HttpError::Timeout));
        assert_eq!(backend.requests().len(), 1);
    }

    #[test]
    fn test_refresh_flag_starts_clear() {
        let connection = bearer();
        let call = AuthenticatedRequest::new(request(), &connection);
        assert!(!call.refresh_attempted());
        assert!(call.may_refresh());
        assert_eq!(call.connection().id.as_str(), "remote");
    }
}
