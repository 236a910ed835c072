//! HTTP transport abstraction.
//!
//! The dispatcher and authenticator only see [`HttpRequest`] and
//! [`HttpResponse`]; the production transport is [`ReqwestBackend`]. Tests
//! inject a scripted backend instead of a process-wide client.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use url::Url;
use zeroize::Zeroizing;

use crate::config::DispatchConfig;
use crate::error::{HttpError, HttpResult};

// ============================================================================
// Request / Response
// ============================================================================

/// HTTP methods used by the registry-secrets API and the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound request.
///
/// Body and `Authorization` value live in zeroizing buffers and are
/// omitted from `Debug` output.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub content_type: Option<&'static str>,
    pub authorization: Option<Zeroizing<String>>,
    pub body: Option<Zeroizing<Vec<u8>>>,
}

impl HttpRequest {
    /// A request with no body and no credentials.
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            content_type: None,
            authorization: None,
            body: None,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json_body(mut self, body: Zeroizing<Vec<u8>>) -> Self {
        self.content_type = Some("application/json");
        self.body = Some(body);
        self
    }

    /// Attach an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn with_form_body(mut self, body: Zeroizing<Vec<u8>>) -> Self {
        self.content_type = Some("application/x-www-form-urlencoded");
        self.body = Some(body);
        self
    }

    /// Set the `Authorization` header value.
    #[must_use]
    pub fn with_authorization(mut self, value: Zeroizing<String>) -> Self {
        self.authorization = Some(value);
        self
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("content_type", &self.content_type)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "body",
                &self.body.as_ref().map(|b| format!("<{} bytes>", b.len())),
            )
            .finish()
    }
}

/// A response with its body fully read.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Zeroizing<Vec<u8>>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: Zeroizing::new(body.into()),
        }
    }

    /// Whether the status is in the 2xx range.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Canonical reason phrase for the status, e.g. `"Not Found"`.
    pub fn status_text(&self) -> String {
        status_text(self.status)
    }

    pub(crate) fn status_error(&self) -> HttpError {
        HttpError::Status {
            status: self.status,
            status_text: self.status_text(),
        }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("body", &format!("<{} bytes>", self.body.len()))
            .finish()
    }
}

pub(crate) fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status")
        .to_string()
}

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Sends one request and returns the complete response.
///
/// Implementations never retry and never inspect the status code.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> HttpResult<HttpResponse>;
}

#[async_trait]
impl<T: HttpBackend + ?Sized> HttpBackend for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> HttpResult<HttpResponse> {
        (**self).send(request).await
    }
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &DispatchConfig) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    fn build_request(&self, request: &HttpRequest) -> HttpResult<reqwest::RequestBuilder> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.clone());
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(ref authorization) = request.authorization {
            let mut value = HeaderValue::from_str(authorization).map_err(|_| {
                HttpError::InvalidRequest("authorization value is not a valid header".to_string())
            })?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.to_vec());
        }
        Ok(builder)
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: &HttpRequest) -> HttpResult<HttpResponse> {
        let response = self.build_request(request)?.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse {
            status,
            body: Zeroizing::new(body.to_vec()),
        })
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::testing::FakeBackend;
    use super::*;
    use serde_json::json;

    fn url() -> Url {
        Url::parse("http://127.0.0.1:10000/api/v1/registrysecrets").unwrap()
    }

    #[test]
    fn test_request_debug_redacts_secrets() {
        let request = HttpRequest::new(Method::Post, url())
            .with_json_body(Zeroizing::new(b"{\"credentials\":\"c2VjcmV0\"}".to_vec()))
            .with_authorization(Zeroizing::new("Bearer abc.def".to_string()));

        let debug = format!("{request:?}");
        assert!(!debug.contains("abc.def"));
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("application/json"));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(HttpResponse::new(404, "").status_text(), "Not Found");
        assert_eq!(HttpResponse::new(401, "").status_text(), "Unauthorized");
        assert_eq!(HttpResponse::new(599, "").status_text(), "Unknown Status");
    }

    #[test]
    fn test_is_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }

    #[test]
    fn test_reqwest_backend_creation() {
        assert!(ReqwestBackend::new(&DispatchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fake_backend_replays_in_order() {
        let backend = FakeBackend::new()
            .with_status(401)
            .with_json(200, &json!([]));

        let request = HttpRequest::new(Method::Get, url());
        assert_eq!(backend.send(&request).await.unwrap().status, 401);
        assert_eq!(backend.send(&request).await.unwrap().status, 200);
        assert!(matches!(
            backend.send(&request).await,
            Err(HttpError::Transport(_))
        ));
        assert_eq!(backend.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_arc_backend_delegates() {
        let backend = Arc::new(FakeBackend::new().with_status(204));
        let shared: Arc<FakeBackend> = Arc::clone(&backend);

        let response = shared
            .send(&HttpRequest::new(Method::Delete, url()))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        assert_eq!(backend.requests()[0].method, Method::Delete);
    }
}
