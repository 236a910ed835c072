//! Internal error types for HTTP dispatch.
//!
//! These errors are mapped to the core `DispatchError` at the port boundary.

use cwctl_core::AuthError;
use thiserror::Error;

/// Result type alias for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors from building, sending or decoding a request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// DNS, connect or I/O failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a status the caller does not accept.
    #[error("Request failed with status {status} {status_text}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        status_text: String,
    },

    /// Authentication could not be attached, refreshed, or was rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request payload could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Response body was not the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request could not be expressed on the wire.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}
