#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod auth;
mod client;
mod config;
mod dispatch;
mod error;
mod http;

// ============================================================================
// Public API
// ============================================================================

// Authentication
pub use auth::{ACCESS_TOKEN_ACCOUNT, KeychainAuthenticator, REFRESH_TOKEN_ACCOUNT};

// Client
pub use client::RegistrySecretsClient;

// Configuration
pub use config::DispatchConfig;

// Dispatch
pub use dispatch::{AuthenticatedRequest, SecureDispatcher};

// Errors
pub use error::{HttpError, HttpResult};

// Transport
pub use http::{HttpBackend, HttpRequest, HttpResponse, Method, ReqwestBackend};

// Silence unused dev-dependency warnings (used by integration tests)
#[cfg(test)]
use axum as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_util as _;
