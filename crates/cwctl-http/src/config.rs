//! Public configuration for outbound requests.

use std::time::Duration;

/// Configuration for the HTTP transport.
///
/// # Example
///
/// ```
/// use cwctl_http::DispatchConfig;
/// use std::time::Duration;
///
/// let config = DispatchConfig::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-tool/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Whole-request timeout; expiry surfaces as a network error
    pub(crate) timeout: Duration,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("cwctl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl DispatchConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The configured request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
