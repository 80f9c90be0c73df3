//! Client configuration.

use std::time::Duration;

use authrelay_core::BaseUrl;

/// How long a request waits on someone else's refresh before giving up.
pub const DEFAULT_WAITER_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Per-request timeout applied by the reqwest transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent by the reqwest transport.
pub const DEFAULT_USER_AGENT: &str = concat!("authrelay/", env!("CARGO_PKG_VERSION"));

/// Configuration for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL endpoints are resolved against.
    pub base_url: BaseUrl,
    /// Deadline for requests queued behind an in-flight refresh.
    pub waiter_timeout: Duration,
    /// Timeout for a single HTTP exchange.
    pub request_timeout: Duration,
    /// User agent for the default transport.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            waiter_timeout: DEFAULT_WAITER_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the refresh waiter deadline.
    pub fn with_waiter_timeout(mut self, timeout: Duration) -> Self {
        self.waiter_timeout = timeout;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
