//! Error types for authrelay.
//!
//! Every failure a caller can observe is an [`ApiError`]: a string code, a
//! human readable message and an HTTP-like status (0 when no HTTP response
//! was involved). Lower layers report [`TransportError`] and
//! [`InvalidInputError`], which convert into `ApiError` at the boundary.

use thiserror::Error;

/// Well-known [`ApiError`] codes produced by the client itself.
///
/// Server-supplied codes are passed through verbatim and are not listed here.
pub mod codes {
    /// Terminal 401 after a failed or skipped refresh.
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    /// Non-2xx response with an empty body.
    pub const EMPTY_RESPONSE: &str = "EMPTY_RESPONSE";
    /// Response body that is not valid JSON for the expected shape.
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
    /// Transport-level or otherwise unclassified failure.
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    /// The credential provider reported success but holds no token.
    pub const REFRESH_NO_TOKEN: &str = "REFRESH_NO_TOKEN";
    /// The credential provider could not refresh.
    pub const REFRESH_FAILED: &str = "REFRESH_FAILED";
    /// A waiter gave up on an in-flight refresh.
    pub const REFRESH_TIMEOUT: &str = "REFRESH_TIMEOUT";
    /// Error response without a usable `error` object.
    pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
    /// The request could not be built (bad header, unserializable body).
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
}

/// The unified error returned by every client operation.
///
/// `ApiError` is `Clone` so the outcome of one refresh can be handed to
/// every request that was waiting on it.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message} (status {status})")]
pub struct ApiError {
    /// Classification code, e.g. `NETWORK_ERROR` or a server-supplied code.
    pub code: String,
    /// Human readable description.
    pub message: String,
    /// HTTP status, or 0 for failures without an HTTP response.
    pub status: u16,
    /// The refresh failure that turned a 401 into a terminal error.
    #[source]
    pub cause: Option<Box<ApiError>>,
}

impl ApiError {
    /// Create a new error.
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
            cause: None,
        }
    }

    /// A `NETWORK_ERROR` with status 0.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_ERROR, message, 0)
    }

    /// The synthesized error for a 401 whose body carried nothing usable.
    pub fn unauthorized() -> Self {
        Self::new(codes::UNAUTHORIZED, "Unauthorized", 401)
    }

    /// A `REFRESH_FAILED` error at the given status.
    pub fn refresh_failed(message: impl Into<String>, status: u16) -> Self {
        Self::new(codes::REFRESH_FAILED, message, status)
    }

    /// Attach the refresh failure that caused this error.
    pub fn with_cause(mut self, cause: ApiError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The refresh failure behind this error, if any.
    pub fn refresh_failure(&self) -> Option<&ApiError> {
        self.cause.as_deref()
    }

    /// Check if this error is an authentication failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.code == codes::UNAUTHORIZED
    }

    /// Check if this error came from the refresh machinery rather than a request.
    pub fn is_refresh_error(&self) -> bool {
        matches!(
            self.code.as_str(),
            codes::REFRESH_FAILED | codes::REFRESH_NO_TOKEN | codes::REFRESH_TIMEOUT
        )
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The response body could not be read.
    #[error("failed to read response body: {message}")]
    Body { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::network(err.to_string())
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Invalid header name or value.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },
}

impl From<InvalidInputError> for ApiError {
    fn from(err: InvalidInputError) -> Self {
        ApiError::new(codes::INVALID_REQUEST, err.to_string(), 0)
    }
}
