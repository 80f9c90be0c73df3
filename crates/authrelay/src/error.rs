//! Client construction errors.
//!
//! Request-time failures are always [`ApiError`](authrelay_core::ApiError);
//! this module only covers assembling an [`ApiClient`](crate::ApiClient).

use thiserror::Error;

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No configuration was supplied.
    #[error("client configuration not set")]
    MissingConfig,

    /// No credential provider was supplied.
    #[error("credential provider not set")]
    MissingCredentials,

    /// The HTTP client could not be created.
    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}
