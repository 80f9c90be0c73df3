//! Credential provider trait.

use async_trait::async_trait;

use crate::{AccessToken, Result};

/// Owner of the bearer credential.
///
/// The orchestrator never refreshes tokens itself; it asks the provider to do
/// so and then reads the result back through [`access_token`](Self::access_token).
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the current access token, if any.
    fn access_token(&self) -> Option<AccessToken>;

    /// Obtain a new access token.
    ///
    /// Success means the stored token has been replaced and is observable via
    /// the next [`access_token`](Self::access_token) call.
    async fn refresh(&self) -> Result<()>;

    /// Forget all stored credentials.
    fn clear(&self);
}
