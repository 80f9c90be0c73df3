//! Transport trait.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{TransportRequest, TransportResponse};

/// Sends one HTTP-like request and returns its status and body.
///
/// A transport reports only failures to exchange bytes. Any status code,
/// including 4xx and 5xx, is a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
