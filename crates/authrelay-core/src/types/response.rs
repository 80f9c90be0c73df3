//! Transport and client response types.

use std::fmt;
use std::future::Future;

use futures_core::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// A response as returned by a [`Transport`](crate::Transport).
///
/// The body is produced lazily and can be read once: [`text`](Self::text)
/// consumes the response. Dropping the response without reading it never
/// touches the body.
pub struct TransportResponse {
    status: u16,
    body: BoxFuture<'static, Result<String, TransportError>>,
}

impl TransportResponse {
    /// Create a response whose body is produced by `body` on first read.
    pub fn new<F>(status: u16, body: F) -> Self
    where
        F: Future<Output = Result<String, TransportError>> + Send + 'static,
    {
        Self {
            status,
            body: Box::pin(body),
        }
    }

    /// Create a response with an already buffered body.
    pub fn from_text(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(status, async move { Ok(text) })
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the body as text.
    pub async fn text(self) -> Result<String, TransportError> {
        self.body.await
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// The successful result of a client call.
///
/// Success bodies use a `{"data": ...}` envelope; `data` is `None` for
/// `204 No Content`, for empty 2xx bodies, and for envelopes without data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// A result without data.
    pub fn empty() -> Self {
        Self { data: None }
    }
}
