//! authrelay-core - Core types and traits for authenticated HTTP clients.
//!
//! This crate defines the boundaries the request orchestrator talks to:
//! a [`Transport`] that moves bytes, a [`CredentialProvider`] that owns the
//! bearer token, and a [`Navigator`] that is told when the user must log in
//! again. All failures surface as a single [`ApiError`].

pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

pub use error::{ApiError, InvalidInputError, TransportError, codes};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{CredentialProvider, Navigator, Transport};
pub use types::{ApiResponse, BaseUrl, Headers, Method, TransportRequest, TransportResponse};

/// Result type alias using [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;
