//! authrelay - Authenticated HTTP client with coordinated token refresh.
//!
//! Every request goes through an [`ApiClient`], which attaches the current
//! bearer token, and on a `401` asks the [`RefreshCoordinator`] for a fresh
//! token before replaying the request exactly once. Concurrent `401`s share a
//! single refresh.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use authrelay::{AccessToken, ApiClient, BaseUrl, ClientConfig, HttpCredentials, RefreshToken};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let base_url = BaseUrl::new("https://api.example.com/v1")?;
//! let credentials = Arc::new(HttpCredentials::new(
//!     base_url.endpoint_url("/auth/refresh"),
//!     Some(AccessToken::new("access")),
//!     Some(RefreshToken::new("refresh")),
//! )?);
//!
//! let client = ApiClient::builder()
//!     .config(ClientConfig::new(base_url))
//!     .credentials(credentials)
//!     .build()?;
//!
//! let items = client.get::<Vec<serde_json::Value>>("/items").await?;
//! println!("{:?}", items.data);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod navigation;
mod response;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use config::ClientConfig;
pub use coordinator::RefreshCoordinator;
pub use credentials::{HttpCredentials, SessionTokens};
pub use error::BuildError;
pub use navigation::{NoopNavigator, RouteNavigator};
pub use transport::ReqwestTransport;

pub use authrelay_core::{
    AccessToken, ApiError, ApiResponse, BaseUrl, CredentialProvider, Headers, Method, Navigator,
    RefreshToken, Result, Transport, TransportError, TransportRequest, TransportResponse, codes,
};
