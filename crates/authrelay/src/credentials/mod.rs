//! Credential provider implementations.

mod http;

pub use http::{HttpCredentials, SessionTokens};
