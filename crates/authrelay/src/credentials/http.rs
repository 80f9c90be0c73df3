//! Credentials refreshed against an HTTP token endpoint.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use authrelay_core::{AccessToken, ApiError, CredentialProvider, RefreshToken, Result, codes};

use crate::config::DEFAULT_USER_AGENT;
use crate::error::BuildError;
use crate::response::error_from_payload;

const REFRESH_FAILED: &str = "Token refresh failed";

/// A snapshot of the tokens held by [`HttpCredentials`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// A [`CredentialProvider`] that exchanges a refresh token for a new access
/// token at an HTTP endpoint.
///
/// The endpoint receives `POST {"refresh_token": "..."}` and must answer with
/// `{"access_token": "...", "refresh_token": "..."}`; the refresh token in the
/// answer is optional and replaces the stored one when present.
pub struct HttpCredentials {
    client: reqwest::Client,
    refresh_url: String,
    tokens: RwLock<SessionTokens>,
}

impl HttpCredentials {
    /// Create credentials that refresh against `refresh_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        refresh_url: impl Into<String>,
        access_token: Option<AccessToken>,
        refresh_token: Option<RefreshToken>,
    ) -> std::result::Result<Self, BuildError> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| BuildError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            refresh_url: refresh_url.into(),
            tokens: RwLock::new(SessionTokens {
                access_token,
                refresh_token,
            }),
        })
    }

    /// Export the current tokens for persistence.
    ///
    /// # Security
    ///
    /// Handle the returned tokens securely. They grant access to the account.
    pub fn tokens(&self) -> SessionTokens {
        self.read_tokens().clone()
    }

    fn read_tokens(&self) -> RwLockReadGuard<'_, SessionTokens> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tokens(&self) -> RwLockWriteGuard<'_, SessionTokens> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CredentialProvider for HttpCredentials {
    fn access_token(&self) -> Option<AccessToken> {
        self.read_tokens().access_token.clone()
    }

    #[instrument(skip(self), fields(url = %self.refresh_url))]
    async fn refresh(&self) -> Result<()> {
        info!("Refreshing access token");

        let refresh_token = self
            .read_tokens()
            .refresh_token
            .clone()
            .ok_or_else(|| ApiError::refresh_failed("no refresh token available", 0))?;

        let response = self
            .client
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })
            .send()
            .await
            .map_err(|e| ApiError::refresh_failed(format!("refresh request failed: {e}"), 0))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str(&text)
                .ok()
                .map(|payload| {
                    error_from_payload(payload, status, codes::REFRESH_FAILED, REFRESH_FAILED)
                        .message
                })
                .unwrap_or_else(|| REFRESH_FAILED.to_string());
            return Err(ApiError::refresh_failed(message, status));
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            ApiError::refresh_failed(format!("invalid refresh response: {e}"), status)
        })?;

        {
            let mut tokens = self.write_tokens();
            tokens.access_token = Some(AccessToken::new(body.access_token));
            if let Some(next) = body.refresh_token {
                tokens.refresh_token = Some(RefreshToken::new(next));
            }
        }

        debug!("Access token refreshed");
        Ok(())
    }

    fn clear(&self) {
        *self.write_tokens() = SessionTokens::default();
    }
}

impl std::fmt::Debug for HttpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCredentials")
            .field("refresh_url", &self.refresh_url)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
