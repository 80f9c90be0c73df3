//! Shared test doubles for authrelay integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use authrelay::{
    AccessToken, ApiClient, ApiError, BaseUrl, ClientConfig, CredentialProvider, RouteNavigator,
    Transport, TransportError, TransportRequest, TransportResponse,
};
use tokio::sync::Notify;

/// Credentials whose refresh blocks until the test opens the gate.
pub struct GatedCredentials {
    token: Mutex<Option<AccessToken>>,
    next: Option<AccessToken>,
    pub gate: Notify,
    pub refreshes: AtomicUsize,
    pub clears: AtomicUsize,
}

impl GatedCredentials {
    /// `next` is the token a refresh stores; `None` makes refresh fail.
    pub fn new(current: &str, next: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(Some(AccessToken::new(current))),
            next: next.map(AccessToken::new),
            gate: Notify::new(),
            refreshes: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        })
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for GatedCredentials {
    fn access_token(&self) -> Option<AccessToken> {
        self.token.lock().unwrap().clone()
    }

    async fn refresh(&self) -> authrelay::Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        match &self.next {
            Some(next) => {
                *self.token.lock().unwrap() = Some(next.clone());
                Ok(())
            }
            None => Err(ApiError::refresh_failed("refresh token revoked", 401)),
        }
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap() = None;
    }
}

/// Transport that accepts exactly one bearer token and rejects everything else.
pub struct TokenGateTransport {
    accepted: String,
    body: String,
    pub sent: Mutex<Vec<TransportRequest>>,
}

impl TokenGateTransport {
    pub fn new(accepted: &str, body: &str) -> Arc<Self> {
        Arc::new(Self {
            accepted: format!("Bearer {accepted}"),
            body: body.to_string(),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for TokenGateTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let authorized = request.headers.get("Authorization") == Some(self.accepted.as_str());
        self.sent.lock().unwrap().push(request);
        tokio::task::yield_now().await;

        if authorized {
            Ok(TransportResponse::from_text(200, self.body.clone()))
        } else {
            Ok(TransportResponse::from_text(
                401,
                r#"{"error":{"code":"TOKEN_EXPIRED","message":"jwt expired"}}"#,
            ))
        }
    }
}

pub fn client_with(
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    navigator: Arc<RouteNavigator>,
    waiter_timeout: Duration,
) -> Arc<ApiClient> {
    let config = ClientConfig::new(BaseUrl::new("https://api.example.com").unwrap())
        .with_waiter_timeout(waiter_timeout);
    Arc::new(ApiClient::new(config, transport, credentials, navigator))
}

/// Yield until `n` requests are queued behind the in-flight refresh.
pub async fn until_waiters(client: &ApiClient, n: usize) {
    while client.coordinator().waiter_count() < n {
        tokio::task::yield_now().await;
    }
}
