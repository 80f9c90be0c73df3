//! Authenticated API client.
//!
//! [`ApiClient`] attaches the bearer token to each request. If the server
//! answers `401`, it gets a fresh token from the [`RefreshCoordinator`] and
//! replays the request once. A `401` on the replay is returned as-is.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use authrelay_core::{
    AccessToken, ApiError, ApiResponse, CredentialProvider, Headers, Method, Navigator, Result,
    Transport, TransportRequest, TransportResponse, codes,
};

use crate::config::ClientConfig;
use crate::coordinator::RefreshCoordinator;
use crate::error::BuildError;
use crate::navigation::NoopNavigator;
use crate::response;
use crate::transport::ReqwestTransport;

const UNAUTHORIZED: u16 = 401;

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers that override the injected defaults, including `Authorization`.
    pub headers: Headers,
    /// Return a `401` directly instead of refreshing and retrying.
    pub skip_refresh: bool,
}

impl RequestOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Do not refresh credentials if this request is rejected with `401`.
    pub fn skip_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }
}

/// One logical call, possibly sent twice.
struct PendingRequest {
    method: Method,
    url: String,
    headers: Headers,
    body: Option<String>,
    allow_refresh: bool,
}

/// HTTP client that authenticates requests and recovers from expired tokens.
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    coordinator: RefreshCoordinator,
}

impl ApiClient {
    /// Create a client from its collaborators.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let coordinator = RefreshCoordinator::with_waiter_timeout(
            Arc::clone(&credentials),
            navigator,
            config.waiter_timeout,
        );

        Self {
            config,
            transport,
            credentials,
            coordinator,
        }
    }

    /// Create a builder for fluent configuration.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the refresh coordinator shared by this client's requests.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>> {
        self.get_with(endpoint, RequestOptions::default()).await
    }

    /// Execute a GET request with per-request options.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>> {
        self.send(Method::Get, endpoint, None, options).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_with(endpoint, Some(body), RequestOptions::default()).await
    }

    /// Execute a POST request with an optional JSON body and options.
    pub async fn post_with<B, T>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Post, endpoint, body, options).await
    }

    /// Execute a PUT request with a JSON body.
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.put_with(endpoint, Some(body), RequestOptions::default()).await
    }

    /// Execute a PUT request with an optional JSON body and options.
    pub async fn put_with<B, T>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Put, endpoint, body, options).await
    }

    /// Execute a PATCH request with a JSON body.
    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.patch_with(endpoint, Some(body), RequestOptions::default()).await
    }

    /// Execute a PATCH request with an optional JSON body and options.
    pub async fn patch_with<B, T>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Patch, endpoint, body, options).await
    }

    /// Execute a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>> {
        self.delete_with(endpoint, RequestOptions::default()).await
    }

    /// Execute a DELETE request with per-request options.
    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>> {
        self.send(Method::Delete, endpoint, None, options).await
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body.map(to_json).transpose()?;
        self.send(method, endpoint, body.as_ref(), options).await
    }

    /// Execute a request.
    ///
    /// On `401` the credentials are refreshed (shared with any concurrent
    /// request) and the request is replayed once with the new token.
    ///
    /// # Errors
    ///
    /// - `INVALID_REQUEST` (status 0) if a caller header is malformed
    /// - `NETWORK_ERROR` (status 0) if the transport fails
    /// - the server's `error` object, or `UNAUTHORIZED`, with status 401 if
    ///   the refresh fails; the refresh error is attached as the cause
    /// - `EMPTY_RESPONSE`, `INVALID_RESPONSE` or the server's `error` object
    ///   for other non-success responses
    #[instrument(skip_all, fields(%method, endpoint))]
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>> {
        options.headers.validate()?;

        let request = PendingRequest {
            method,
            url: self.config.base_url.endpoint_url(endpoint),
            headers: options.headers,
            body: body.map(Value::to_string),
            allow_refresh: !options.skip_refresh,
        };

        let token = self.credentials.access_token();
        let first = self.dispatch(&request, token.as_ref()).await?;

        if first.status() != UNAUTHORIZED {
            return response::interpret(first).await;
        }

        if !request.allow_refresh {
            debug!("Unauthorized, refresh disabled for this request");
            return response::interpret(first).await;
        }

        debug!("Unauthorized, refreshing credentials");
        match self.coordinator.ensure_fresh_token().await {
            Ok(fresh) => {
                let retried = self.dispatch(&request, Some(&fresh)).await?;
                if retried.status() == UNAUTHORIZED {
                    warn!("Still unauthorized after refresh");
                }
                response::interpret(retried).await
            }
            Err(refresh_err) => Err(response::unauthorized(first).await.with_cause(refresh_err)),
        }
    }

    async fn dispatch(
        &self,
        request: &PendingRequest,
        token: Option<&AccessToken>,
    ) -> Result<TransportResponse> {
        let mut headers = Headers::new().with("Content-Type", "application/json");
        if let Some(token) = token {
            headers.insert("Authorization", token.bearer());
        }
        // Caller headers win, including an explicit Authorization.
        let headers = headers.merge(&request.headers);

        debug!(method = %request.method, url = %request.url, authed = token.is_some(), "Sending request");

        let response = self
            .transport
            .send(TransportRequest {
                method: request.method,
                url: request.url.clone(),
                headers,
                body: request.body.clone(),
            })
            .await?;

        Ok(response)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| {
        ApiError::new(
            codes::INVALID_REQUEST,
            format!("Failed to serialize body: {e}"),
            0,
        )
    })
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Set the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the transport. Defaults to a [`ReqwestTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the credential provider.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the navigator. Defaults to [`NoopNavigator`].
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or credentials are missing, or
    /// the default transport cannot be created.
    pub fn build(self) -> std::result::Result<ApiClient, BuildError> {
        let config = self.config.ok_or(BuildError::MissingConfig)?;
        let credentials = self.credentials.ok_or(BuildError::MissingCredentials)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config)?),
        };
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));

        Ok(ApiClient::new(config, transport, credentials, navigator))
    }
}
