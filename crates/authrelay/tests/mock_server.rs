//! End-to-end tests against a mock API server.
//!
//! These tests use wiremock to simulate the API and its token endpoint, and
//! exercise the reqwest transport and HTTP credentials together with the
//! client.

use std::sync::Arc;

use authrelay::{
    AccessToken, ApiClient, BaseUrl, ClientConfig, CredentialProvider, HttpCredentials,
    RefreshToken, RequestOptions, RouteNavigator, codes,
};
use futures_util::future::join_all;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to build a base URL from a mock server.
fn mock_base_url(server: &MockServer) -> BaseUrl {
    BaseUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn setup(
    server: &MockServer,
    access: &str,
) -> (Arc<ApiClient>, Arc<HttpCredentials>, Arc<RouteNavigator>) {
    let base_url = mock_base_url(server);
    let credentials = Arc::new(
        HttpCredentials::new(
            base_url.endpoint_url("/auth/refresh"),
            Some(AccessToken::new(access)),
            Some(RefreshToken::new("refresh-1")),
        )
        .unwrap(),
    );
    let navigator = Arc::new(RouteNavigator::new("/login", "/items"));

    let client = ApiClient::builder()
        .config(ClientConfig::new(base_url))
        .credentials(credentials.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();

    (Arc::new(client), credentials, navigator)
}

async fn mount_items(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "TOKEN_EXPIRED", "message": "jwt expired"}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(server)
        .await;
}

// ============================================================================
// Refresh-and-retry
// ============================================================================

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let server = MockServer::start().await;
    mount_items(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "refresh_token": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, credentials, _) = setup(&server, "expired");

    let response = client.get::<Vec<Value>>("/items").await.unwrap();
    assert_eq!(response.data, Some(vec![]));

    let tokens = credentials.tokens();
    assert_eq!(tokens.access_token, Some(AccessToken::new("fresh")));
    assert_eq!(tokens.refresh_token, Some(RefreshToken::new("refresh-2")));
}

#[tokio::test]
async fn test_concurrent_requests_share_one_refresh_call() {
    let server = MockServer::start().await;
    mount_items(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh"}))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, credentials, _) = setup(&server, "expired");

    let results = join_all((0..6).map(|_| {
        let client = Arc::clone(&client);
        async move { client.get::<Vec<Value>>("/items").await }
    }))
    .await;

    for result in results {
        assert_eq!(result.unwrap().data, Some(vec![]));
    }
    // Refresh token is kept when the endpoint does not rotate it.
    assert_eq!(
        credentials.tokens().refresh_token,
        Some(RefreshToken::new("refresh-1"))
    );
}

#[tokio::test]
async fn test_rejected_refresh_clears_session_and_redirects() {
    let server = MockServer::start().await;
    mount_items(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "INVALID_GRANT", "message": "refresh token expired"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, credentials, navigator) = setup(&server, "expired");

    let err = client.get::<Value>("/items").await.unwrap_err();
    assert_eq!(err.code, "TOKEN_EXPIRED");
    assert_eq!(err.message, "jwt expired");
    assert_eq!(err.status, 401);

    let cause = err.refresh_failure().unwrap();
    assert_eq!(cause.code, codes::REFRESH_FAILED);
    assert_eq!(cause.message, "refresh token expired");
    assert_eq!(cause.status, 401);

    assert!(credentials.access_token().is_none());
    assert!(credentials.tokens().refresh_token.is_none());
    assert_eq!(navigator.redirect_count(), 1);
    assert_eq!(navigator.return_to().as_deref(), Some("/items"));
}

#[tokio::test]
async fn test_skip_refresh_and_caller_headers_through_verbs() {
    let server = MockServer::start().await;
    mount_items(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let (client, credentials, navigator) = setup(&server, "expired");

    let err = client
        .get_with::<Value>("/items", RequestOptions::new().skip_refresh())
        .await
        .unwrap_err();
    assert_eq!(err.code, "TOKEN_EXPIRED");
    assert_eq!(err.status, 401);
    assert!(err.refresh_failure().is_none());

    // An explicit Authorization header replaces the stored token.
    let response = client
        .get_with::<Vec<Value>>(
            "/items",
            RequestOptions::new()
                .header("Authorization", "Bearer fresh")
                .skip_refresh(),
        )
        .await
        .unwrap();
    assert_eq!(response.data, Some(vec![]));

    assert_eq!(credentials.access_token(), Some(AccessToken::new("expired")));
    assert_eq!(navigator.redirect_count(), 0);
}

// ============================================================================
// Response interpretation
// ============================================================================

#[tokio::test]
async fn test_server_error_passes_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": "SERVER_ERROR", "message": "boom"}
        })))
        .mount(&server)
        .await;

    let (client, _, _) = setup(&server, "valid");

    let err = client.get::<Value>("/items").await.unwrap_err();
    assert_eq!(err.code, "SERVER_ERROR");
    assert_eq!(err.message, "boom");
    assert_eq!(err.status, 500);
}

#[tokio::test]
async fn test_no_content_and_json_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 1}})))
        .mount(&server)
        .await;

    let (client, _, _) = setup(&server, "valid");

    let deleted = client.delete::<Value>("/items/1").await.unwrap();
    assert_eq!(deleted.data, None);

    let updated = client
        .put::<_, Value>("/items/1", &json!({"name": "renamed"}))
        .await
        .unwrap();
    assert_eq!(updated.data, Some(json!({"id": 1})));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (client, _, _) = setup(&server, "valid");

    let err = client.get::<Value>("/items").await.unwrap_err();
    assert_eq!(err.code, codes::INVALID_RESPONSE);
    assert_eq!(err.status, 200);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let base_url = BaseUrl::new("http://127.0.0.1:1").unwrap();
    let credentials =
        Arc::new(HttpCredentials::new(base_url.endpoint_url("/auth/refresh"), None, None).unwrap());
    let client = ApiClient::builder()
        .config(ClientConfig::new(base_url))
        .credentials(credentials)
        .build()
        .unwrap();

    let err = client.get::<Value>("/items").await.unwrap_err();
    assert_eq!(err.code, codes::NETWORK_ERROR);
    assert_eq!(err.status, 0);
}
