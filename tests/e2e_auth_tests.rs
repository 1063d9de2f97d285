//! End-to-end tests for authentication endpoints
//!
//! Tests login, logout, session management, and authentication requirements.

mod common;

use common::{TestClient, TestServer, ARTIST_PASS, ARTIST_USER};
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(ARTIST_USER, ARTIST_PASS).await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.unwrap();
    let token = body.get("token").and_then(|t| t.as_str()).unwrap();
    assert_eq!(token.len(), 64);
}

#[tokio::test]
async fn test_login_with_invalid_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(ARTIST_USER, "wrong_password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_nonexistent_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("nonexistent_user", "password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_persists_across_requests() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    // Login
    let response = client.login(ARTIST_USER, ARTIST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Make multiple requests with same client (session should persist)
    for _ in 0..5 {
        let response = client.home_posts().await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    // Login first
    let response = client.login(ARTIST_USER, ARTIST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Verify we can access a protected endpoint
    let response = client.home_posts().await;
    assert_eq!(response.status(), StatusCode::OK);

    // Logout
    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    // Verify we can no longer access the protected endpoint
    let response = client.home_posts().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_protected_endpoints_require_authentication() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.home_posts().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .create_post(serde_json::json!({"content": "hello"}))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.get_profile(ARTIST_USER).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bearer_header_authenticates() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(ARTIST_USER, ARTIST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.unwrap();
    let token = body.get("token").and_then(|t| t.as_str()).unwrap();

    // A fresh client with no cookie jar, using the Authorization header only
    let bare_client = reqwest::Client::new();
    let response = bare_client
        .get(format!("{}/student/homeposts", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unauthenticated_home_endpoint() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    // Home endpoint should work without authentication
    let response = client
        .client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Verify response contains expected fields
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("uptime").is_some());
    assert!(body.get("hash").is_some());
}
