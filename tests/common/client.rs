//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all artistry-hub-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication and registration flows.
    /// For most tests, use `authenticated()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client pre-authenticated as the artist fixture user
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, ARTIST_USER, ARTIST_PASS).await
    }

    /// Creates a client pre-authenticated as the given fixture user
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_as(base_url: String, username: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(username, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Test user authentication failed: {:?}",
            response.text().await
        );

        client
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /auth/register
    pub async fn register(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
        role: &str,
        additional_data: Value,
    ) -> Response {
        self.client
            .post(format!("{}/auth/register", self.base_url))
            .json(&json!({
                "userName": user_name,
                "email": email,
                "password": password,
                "role": role,
                "additionalData": additional_data,
            }))
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /auth/login
    pub async fn login(&self, user_name: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({
                "userName": user_name,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    // ========================================================================
    // Feed Endpoints
    // ========================================================================

    /// GET /student/homeposts
    pub async fn home_posts(&self) -> Response {
        self.client
            .get(format!("{}/student/homeposts", self.base_url))
            .send()
            .await
            .expect("Home posts request failed")
    }

    /// POST /posts
    pub async fn create_post(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/posts", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Create post request failed")
    }

    /// POST /posts/{id}/toggle-like
    pub async fn toggle_like(&self, post_id: &str) -> Response {
        self.client
            .post(format!("{}/posts/{}/toggle-like", self.base_url, post_id))
            .send()
            .await
            .expect("Toggle like request failed")
    }

    // ========================================================================
    // Profile Endpoints
    // ========================================================================

    /// GET /common-things/profile/{username}
    pub async fn get_profile(&self, username: &str) -> Response {
        self.client
            .get(format!(
                "{}/common-things/profile/{}",
                self.base_url, username
            ))
            .send()
            .await
            .expect("Get profile request failed")
    }

    /// POST /common-things/profile/{username}/follow
    pub async fn toggle_follow(&self, username: &str) -> Response {
        self.client
            .post(format!(
                "{}/common-things/profile/{}/follow",
                self.base_url, username
            ))
            .send()
            .await
            .expect("Toggle follow request failed")
    }
}
