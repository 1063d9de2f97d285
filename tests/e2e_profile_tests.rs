//! End-to-end tests for the profile and follow endpoints
//!
//! Tests the aggregated profile payload for each role and follow toggling.

mod common;

use common::{
    TestClient, TestServer, ARTIST_ART_FORM, ARTIST_SPECIALISATION, ARTIST_USER,
    INSTITUTION_AFFILIATION, INSTITUTION_REGISTRATION_ID, INSTITUTION_USER, PROVIDER_OWNER_NAME,
    PROVIDER_USER, STUDENT_PASS, STUDENT_USER,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_artist_profile_fields() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_profile(ARTIST_USER).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    let profile = &body["profile"];
    assert_eq!(profile["userName"], ARTIST_USER);
    assert_eq!(profile["role"], "Artist");
    assert_eq!(profile["artForm"], ARTIST_ART_FORM);
    assert_eq!(profile["specialisation"], ARTIST_SPECIALISATION);
    assert_eq!(profile["followerCount"], 0);
    assert_eq!(profile["numberOfPosts"], 0);
    assert_eq!(profile["following"], false);

    // Fields from other roles are omitted, not nulled
    assert!(profile.get("institutionName").is_none());
    assert!(profile.get("expertise").is_none());
}

#[tokio::test]
async fn test_institution_profile_fields() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let body: serde_json::Value = client
        .get_profile(INSTITUTION_USER)
        .await
        .json()
        .await
        .unwrap();
    let profile = &body["profile"];
    assert_eq!(profile["role"], "Institution");
    assert_eq!(profile["institutionName"], INSTITUTION_AFFILIATION);
    assert_eq!(profile["registrationID"], INSTITUTION_REGISTRATION_ID);
    assert_eq!(profile["district"], "Bangalore");
    assert_eq!(profile["state"], "Karnataka");
    assert_eq!(profile["country"], "India");
}

#[tokio::test]
async fn test_service_provider_profile_fields() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let body: serde_json::Value = client
        .get_profile(PROVIDER_USER)
        .await
        .json()
        .await
        .unwrap();
    let profile = &body["profile"];
    assert_eq!(profile["role"], "Service Provider");
    assert_eq!(profile["ownerName"], PROVIDER_OWNER_NAME);
    let expertise = profile["expertise"].as_array().unwrap();
    assert_eq!(expertise.len(), 2);
}

#[tokio::test]
async fn test_profile_includes_posts() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    for content in ["a", "b"] {
        let response = client.create_post(json!({"content": content})).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let body: serde_json::Value = client
        .get_profile(ARTIST_USER)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["profile"]["numberOfPosts"], 2);
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);

    // Another user's profile does not include these posts
    let body: serde_json::Value = client
        .get_profile(STUDENT_USER)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["profile"]["numberOfPosts"], 0);
    assert!(body["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_follow() {
    let server = TestServer::spawn().await;
    let student =
        TestClient::authenticated_as(server.base_url.clone(), STUDENT_USER, STUDENT_PASS).await;

    let response = student.toggle_follow(ARTIST_USER).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["following"], true);

    // The artist's profile now reflects the follower and the viewer's state
    let body: serde_json::Value = student
        .get_profile(ARTIST_USER)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["profile"]["followerCount"], 1);
    assert_eq!(body["profile"]["following"], true);

    // Toggling again unfollows
    let body: serde_json::Value = student
        .toggle_follow(ARTIST_USER)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["following"], false);

    let body: serde_json::Value = student
        .get_profile(ARTIST_USER)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["profile"]["followerCount"], 0);
}

#[tokio::test]
async fn test_follow_is_per_user() {
    let server = TestServer::spawn().await;
    let artist = TestClient::authenticated(server.base_url.clone()).await;
    let student =
        TestClient::authenticated_as(server.base_url.clone(), STUDENT_USER, STUDENT_PASS).await;

    let response = student.toggle_follow(INSTITUTION_USER).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = artist
        .get_profile(INSTITUTION_USER)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["profile"]["followerCount"], 1);
    // The artist is not following, only the student is
    assert_eq!(body["profile"]["following"], false);
}

#[tokio::test]
async fn test_cannot_follow_yourself() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.toggle_follow(ARTIST_USER).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_unknown_username() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_profile("nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.toggle_follow("nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_requires_authentication() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_profile(ARTIST_USER).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.toggle_follow(ARTIST_USER).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
