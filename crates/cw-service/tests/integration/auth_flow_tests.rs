//! Integration tests for the credential endpoints: login, signup,
//! email-check, logout and the refresh exchange.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;
use cw_service::models::Role;
use cw_test_utils::TestBackend;
use serde_json::json;

use crate::helpers::{get, post_json};

#[tokio::test]
async fn test_login_returns_usable_token_pair() {
    let backend = TestBackend::with_defaults();
    backend
        .users
        .add_user("alice@curbwatch.io", "pw", Role::Admin);

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/login",
        json!({"email": "alice@curbwatch.io", "password": "pw"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SUCCESS");
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 1800);

    // The issued access token authenticates a protected request
    let access = body["data"]["access_token"].as_str().unwrap();
    let (status, body) = get(&backend.router, "/api/users/me", Some(access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@curbwatch.io");
    assert_eq!(body["data"]["roles"], json!(["ROLE_ADMIN"]));
}

#[tokio::test]
async fn test_login_failures_are_uniform_401() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    for payload in [
        json!({"email": "alice@curbwatch.io", "password": "wrong"}),
        json!({"email": "ghost@curbwatch.io", "password": "pw"}),
    ] {
        let (status, body) = post_json(&backend.router, "/api/auth/login", payload).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "ERROR");
        assert_eq!(body["message"], "Invalid email or password.");
        assert!(body["data"].is_null());
    }
}

#[tokio::test]
async fn test_signup_then_login() {
    let backend = TestBackend::with_defaults();

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/signup",
        json!({"email": "new@curbwatch.io", "password": "pw12345", "display_name": "New"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "ROLE_USER");

    let (status, _) = post_json(
        &backend.router,
        "/api/auth/login",
        json!({"email": "new@curbwatch.io", "password": "pw12345"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("taken@curbwatch.io", "pw", Role::User);

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/signup",
        json!({"email": "taken@curbwatch.io", "password": "pw", "display_name": "Dup"}),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn test_email_check_reports_duplicates() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("taken@curbwatch.io", "pw", Role::User);

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/email-check",
        json!({"email": "taken@curbwatch.io"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duplicate"], true);

    let (_, body) = post_json(
        &backend.router,
        "/api/auth/email-check",
        json!({"email": "free@curbwatch.io"}),
    )
    .await;
    assert_eq!(body["data"]["duplicate"], false);
}

#[tokio::test]
async fn test_logout_is_a_stateless_success() {
    let backend = TestBackend::with_defaults();

    let (status, body) = post_json(&backend.router, "/api/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SUCCESS");
}

#[tokio::test]
async fn test_refresh_exchange_issues_fresh_pair() {
    let backend = TestBackend::with_defaults();
    backend
        .users
        .add_user("alice@curbwatch.io", "pw", Role::Inspector);

    let (_, login_body) = post_json(
        &backend.router,
        "/api/auth/login",
        json!({"email": "alice@curbwatch.io", "password": "pw"}),
    )
    .await;
    let refresh_token = login_body["data"]["refresh_token"].as_str().unwrap();

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The fresh access token works against a protected route
    let access = body["data"]["access_token"].as_str().unwrap();
    let (status, body) = get(&backend.router, "/api/users/me", Some(access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"], json!(["ROLE_INSPECTOR"]));
}

#[tokio::test]
async fn test_refresh_reflects_role_changes_since_issuance() {
    let backend = TestBackend::with_defaults();
    backend
        .users
        .add_user("alice@curbwatch.io", "pw", Role::Admin);

    let (_, login_body) = post_json(
        &backend.router,
        "/api/auth/login",
        json!({"email": "alice@curbwatch.io", "password": "pw"}),
    )
    .await;
    let refresh_token = login_body["data"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    // Demote the user after the pair was issued
    backend.users.set_role("alice@curbwatch.io", Role::User);

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = body["data"]["access_token"].as_str().unwrap();
    let (_, body) = get(&backend.router, "/api/users/me", Some(access)).await;
    assert_eq!(body["data"]["roles"], json!(["ROLE_USER"]));
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    let (_, login_body) = post_json(
        &backend.router,
        "/api/auth/login",
        json!({"email": "alice@curbwatch.io", "password": "pw"}),
    )
    .await;
    let access_token = login_body["data"]["access_token"].as_str().unwrap();

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/refresh",
        json!({"refresh_token": access_token}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    crate::helpers::assert_denial_body(&body, crate::helpers::GENERIC_401);
}

#[tokio::test]
async fn test_refresh_rejects_garbage_token() {
    let backend = TestBackend::with_defaults();

    let (status, body) = post_json(
        &backend.router,
        "/api/auth/refresh",
        json!({"refresh_token": "definitely-not-a-token"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    crate::helpers::assert_denial_body(&body, crate::helpers::GENERIC_401);
}
