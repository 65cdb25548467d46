//! Integration tests for expiry and clock-skew handling through the full
//! request pipeline.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;
use cw_service::models::Role;
use cw_test_utils::{TestBackend, TestBackendBuilder, TestTokenBuilder};

use crate::helpers::{assert_denial_body, get, GENERIC_401};

#[tokio::test]
async fn test_token_expired_within_skew_is_accepted() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    // Expired 30 seconds ago, inside the 60 second tolerance
    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .expires_in(-30)
        .build();

    let (status, _) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_expired_beyond_skew_is_generic_401() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    // Expired 2 minutes ago, past the 60 second tolerance — the caller
    // sees the same generic denial as any other authentication failure
    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .expires_in(-120)
        .build();

    let (status, body) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}

#[tokio::test]
async fn test_expired_admin_token_scenario() {
    // Scenario: admin authenticates, works, then the access token ages
    // out — the admin route flips from 200 to the generic 401.
    let backend = TestBackend::with_defaults();
    backend
        .users
        .add_user("admin@curbwatch.io", "pw", Role::Admin);

    let live = TestTokenBuilder::new()
        .for_subject("admin@curbwatch.io")
        .with_roles("ROLE_ADMIN")
        .expires_in(1800)
        .build();
    let (status, _) = get(&backend.router, "/api/admin/users", Some(&live)).await;
    assert_eq!(status, StatusCode::OK);

    let stale = TestTokenBuilder::new()
        .for_subject("admin@curbwatch.io")
        .with_roles("ROLE_ADMIN")
        .expires_in(-61)
        .build();
    let (status, body) = get(&backend.router, "/api/admin/users", Some(&stale)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}

#[tokio::test]
async fn test_custom_skew_configuration_is_honored() {
    let backend = TestBackendBuilder::new().with_clock_skew(120).build();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    // 90 seconds past expiry: outside the default 60s, inside custom 120s
    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .expires_in(-90)
        .build();

    let (status, _) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_refresh_token_cannot_be_exchanged() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    let expired_refresh = TestTokenBuilder::new()
        .for_subject("1")
        .expires_in(-120)
        .build();

    let (status, body) = crate::helpers::post_json(
        &backend.router,
        "/api/auth/refresh",
        serde_json::json!({"refresh_token": expired_refresh}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}
