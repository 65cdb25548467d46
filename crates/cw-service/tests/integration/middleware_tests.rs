//! Integration tests for the authentication middleware: exemptions,
//! bearer extraction, and the collapse of every verification failure into
//! the uniform anonymous → 401 outcome.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use cw_service::models::Role;
use cw_test_utils::{tamper_signature, TestBackend, TestTokenBuilder};
use serde_json::json;
use tower::ServiceExt;

use crate::helpers::{assert_denial_body, get, post_json, send, GENERIC_401};

#[tokio::test]
async fn test_exempt_paths_succeed_without_authorization_header() {
    let backend = TestBackend::with_defaults();
    backend.cctvs.add_cctv("CW-01", "5th & Main");

    let (status, _) = get(&backend.router, "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&backend.router, "/api/cctvs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "CW-01");

    let (status, _) = post_json(
        &backend.router,
        "/api/reports",
        json!({"description": "blocked hydrant", "location": "5th & Main"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&backend.router, "/api/reports", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_without_header_is_generic_401() {
    let backend = TestBackend::with_defaults();

    let (status, body) = get(&backend.router, "/api/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}

#[tokio::test]
async fn test_options_preflight_bypasses_authentication() {
    let backend = TestBackend::with_defaults();

    // No Authorization header, admin-gated path: still not a 401/403
    let (status, _) = send(
        &backend.router,
        Method::OPTIONS,
        "/api/admin/users",
        None,
        None,
    )
    .await;
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert_ne!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_bearer_values_are_treated_as_no_token() {
    let backend = TestBackend::with_defaults();

    for value in ["Bearer", "Bearer ", "Basic abc", "bearer-token"] {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/users/me")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let response = backend.router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "value {value:?} should be anonymous"
        );
    }
}

#[tokio::test]
async fn test_bearer_prefix_is_case_insensitive() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .build();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = backend.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .build();

    let (status, body) = get(
        &backend.router,
        "/api/users/me",
        Some(&tamper_signature(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_is_rejected() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .build_with_secret("some-other-secret");

    let (status, _) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_on_protected_route_is_rejected() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    // Valid signature, valid expiry — but no roles claim: wrong kind
    let refresh_like = TestTokenBuilder::new().for_subject("1").build();

    let (status, body) = get(&backend.router, "/api/users/me", Some(&refresh_like)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}

#[tokio::test]
async fn test_unknown_subject_is_rejected_not_500() {
    let backend = TestBackend::with_defaults();

    let token = TestTokenBuilder::new()
        .for_subject("ghost@curbwatch.io")
        .with_roles("ROLE_USER")
        .build();

    let (status, body) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}

#[tokio::test]
async fn test_directory_failure_surfaces_as_401_not_500() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .build();

    backend.users.set_failing(true);

    let (status, body) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_denial_body(&body, GENERIC_401);
}

#[tokio::test]
async fn test_foreign_algorithm_token_is_rejected() {
    let backend = TestBackend::with_defaults();
    backend.users.add_user("alice@curbwatch.io", "pw", Role::User);

    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_USER")
        .with_algorithm(jsonwebtoken::Algorithm::HS512)
        .build();

    let (status, _) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_legacy_role_claim_keys_produce_identical_principals() {
    let backend = TestBackend::with_defaults();
    backend
        .users
        .add_user("alice@curbwatch.io", "pw", Role::Admin);

    // `role: "ADMIN"` and `auth: "ROLE_ADMIN"` must normalize identically
    let legacy = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_claim("role", json!("ADMIN"))
        .build();
    let canonical = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_roles("ROLE_ADMIN")
        .build();

    for token in [legacy, canonical] {
        let (status, body) = get(&backend.router, "/api/users/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["roles"], json!(["ROLE_ADMIN"]));
    }
}

#[tokio::test]
async fn test_legacy_sequence_roles_claim_is_accepted() {
    let backend = TestBackend::with_defaults();
    backend
        .users
        .add_user("alice@curbwatch.io", "pw", Role::Inspector);

    let token = TestTokenBuilder::new()
        .for_subject("alice@curbwatch.io")
        .with_claim("roles", json!(["INSPECTOR"]))
        .build();

    let (status, body) = get(&backend.router, "/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"], json!(["ROLE_INSPECTOR"]));
}
