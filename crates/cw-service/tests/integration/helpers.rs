//! Shared request helpers for integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// The one generic message every authentication failure produces.
pub const GENERIC_401: &str = "Authentication is required to access this resource.";

/// Send a request through the router and collect status + body.
///
/// Non-JSON bodies (e.g. the plain-text health response) come back as a
/// JSON string value.
pub async fn send(
    router: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

pub async fn get(router: &Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(router, Method::GET, path, token, None).await
}

pub async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, path, None, Some(body)).await
}

pub async fn delete(router: &Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(router, Method::DELETE, path, token, None).await
}

/// Assert the wire-exact denial envelope: status ERROR, null data.
pub fn assert_denial_body(body: &Value, expected_message: &str) {
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["message"], expected_message);
    assert!(body["data"].is_null());
}
