//! Request authentication middleware.
//!
//! Per-request pipeline: exemption check → bearer extraction → token
//! verification → principal resolution → policy evaluation. Verification
//! and resolution failures leave the request anonymous (logged with path
//! and reason, never surfaced directly); the policy layer then produces
//! the uniform 401/403 through the service error type. The resolved
//! principal lives in request extensions only — no shared mutable state.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{Decision, DenyReason};
use crate::errors::ApiError;
use crate::models::Principal;
use crate::observability::metrics::{record_authz_decision, record_token_validation};
use crate::routes::AppState;

/// Extract the bearer token from request headers.
///
/// The header name is fixed (`Authorization`); the value must carry a
/// case-insensitive `Bearer` prefix followed by at least one
/// non-whitespace character. Anything else is treated as "no token".
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, rest) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// Authentication + authorization middleware applied to every route.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // Exempted paths (and all OPTIONS preflights) bypass authentication
    // and authorization entirely.
    if state.exemptions.is_exempt(&method, &path) {
        return Ok(next.run(req).await);
    }

    // Token resolution. Every failure class collapses to "anonymous"
    // here; the reason is logged for operators but the caller only ever
    // sees the uniform denial produced below.
    let principal: Option<Principal> = match bearer_token(req.headers()) {
        None => None,
        Some(token) => match state.tokens.verify(token) {
            Ok(verified) => match state.resolver.resolve(&verified).await {
                Ok(principal) => {
                    record_token_validation("success", None);
                    Some(principal)
                }
                Err(e) => {
                    record_token_validation("error", Some("resolution"));
                    tracing::warn!(
                        target: "cw.middleware.auth",
                        path = %path,
                        reason = %e,
                        "principal resolution failed"
                    );
                    None
                }
            },
            Err(e) => {
                record_token_validation("error", Some(token_failure_label(&e)));
                tracing::warn!(
                    target: "cw.middleware.auth",
                    path = %path,
                    reason = %e,
                    "token verification failed"
                );
                None
            }
        },
    };

    match state.policy.authorize(principal.as_ref(), &path, &method) {
        Decision::Allow => {
            record_authz_decision("allow");
            if let Some(principal) = principal {
                req.extensions_mut().insert(principal);
            }
            Ok(next.run(req).await)
        }
        Decision::Deny(DenyReason::NoCredential) => {
            record_authz_decision("deny_unauthenticated");
            tracing::warn!(
                target: "cw.middleware.auth",
                path = %path,
                method = %method,
                "rejecting unauthenticated request"
            );
            Err(ApiError::NoCredential)
        }
        Decision::Deny(DenyReason::InsufficientRole { required }) => {
            record_authz_decision("deny_forbidden");
            tracing::warn!(
                target: "cw.middleware.auth",
                path = %path,
                method = %method,
                required = %required,
                "rejecting request with insufficient role"
            );
            Err(ApiError::InsufficientRole { method, path })
        }
    }
}

fn token_failure_label(e: &crate::auth::TokenError) -> &'static str {
    use crate::auth::TokenError;
    match e {
        TokenError::Malformed => "malformed",
        TokenError::InvalidSignature => "invalid_signature",
        TokenError::Unsupported => "unsupported",
        TokenError::Expired(_) => "expired",
    }
}
