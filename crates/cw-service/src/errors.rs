//! Service error type with HTTP status mapping.
//!
//! The `IntoResponse` impl here is the single place denial bodies are
//! constructed: every authentication failure collapses to one generic 401
//! message (internal detail is logged, never sent), while authorization
//! failures get a 403 whose message is selected from the denied path and
//! method. No handler writes its own denial shape.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ApiResponse;

/// Generic message for every 401 outcome. Which verification step failed
/// is intentionally not disclosed to the caller.
const UNAUTHORIZED_MESSAGE: &str = "Authentication is required to access this resource.";

#[derive(Debug, Error)]
pub enum ApiError {
    // --- authentication taxonomy ---
    #[error("no credential presented")]
    NoCredential,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("unsupported token format")]
    UnsupportedTokenFormat,

    #[error("expired token")]
    ExpiredToken,

    #[error("wrong token kind")]
    WrongTokenKind,

    #[error("unknown subject")]
    UnknownSubject,

    #[error("invalid credentials")]
    InvalidCredentials,

    // --- authorization ---
    #[error("insufficient role for {method} {path}")]
    InsufficientRole { method: Method, path: String },

    // --- collaborator / request errors ---
    #[error("duplicate email")]
    DuplicateEmail,

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Select the context-specific 403 message for a denied request.
///
/// Distinct copy for the admin listing and for delete permission; a generic
/// fallback covers every other denial.
fn forbidden_message(method: &Method, path: &str) -> &'static str {
    if *method == Method::DELETE {
        "You do not have permission to delete this resource."
    } else if path.starts_with("/api/admin/users") {
        "You do not have permission to view the user list."
    } else if path.starts_with("/api/admin") {
        "You do not have permission to access administrative resources."
    } else {
        "You do not have permission to access this resource."
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NoCredential
            | ApiError::MalformedToken
            | ApiError::InvalidSignature
            | ApiError::UnsupportedTokenFormat
            | ApiError::ExpiredToken
            | ApiError::WrongTokenKind
            | ApiError::UnknownSubject => {
                (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_string())
            }

            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password.".to_string(),
            ),

            ApiError::InsufficientRole { method, path } => (
                StatusCode::FORBIDDEN,
                forbidden_message(method, path).to_string(),
            ),

            ApiError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "An account with this email already exists.".to_string(),
            ),

            ApiError::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("{resource} not found."))
            }

            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),

            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred.".to_string(),
            ),
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}
