//! Authentication endpoints: login, signup, email check, logout, refresh.
//!
//! All of these are on the exemption list — they are how callers obtain
//! credentials in the first place. Logout is a stateless no-op: there is
//! no server-side session to destroy, tokens simply age out.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::models::{ApiResponse, TokenPair, UserSummary};
use crate::routes::AppState;
use crate::services::token_service;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailCheckRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailCheckResult {
    pub duplicate: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let pair =
        token_service::login(&state.tokens, state.users.as_ref(), &payload.email, &payload.password)
            .await?;

    Ok(Json(ApiResponse::success("Login successful.", pair)))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password must not be blank.".to_string(),
        ));
    }

    let user = token_service::signup(
        state.users.as_ref(),
        payload.email.trim(),
        &payload.password,
        payload.display_name.trim(),
    )
    .await?;

    Ok(Json(ApiResponse::success(
        "Account created.",
        UserSummary::from(user),
    )))
}

/// POST /api/auth/email-check
pub async fn email_check(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmailCheckRequest>,
) -> Result<Json<ApiResponse<EmailCheckResult>>, ApiError> {
    let duplicate = state.users.email_exists(payload.email.trim()).await?;

    Ok(Json(ApiResponse::success(
        "Email availability checked.",
        EmailCheckResult { duplicate },
    )))
}

/// POST /api/auth/logout
pub async fn logout() -> Json<ApiResponse<()>> {
    Json(ApiResponse::success("Logged out.", ()))
}

/// POST /api/auth/refresh
///
/// The refresh exchange: a valid, unexpired refresh token buys a fresh
/// access + refresh pair. Any failure is the generic 401.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let pair =
        token_service::refresh(&state.tokens, state.users.as_ref(), &payload.refresh_token).await?;

    Ok(Json(ApiResponse::success("Token refreshed.", pair)))
}
