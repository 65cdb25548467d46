//! Administrative endpoints. Gated by the access policy (`/api/admin`
//! requires the ADMIN role); handlers assume authorization already
//! happened.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::models::{ApiResponse, UserSummary};
use crate::routes::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let users = state.users.list().await?;
    let summaries: Vec<UserSummary> = users.into_iter().map(UserSummary::from).collect();

    Ok(Json(ApiResponse::success("User list.", summaries)))
}
