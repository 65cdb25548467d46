//! Authenticated user endpoints.

use axum::{Extension, Json};
use serde::Serialize;

use crate::errors::ApiError;
use crate::models::{ApiResponse, Principal};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub email: String,
    pub roles: Vec<String>,
}

/// GET /api/users/me
///
/// The principal is placed in request extensions by the authentication
/// middleware; the access policy guarantees it is present here.
pub async fn me(
    principal: Option<Extension<Principal>>,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let Some(Extension(principal)) = principal else {
        return Err(ApiError::NoCredential);
    };

    Ok(Json(ApiResponse::success(
        "Authenticated principal.",
        MeResponse {
            user_id: principal.user_id,
            email: principal.email.clone(),
            roles: principal
                .roles
                .iter()
                .map(|r| r.authority().to_string())
                .collect(),
        },
    )))
}
