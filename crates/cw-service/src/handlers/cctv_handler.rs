//! Public CCTV read endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::models::{ApiResponse, Cctv};
use crate::routes::AppState;

/// GET /api/cctvs
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Cctv>>>, ApiError> {
    let cctvs = state.cctvs.list().await?;
    Ok(Json(ApiResponse::success("CCTV list.", cctvs)))
}

/// GET /api/cctvs/:id
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(cctv_id): Path<i64>,
) -> Result<Json<ApiResponse<Cctv>>, ApiError> {
    let cctv = state
        .cctvs
        .find_by_id(cctv_id)
        .await?
        .ok_or(ApiError::NotFound { resource: "cctv" })?;

    Ok(Json(ApiResponse::success("CCTV detail.", cctv)))
}
