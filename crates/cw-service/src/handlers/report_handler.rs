//! Human-report endpoints: public submission and listing, admin-gated
//! deletion (the DELETE gate lives in the access policy table).

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::models::{ApiResponse, NewReport, Report};
use crate::routes::AppState;

/// POST /api/reports
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewReport>,
) -> Result<Json<ApiResponse<Report>>, ApiError> {
    if payload.description.trim().is_empty() || payload.location.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Description and location must not be blank.".to_string(),
        ));
    }

    let report = state.reports.insert(payload).await?;
    Ok(Json(ApiResponse::success("Report submitted.", report)))
}

/// GET /api/reports
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Report>>>, ApiError> {
    let reports = state.reports.list().await?;
    Ok(Json(ApiResponse::success("Report list.", reports)))
}

/// DELETE /api/reports/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.reports.delete(report_id).await? {
        return Err(ApiError::NotFound { resource: "report" });
    }

    Ok(Json(ApiResponse::success("Report deleted.", ())))
}
