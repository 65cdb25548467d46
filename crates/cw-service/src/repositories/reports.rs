//! Human-report collaborator.
//!
//! Citizen-submitted violation reports: public submission and listing,
//! admin-gated deletion (enforced by the access policy, not here).

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::ApiError;
use crate::models::{NewReport, Report};

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: NewReport) -> Result<Report, ApiError>;

    async fn list(&self) -> Result<Vec<Report>, ApiError>;

    /// Delete by id; `Ok(false)` means no such report.
    async fn delete(&self, report_id: i64) -> Result<bool, ApiError>;
}

/// Postgres-backed report store (maps to the `reports` table).
#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    report_id: i64,
    description: String,
    location: String,
    image_url: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReportRow> for Report {
    fn from(r: ReportRow) -> Self {
        Report {
            report_id: r.report_id,
            description: r.description,
            location: r.location,
            image_url: r.image_url,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: NewReport) -> Result<Report, ApiError> {
        let row = sqlx::query_as::<_, ReportRow>(
            "INSERT INTO reports (description, location, image_url) \
             VALUES ($1, $2, $3) \
             RETURNING report_id, description, location, image_url, created_at",
        )
        .bind(&report.description)
        .bind(&report.location)
        .bind(&report.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to insert report: {e}")))?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Report>, ApiError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT report_id, description, location, image_url, created_at \
             FROM reports ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to list reports: {e}")))?;

        Ok(rows.into_iter().map(Report::from).collect())
    }

    async fn delete(&self, report_id: i64) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM reports WHERE report_id = $1")
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ApiError::Database(format!("Failed to delete report: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
