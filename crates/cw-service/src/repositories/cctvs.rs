//! CCTV catalog collaborator. Public, read-only.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::ApiError;
use crate::models::Cctv;

#[async_trait]
pub trait CctvCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Cctv>, ApiError>;

    async fn find_by_id(&self, cctv_id: i64) -> Result<Option<Cctv>, ApiError>;
}

/// Postgres-backed catalog (maps to the `cctvs` table).
#[derive(Clone)]
pub struct PgCctvCatalog {
    pool: PgPool,
}

impl PgCctvCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CctvRow {
    cctv_id: i64,
    name: String,
    location: String,
    stream_url: Option<String>,
}

impl From<CctvRow> for Cctv {
    fn from(r: CctvRow) -> Self {
        Cctv {
            cctv_id: r.cctv_id,
            name: r.name,
            location: r.location,
            stream_url: r.stream_url,
        }
    }
}

#[async_trait]
impl CctvCatalog for PgCctvCatalog {
    async fn list(&self) -> Result<Vec<Cctv>, ApiError> {
        let rows = sqlx::query_as::<_, CctvRow>(
            "SELECT cctv_id, name, location, stream_url FROM cctvs ORDER BY cctv_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to list cctvs: {e}")))?;

        Ok(rows.into_iter().map(Cctv::from).collect())
    }

    async fn find_by_id(&self, cctv_id: i64) -> Result<Option<Cctv>, ApiError> {
        let row = sqlx::query_as::<_, CctvRow>(
            "SELECT cctv_id, name, location, stream_url FROM cctvs WHERE cctv_id = $1",
        )
        .bind(cctv_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch cctv: {e}")))?;

        Ok(row.map(Cctv::from))
    }
}
