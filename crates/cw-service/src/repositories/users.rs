//! User directory collaborator.
//!
//! The auth subsystem consults the directory on every resolution to pick
//! up account state that changed after token issuance. The trait seam
//! keeps the subsystem testable without a database; production wires the
//! Postgres implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::ApiError;
use crate::models::{NewUser, Role, UserRecord};

/// External user-identity collaborator.
///
/// A `NotFound` result (`Ok(None)`) is an authentication outcome, not an
/// error; I/O failures surface as `ApiError::Database` and are mapped to
/// an authentication failure at the resolution boundary.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ApiError>;

    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, ApiError>;

    async fn email_exists(&self, email: &str) -> Result<bool, ApiError>;

    async fn create(&self, new_user: NewUser) -> Result<UserRecord, ApiError>;

    async fn list(&self) -> Result<Vec<UserRecord>, ApiError>;
}

/// Postgres-backed directory (maps to the `users` table).
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape fetched from Postgres; the role column is stored as its bare
/// name and parsed into the enumeration on the way out.
#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    email: String,
    password_hash: String,
    display_name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord, ApiError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e| ApiError::Database(format!("corrupt role column: {e}")))?;

        Ok(UserRecord {
            user_id: self.user_id,
            email: self.email,
            password_hash: self.password_hash,
            display_name: self.display_name,
            role,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str = "user_id, email, password_hash, display_name, role, created_at";

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch user by email: {e}")))?;

        row.map(UserRow::into_record).transpose()
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch user by id: {e}")))?;

        row.map(UserRow::into_record).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| ApiError::Database(format!("Failed to check email: {e}")))?;

        Ok(exists.0)
    }

    async fn create(&self, new_user: NewUser) -> Result<UserRecord, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, password_hash, display_name, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.display_name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to create user: {e}")))?;

        row.into_record()
    }

    async fn list(&self) -> Result<Vec<UserRecord>, ApiError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to list users: {e}")))?;

        rows.into_iter().map(UserRow::into_record).collect()
    }
}
