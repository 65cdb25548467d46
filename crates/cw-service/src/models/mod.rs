//! Data models shared across the Curbwatch service.
//!
//! Contains the role enumeration, the per-request `Principal`, collaborator
//! records (users, reports, CCTV installations) and the uniform response
//! envelope used by every handler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authority prefix carried by every canonical role name.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Closed role enumeration.
///
/// The set of roles is fixed; tokens carrying role names outside this set
/// have those names dropped at principal-resolution time rather than
/// causing a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Inspector,
    User,
}

impl Role {
    /// Canonical prefixed authority name (e.g. `ROLE_ADMIN`).
    pub fn authority(&self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Inspector => "ROLE_INSPECTOR",
            Role::User => "ROLE_USER",
        }
    }

    /// Bare name without the authority prefix (e.g. `ADMIN`).
    ///
    /// This is the form stored in the users table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Inspector => "INSPECTOR",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.authority())
    }
}

/// Error returned when a role name does not map onto the enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role name: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Parse a role name, accepting prefixed (`ROLE_ADMIN`) or bare
    /// (`ADMIN`) forms case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let bare = name
            .strip_prefix(ROLE_PREFIX)
            .or_else(|| {
                // tolerate lowercase prefix from historical issuers
                if name.len() >= ROLE_PREFIX.len()
                    && name
                        .get(..ROLE_PREFIX.len())
                        .is_some_and(|p| p.eq_ignore_ascii_case(ROLE_PREFIX))
                {
                    name.get(ROLE_PREFIX.len()..)
                } else {
                    None
                }
            })
            .unwrap_or(name);

        if bare.eq_ignore_ascii_case("ADMIN") {
            Ok(Role::Admin)
        } else if bare.eq_ignore_ascii_case("INSPECTOR") {
            Ok(Role::Inspector)
        } else if bare.eq_ignore_ascii_case("USER") {
            Ok(Role::User)
        } else {
            Err(UnknownRole(s.to_string()))
        }
    }
}

/// The authenticated identity attached to a single request.
///
/// Built fresh on every request by the principal resolver, inserted into
/// request extensions by the authentication middleware, and discarded when
/// the request ends. Never cached across requests, never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    /// Role set: duplicate-free, order preserved from the token claim.
    pub roles: Vec<Role>,
}

impl Principal {
    /// Check whether the principal holds a specific role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// User record as exposed by the user directory collaborator.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: i64,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Input for user creation through the directory.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
}

/// Citizen-submitted violation report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub report_id: i64,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for report submission.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// CCTV installation, publicly readable.
#[derive(Debug, Clone, Serialize)]
pub struct Cctv {
    pub cctv_id: i64,
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
}

/// Issued token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// User summary exposed to admins (no credential material).
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserSummary {
    fn from(u: UserRecord) -> Self {
        Self {
            user_id: u.user_id,
            email: u.email,
            display_name: u.display_name,
            role: u.role.authority().to_string(),
            created_at: u.created_at,
        }
    }
}

/// Uniform response envelope.
///
/// Every body this service writes, success or denial, has the shape
/// `{"status": ..., "message": ..., "data": ...}` with `data` null on
/// errors. Error bodies are built exclusively in `errors.rs`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "SUCCESS",
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "ERROR",
            message: message.into(),
            data: None,
        }
    }
}
