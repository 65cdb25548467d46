//! In-memory collaborator fakes.
//!
//! Drop-in replacements for the Postgres-backed collaborators so router
//! and middleware tests run without a database. Each fake can be switched
//! into a failing mode to exercise I/O-failure paths.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use cw_service::errors::ApiError;
use cw_service::models::{Cctv, NewReport, NewUser, Report, Role, UserRecord};
use cw_service::repositories::{CctvCatalog, ReportStore, UserDirectory};

fn unavailable() -> ApiError {
    ApiError::Database("collaborator unavailable (fake failure mode)".to_string())
}

/// In-memory user directory.
pub struct InMemoryUserDirectory {
    users: Mutex<Vec<UserRecord>>,
    fail: AtomicBool,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Add a user with a bcrypt-hashed password (low cost, tests only).
    pub fn add_user(&self, email: &str, password: &str, role: Role) -> UserRecord {
        let mut users = self.users.lock().expect("directory lock poisoned");
        let user = UserRecord {
            user_id: users.len() as i64 + 1,
            email: email.to_string(),
            password_hash: bcrypt::hash(password, 4).expect("test hash should not fail"),
            display_name: email.split('@').next().unwrap_or("user").to_string(),
            role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        user
    }

    /// Change a user's current role (simulates revocation after issuance).
    pub fn set_role(&self, email: &str, role: Role) {
        let mut users = self.users.lock().expect("directory lock poisoned");
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            user.role = role;
        }
    }

    /// Toggle failing mode: every call returns a database error.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .expect("directory lock poisoned")
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, ApiError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .expect("directory lock poisoned")
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .expect("directory lock poisoned")
            .iter()
            .any(|u| u.email == email))
    }

    async fn create(&self, new_user: NewUser) -> Result<UserRecord, ApiError> {
        self.check()?;
        let mut users = self.users.lock().expect("directory lock poisoned");
        let user = UserRecord {
            user_id: users.len() as i64 + 1,
            email: new_user.email,
            password_hash: new_user.password_hash,
            display_name: new_user.display_name,
            role: new_user.role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.check()?;
        Ok(self.users.lock().expect("directory lock poisoned").clone())
    }
}

/// In-memory report store.
pub struct InMemoryReportStore {
    reports: Mutex<Vec<Report>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn insert(&self, report: NewReport) -> Result<Report, ApiError> {
        let mut reports = self.reports.lock().expect("report lock poisoned");
        let created = Report {
            report_id: reports.len() as i64 + 1,
            description: report.description,
            location: report.location,
            image_url: report.image_url,
            created_at: Utc::now(),
        };
        reports.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Report>, ApiError> {
        Ok(self.reports.lock().expect("report lock poisoned").clone())
    }

    async fn delete(&self, report_id: i64) -> Result<bool, ApiError> {
        let mut reports = self.reports.lock().expect("report lock poisoned");
        let before = reports.len();
        reports.retain(|r| r.report_id != report_id);
        Ok(reports.len() < before)
    }
}

/// In-memory CCTV catalog.
pub struct InMemoryCctvCatalog {
    cctvs: Mutex<Vec<Cctv>>,
}

impl InMemoryCctvCatalog {
    pub fn new() -> Self {
        Self {
            cctvs: Mutex::new(Vec::new()),
        }
    }

    pub fn add_cctv(&self, name: &str, location: &str) -> Cctv {
        let mut cctvs = self.cctvs.lock().expect("cctv lock poisoned");
        let cctv = Cctv {
            cctv_id: cctvs.len() as i64 + 1,
            name: name.to_string(),
            location: location.to_string(),
            stream_url: None,
        };
        cctvs.push(cctv.clone());
        cctv
    }
}

impl Default for InMemoryCctvCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CctvCatalog for InMemoryCctvCatalog {
    async fn list(&self) -> Result<Vec<Cctv>, ApiError> {
        Ok(self.cctvs.lock().expect("cctv lock poisoned").clone())
    }

    async fn find_by_id(&self, cctv_id: i64) -> Result<Option<Cctv>, ApiError> {
        Ok(self
            .cctvs
            .lock()
            .expect("cctv lock poisoned")
            .iter()
            .find(|c| c.cctv_id == cctv_id)
            .cloned())
    }
}
