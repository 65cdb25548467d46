//! In-process router harness.
//!
//! Builds the full Curbwatch router backed by in-memory fakes so tests
//! drive the real middleware, policy and handlers with
//! `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;

use cw_service::auth::{AccessPolicy, ExemptionList, KeyMaterial, PrincipalResolver, TokenCodec};
use cw_service::routes::{build_routes, AppState};

use crate::fakes::{InMemoryCctvCatalog, InMemoryReportStore, InMemoryUserDirectory};
use crate::token_builders::TEST_SECRET;

/// Test backend: router plus handles to the fakes behind it.
pub struct TestBackend {
    pub router: Router,
    pub users: Arc<InMemoryUserDirectory>,
    pub reports: Arc<InMemoryReportStore>,
    pub cctvs: Arc<InMemoryCctvCatalog>,
}

/// Builder mirroring the startup wiring in `main`, with test defaults:
/// the harness secret, 30 min / 7 day lifetimes, 60 s skew, shipped
/// policy and exemption tables.
pub struct TestBackendBuilder {
    secret: String,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
    clock_skew_seconds: i64,
}

impl TestBackendBuilder {
    pub fn new() -> Self {
        Self {
            secret: TEST_SECRET.to_string(),
            access_ttl_seconds: 1800,
            refresh_ttl_seconds: 604_800,
            clock_skew_seconds: 60,
        }
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    pub fn with_access_ttl(mut self, seconds: u64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    pub fn with_clock_skew(mut self, seconds: i64) -> Self {
        self.clock_skew_seconds = seconds;
        self
    }

    pub fn build(self) -> TestBackend {
        let users = Arc::new(InMemoryUserDirectory::new());
        let reports = Arc::new(InMemoryReportStore::new());
        let cctvs = Arc::new(InMemoryCctvCatalog::new());

        let tokens = TokenCodec::new(
            KeyMaterial::from_secret(&self.secret),
            self.access_ttl_seconds,
            self.refresh_ttl_seconds,
            self.clock_skew_seconds,
        );

        let state = Arc::new(AppState {
            tokens,
            policy: AccessPolicy::standard(),
            exemptions: ExemptionList::standard(),
            resolver: PrincipalResolver::new(users.clone()),
            users: users.clone(),
            reports: reports.clone(),
            cctvs: cctvs.clone(),
            upload_dir: PathBuf::from("uploads"),
            cors_allowed_origins: Vec::new(),
            metrics: None,
        });

        TestBackend {
            router: build_routes(state),
            users,
            reports,
            cctvs,
        }
    }
}

impl Default for TestBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Backend with default settings.
    pub fn with_defaults() -> Self {
        TestBackendBuilder::new().build()
    }
}
