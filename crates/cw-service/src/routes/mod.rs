//! HTTP routes for the Curbwatch service.
//!
//! Defines the Axum router and application state. All shared state is
//! immutable after startup: key material and the policy/exemption tables
//! are read concurrently without locking, and collaborators are behind
//! `Arc<dyn Trait>` seams.

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{AccessPolicy, ExemptionList, PrincipalResolver, TokenCodec};
use crate::errors::ApiError;
use crate::handlers::{admin_handler, auth_handler, cctv_handler, report_handler, user_handler};
use crate::middleware;
use crate::repositories::{CctvCatalog, ReportStore, UserDirectory};

/// Application state shared across all handlers and middleware.
pub struct AppState {
    /// Token issuance and verification.
    pub tokens: TokenCodec,

    /// Ordered path/method → required-role table.
    pub policy: AccessPolicy,

    /// Authentication exemption allow-list.
    pub exemptions: ExemptionList,

    /// Verified claims → principal.
    pub resolver: PrincipalResolver,

    /// User directory collaborator.
    pub users: Arc<dyn UserDirectory>,

    /// Human-report collaborator.
    pub reports: Arc<dyn ReportStore>,

    /// CCTV catalog collaborator.
    pub cctvs: Arc<dyn CctvCatalog>,

    /// Directory served under `/uploads`.
    pub upload_dir: PathBuf,

    /// Allowed CORS origins; empty means any.
    pub cors_allowed_origins: Vec<String>,

    /// Prometheus render handle; `None` when no recorder is installed
    /// (tests).
    pub metrics: Option<PrometheusHandle>,
}

/// Build the application router.
///
/// Layer order (request passes outermost first):
/// 1. TraceLayer - request logging
/// 2. TimeoutLayer - 30 second request timeout
/// 3. CorsLayer - preflight and origin handling
/// 4. authentication middleware - exemptions, token handling, policy
pub fn build_routes(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_allowed_origins);

    Router::new()
        // Authentication endpoints (exempt)
        .route("/api/auth/login", post(auth_handler::login))
        .route("/api/auth/signup", post(auth_handler::signup))
        .route("/api/auth/email-check", post(auth_handler::email_check))
        .route("/api/auth/logout", post(auth_handler::logout))
        .route("/api/auth/refresh", post(auth_handler::refresh))
        // Public collaborator endpoints (exempt for GET/POST)
        .route(
            "/api/reports",
            get(report_handler::list).post(report_handler::create),
        )
        .route("/api/reports/:id", delete(report_handler::remove))
        .route("/api/cctvs", get(cctv_handler::list))
        .route("/api/cctvs/:id", get(cctv_handler::get_one))
        // Authenticated endpoints
        .route("/api/users/me", get(user_handler::me))
        .route("/api/admin/users", get(admin_handler::list_users))
        // Static upload serving (exempt)
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        // Operational endpoints (exempt)
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ))
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn render_metrics(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(ApiError::NotFound {
            resource: "metrics",
        })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
