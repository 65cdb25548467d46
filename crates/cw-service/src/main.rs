//! Curbwatch API server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cw_service::auth::{AccessPolicy, ExemptionList, KeyMaterial, PrincipalResolver, TokenCodec};
use cw_service::config::Config;
use cw_service::repositories::{PgCctvCatalog, PgReportStore, PgUserDirectory};
use cw_service::routes::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cw_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Curbwatch API");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        access_ttl_seconds = config.access_ttl_seconds,
        refresh_ttl_seconds = config.refresh_ttl_seconds,
        clock_skew_seconds = config.clock_skew_seconds,
        "Configuration loaded successfully"
    );

    // Decode the signing secret exactly once, at startup
    let keys = KeyMaterial::from_secret(&config.token_secret);
    let tokens = TokenCodec::new(
        keys,
        config.access_ttl_seconds,
        config.refresh_ttl_seconds,
        config.clock_skew_seconds,
    );

    // Exemption list is configuration; fall back to the shipped defaults
    let exemptions = match &config.exempt_paths {
        Some(spec) => ExemptionList::parse(spec).map_err(|e| {
            error!("Failed to parse CW_EXEMPT_PATHS: {}", e);
            e
        })?,
        None => ExemptionList::standard(),
    };

    // Install the Prometheus recorder; the service runs fine without it
    let metrics = match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install metrics recorder: {}", e);
            None
        }
    };

    // Initialize database connection pool
    info!("Connecting to database...");
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    info!("Database connection established");

    let users = Arc::new(PgUserDirectory::new(db_pool.clone()));

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        tokens,
        policy: AccessPolicy::standard(),
        exemptions,
        resolver: PrincipalResolver::new(users.clone()),
        users,
        reports: Arc::new(PgReportStore::new(db_pool.clone())),
        cctvs: Arc::new(PgCctvCatalog::new(db_pool)),
        upload_dir: PathBuf::from(&config.upload_dir),
        cors_allowed_origins: config.cors_allowed_origins.clone(),
        metrics,
    });

    // Build application routes
    let app = routes::build_routes(state);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Curbwatch API listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Curbwatch API shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
