//! Sangam server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{Json, Router, middleware, routing::get};
use sangam_api::{AppState, middleware::auth_middleware, router as api_router};
use sangam_common::{Config, LogFormat};
use sangam_core::{
    JobService, JobWorkerContext, NotificationDispatcher, PredefinedCatalog, sender_from_config,
    spawn_purge_scheduler,
};
use serde_json::{Value, json};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sangam=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": true, "message": "OK" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(config.logging.format);

    info!("Starting sangam server...");

    let db = sangam_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    sangam_db::migrate(&db).await?;
    info!("Migrations completed");

    let catalog = Arc::new(PredefinedCatalog::load(config.chat.catalog_path.as_deref())?);
    info!(questions = catalog.len(), "Loaded predefined chat questions");

    // Background jobs: push delivery and account purge
    let job_service = JobService::new();
    let job_sender = job_service.sender();
    let dispatcher = NotificationDispatcher::new(job_sender.clone());

    let state = AppState::new(Arc::new(db), &config, dispatcher, catalog)?;

    let worker_context = JobWorkerContext {
        push_sender: sender_from_config(&config.push),
        user_service: Some(state.user_service.clone()),
        retention_days: config.account.deletion_retention_days,
    };
    let _worker = job_service.start(worker_context);
    let _scheduler = spawn_purge_scheduler(
        job_sender,
        Duration::from_secs(config.account.purge_interval_secs.max(1)),
    );
    info!(
        push_enabled = config.push.enabled,
        retention_days = config.account.deletion_retention_days,
        "Background jobs started"
    );

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
