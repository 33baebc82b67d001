//! Atomic Energy skill server library logic.

pub mod api;
pub mod config;

use atomic_skill::Dispatcher;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Routes skill requests to handlers.
    pub dispatcher: Arc<Dispatcher>,
    /// Directory of static files; skipped if it does not exist.
    pub public_dir: PathBuf,
}

/// Maximum request body size (256 KiB). Platform envelopes are a few KiB.
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let public_dir = state.public_dir.clone();
    let router = if public_dir.is_dir() {
        tracing::info!(path = %public_dir.display(), "serving static files");
        let files = ServeDir::new(&public_dir);
        Router::new()
            .route(
                "/",
                post(api::skill_handler).get_service(files.clone()),
            )
            .route("/health", get(health))
            .fallback_service(files)
    } else {
        tracing::info!(
            path = %public_dir.display(),
            "static directory not found, skipping static file serving"
        );
        Router::new()
            .route("/", post(api::skill_handler))
            .route("/health", get(health))
    };

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}

/// Installs the global tracing subscriber.
///
/// Falls back to `info` if `level` is not a valid filter directive.
pub fn init_tracing(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
