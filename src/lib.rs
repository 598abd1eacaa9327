pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod net;
pub mod rate_limit;
pub mod routes;
pub mod spam;
pub mod state;
pub mod storage;
pub mod workbook;
pub mod writer;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;
use crate::rate_limit::ContactRateLimiter;
use crate::state::{AppState, SharedState};
use crate::storage::{DriveStore, LocalStore};
use crate::writer::WorkbookWriter;

/// Build the application router. Spawns the workbook writer task, so this
/// must be called from within a Tokio runtime.
pub fn build_app(config: Config) -> Router {
    let remote = config.drive.clone().map(|drive| {
        tracing::info!("Google Drive backend configured ({})", drive.file_name);
        DriveStore::new(drive)
    });
    let local = LocalStore::new(config.local_workbook_path.clone());
    let writer = WorkbookWriter::spawn(remote, local);

    let max_body_size = config.max_body_size;
    let rate_window = config.rate_limit_window_secs;

    let state: SharedState = Arc::new(AppState {
        config,
        writer,
        limiter: ContactRateLimiter::new(),
    });

    // Drop limiter windows for quiet IPs so the map doesn't grow with
    // every address ever seen. Windows older than twice the configured
    // window can no longer affect a check.
    let janitor = state.clone();
    tokio::spawn(async move {
        let max_age = std::time::Duration::from_secs(rate_window.max(60) * 2);
        let mut interval = tokio::time::interval(max_age);
        loop {
            interval.tick().await;
            janitor.limiter.cleanup(max_age);
        }
    });

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .fallback_service(ServeDir::new("static"))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cors::allow_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
