//! Route configuration and setup.

use crate::handlers::{health_check, upload_file};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use hangout_core::Config;
use hangout_infra::request_id_middleware;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let max_upload_size = config.max_upload_size_bytes();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    tracing::info!(
        max_upload_size_bytes = max_upload_size,
        http_concurrency_limit = config.http_concurrency_limit(),
        "HTTP limits configured"
    );

    Router::new()
        .route("/upload", post(upload_file))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit()))
        // The only body limit: its overflow error is the one `Multipart` reports as 413.
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
}
