//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use hangout_core::PipelineName;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub store: String,
    pub pipelines: Vec<PipelineHealth>,
}

#[derive(Serialize)]
pub struct PipelineHealth {
    pub topic: &'static str,
    pub subscribed: bool,
}

/// `GET /health`: `200 {"status":"ok"}` when the store is listable and every topic has a
/// processor, `503` with `"degraded"` otherwise.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = match tokio::time::timeout(CHECK_TIMEOUT, state.store.list()).await {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => format!("unhealthy: {}", e),
        Err(_) => "timeout".to_string(),
    };

    let mut pipelines = Vec::with_capacity(PipelineName::ALL.len());
    for topic in PipelineName::ALL {
        pipelines.push(PipelineHealth {
            topic: topic.topic(),
            subscribed: state.dispatcher.has_subscriber(topic).await,
        });
    }

    let healthy = store == "healthy" && pipelines.iter().all(|p| p.subscribed);
    let (status_code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        tracing::warn!(store = %store, "Health check degraded");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status,
            store,
            pipelines,
        }),
    )
}
