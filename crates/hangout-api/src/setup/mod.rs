//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use hangout_core::Config;
use hangout_processing::{register_pipelines, UploadService};
use hangout_storage::{LocalStore, Store};
use hangout_worker::{Dispatcher, DispatcherConfig};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    hangout_infra::init_telemetry(&config.telemetry())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    crate::error::hide_error_details(config.is_production());

    let state = build_state(&config).await?;
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}

/// Create the store and upload directories, start the dispatcher and subscribe the
/// image and video processors.
pub async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let store: Arc<dyn Store> = Arc::new(
        LocalStore::new(config.store_path())
            .await
            .context("Failed to initialize store")?,
    );

    tokio::fs::create_dir_all(config.upload_path())
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_path().display()
            )
        })?;

    let dispatcher_config = DispatcherConfig::from(&config.pipeline);
    let dispatcher = Arc::new(Dispatcher::new(dispatcher_config.clone()));
    register_pipelines(&dispatcher, store.clone())
        .await
        .context("Failed to register pipeline processors")?;

    tracing::info!(
        store_path = %store.location().display(),
        upload_path = %config.upload_path().display(),
        queue_size = dispatcher_config.queue_size,
        max_concurrent = dispatcher_config.max_concurrent,
        processing_timeout_secs = dispatcher_config.processing_timeout_secs,
        "Media pipeline initialized"
    );

    let uploads = UploadService::new(dispatcher.clone());

    Ok(Arc::new(AppState {
        config: config.clone(),
        store,
        dispatcher,
        uploads,
    }))
}
