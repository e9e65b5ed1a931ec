//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p hangout-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use hangout_api::setup::{build_state, routes};
use hangout_api::AppState;
use hangout_core::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn store_path(&self) -> &Path {
        self.state.store.location()
    }

    pub fn upload_path(&self) -> &PathBuf {
        self.state.config.upload_path()
    }

    pub async fn stored(&self) -> Vec<String> {
        self.state.store.list().await.expect("Failed to list store")
    }

    pub fn spooled(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_path())
            .expect("Failed to read upload directory")
            .map(|entry| entry.expect("Bad directory entry").path())
            .collect()
    }

    /// Poll the store until it holds `count` entries.
    pub async fn wait_for_stored(&self, count: usize) -> Vec<String> {
        for _ in 0..600 {
            let stored = self.stored().await;
            if stored.len() >= count {
                return stored;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("Store did not reach {} entries in time", count);
    }

    /// Poll the upload directory until every spooled file is gone.
    pub async fn wait_for_spool_empty(&self) {
        for _ in 0..600 {
            if self.spooled().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("Upload directory still holds {:?}", self.spooled());
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

/// Build the app against a temp store and upload directory. `overrides` are extra
/// environment-style settings.
pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), overrides);
    config.validate().expect("Invalid test config");

    let state = build_state(&config)
        .await
        .expect("Failed to build application state");
    let app = routes::setup_routes(&config, state.clone());
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

fn create_test_config(root: &Path, overrides: &[(&str, &str)]) -> Config {
    let store_path = root.join("store").display().to_string();
    let upload_path = root.join("uploads").display().to_string();

    Config::from_lookup(|key| {
        if let Some((_, value)) = overrides.iter().find(|(k, _)| *k == key) {
            return Some(value.to_string());
        }
        match key {
            "STORE_PATH" => Some(store_path.clone()),
            "UPLOAD_PATH" => Some(upload_path.clone()),
            "PROCESSING_TIMEOUT_SECS" => Some("30".to_string()),
            _ => None,
        }
    })
    .expect("Failed to build test config")
}
