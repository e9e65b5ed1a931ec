//! Health and middleware integration tests.

mod helpers;

use axum::http::StatusCode;
use helpers::setup_test_app;

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "healthy");
    assert_eq!(body["pipelines"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_health_degraded_after_shutdown() {
    let app = setup_test_app().await;
    app.state.dispatcher.shutdown().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert!(!response.header("X-Request-ID").is_empty());

    let response = app
        .client()
        .get("/health")
        .add_header("X-Request-ID", "trace-abc")
        .await;
    assert_eq!(response.header("X-Request-ID"), "trace-abc");
}
