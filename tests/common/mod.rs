//! Common test utilities and helpers

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sinmam_core::{
    api::{build_router, AppState},
    MonitorConfig, ReadingStore,
};
use std::sync::Arc;
use tower::ServiceExt;

/// Create an empty store with the given capacity and default thresholds
pub fn create_test_store(max_history: usize) -> Arc<ReadingStore> {
    Arc::new(
        ReadingStore::new(MonitorConfig {
            max_history,
            ..Default::default()
        })
        .expect("Failed to create test store"),
    )
}

/// Router over a fresh store
pub fn create_test_router(store: Arc<ReadingStore>) -> Router {
    build_router(AppState::new(store))
}

/// Send a request and decode the JSON response body
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed to respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body was not JSON")
    };
    (status, body)
}

/// GET `uri`
pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request");
    send(router, request).await
}

/// POST a raw body to `uri` as JSON
pub async fn post_raw(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request");
    send(router, request).await
}

/// POST a reading submission
pub async fn post_reading(router: &Router, body: Value) -> (StatusCode, Value) {
    post_raw(router, "/api/heart-rate/reading", &body.to_string()).await
}
