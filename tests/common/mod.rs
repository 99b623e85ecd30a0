//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every helper.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use million_list::api::{AppState, router};
use million_list::application::CollectionService;

// =============================================================================
// Application Helpers
// =============================================================================

/// Creates a router over a fresh service of `size` items with a small filter cache.
pub fn create_test_app(size: u32) -> (Router, CollectionService) {
    let service = CollectionService::with_cache_capacity(size, 8);
    (router(AppState::new(service.clone())), service)
}

/// Sends a request through the router and returns status and parsed JSON body.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should not fail");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("body should be JSON");
    (status, json)
}

/// `GET` helper.
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

/// `POST` helper with a JSON body.
pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

// =============================================================================
// Assertion Helpers
// =============================================================================

/// Extracts a JSON array of ids.
pub fn ids(value: &Value) -> Vec<u32> {
    value
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|id| u32::try_from(id.as_u64().expect("expected an integer")).expect("id fits u32"))
        .collect()
}
