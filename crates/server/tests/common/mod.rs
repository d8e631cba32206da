//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router around a
//! small in-memory catalog, so requests can be driven with `oneshot`
//! without binding a socket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use petdiag_core::{Catalog, Config};

/// Re-export fixtures for test convenience
pub use petdiag_core::testing::fixtures;

/// Test fixture wrapping the API router.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_session_creation() {
///     let fixture = TestFixture::new();
///     let response = fixture.post("/api/v1/sessions", json!({})).await;
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture over the two-disease vomiting catalog.
    pub fn new() -> Self {
        Self::with_catalog(fixtures::vomiting_catalog(), Config::default())
    }

    /// Fixture over a custom catalog and configuration.
    pub fn with_catalog(catalog: Catalog, config: Config) -> Self {
        let state = Arc::new(petdiag_server::state::AppState::new(
            config,
            Arc::new(catalog),
        ));
        let router = petdiag_server::api::create_router(state);
        Self { router }
    }

    /// Create a session and return its id.
    pub async fn create_session(&self) -> String {
        let response = self.post_empty("/api/v1/sessions").await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"]
            .as_str()
            .expect("session id in response")
            .to_string()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
