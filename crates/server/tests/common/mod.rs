//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! over an in-memory store with the remote catalog and trending source
//! replaced by controllable mocks.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cinefind_core::{
    testing::{MockRemoteCatalog, MockTrendingSource},
    Config, KeyValueStore, MemoryStore, RemoteCatalog, TrendingSource,
};
use cinefind_server::state::AppState;

/// Re-export fixtures for test convenience
pub use cinefind_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.remote.set_page("inception", 1, fixtures::remote_page(vec![
///         fixtures::movie("tt1375666", "Inception", "2010"),
///     ])).await;
///
///     let response = fixture.post("/api/v1/search", json!({ "query": "inception" })).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Application state behind the router
    pub state: Arc<AppState>,
    /// Mock remote catalog - configure search pages, delays and failures
    pub remote: Arc<MockRemoteCatalog>,
    /// Mock trending source
    pub trending: Arc<MockTrendingSource>,
    /// Backing store shared by cache, quota, history and trending
    pub store: Arc<MemoryStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with the default configuration.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    /// Create a test fixture with a custom configuration.
    pub async fn with_config(config: Config) -> Self {
        let remote = Arc::new(MockRemoteCatalog::new());
        let trending = Arc::new(MockTrendingSource::new());
        let store = Arc::new(MemoryStore::new());

        let state = Arc::new(
            AppState::assemble(
                config,
                Arc::clone(&store) as Arc<dyn KeyValueStore>,
                Arc::clone(&remote) as Arc<dyn RemoteCatalog>,
                Some(Arc::clone(&trending) as Arc<dyn TrendingSource>),
                None,
            )
            .await,
        );

        let router = cinefind_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            remote,
            trending,
            store,
        }
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

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
