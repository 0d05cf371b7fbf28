//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock engine and asset fetcher injected, so the whole HTTP surface
//! can be exercised without ffmpeg or network access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use audex_core::testing::{MockAssetFetcher, MockTranscoder};
use audex_core::Config;
use audex_server::state::AppState;

/// Re-export fixtures for test convenience
pub use audex_core::testing::fixtures;

const BOUNDARY: &str = "audex-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_upload() {
///     let fixture = TestFixture::new();
///     let response = fixture.upload("clip.mp4", "video/mp4", fixtures::sample_mp4()).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock engine - control exec results and logs
    pub engine: Arc<MockTranscoder>,
    /// Mock fetcher - serves the fixture engine assets
    pub fetcher: Arc<MockAssetFetcher>,
    /// Temporary directory for workspace, staged assets and saved copies
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test fixture, letting `customize` adjust the configuration.
    pub fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = fixtures::config(temp_dir.path());
        customize(&mut config);

        let engine = Arc::new(MockTranscoder::new());
        let fetcher = Arc::new(MockAssetFetcher::with_assets(&config.engine.assets));

        let state = Arc::new(AppState::build(config, engine.clone(), fetcher.clone()));
        let router = audex_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            engine,
            fetcher,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("GET")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Send a POST request with an empty body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Upload `bytes` as the multipart `file` field.
    pub async fn upload(&self, filename: &str, content_type: &str, bytes: Vec<u8>) -> TestResponse {
        self.post_multipart("file", filename, Some(content_type), bytes)
            .await
    }

    /// Send a single-part multipart form to `/api/v1/files`.
    pub async fn post_multipart(
        &self,
        field: &str,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> TestResponse {
        let mut body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            BOUNDARY, field, filename
        )
        .into_bytes();
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/files")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Select the sample MP4 and load the engine.
    pub async fn ready_with_sample(&self) {
        let response = self
            .upload("sample.mp4", "video/mp4", fixtures::sample_mp4())
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let response = self.post("/api/v1/engine/load").await;
        assert_eq!(response.status, StatusCode::OK);
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}
