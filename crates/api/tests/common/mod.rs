#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use pixelift_api::config::ServerConfig;
use pixelift_api::router::build_app_router;
use pixelift_api::state::AppState;
use pixelift_db::store::{MemoryStorage, SharedStorage, StorageBackend};
use pixelift_worker::delay::FixedDelay;
use pixelift_worker::processor::EnhancementProcessor;
use pixelift_worker::queue::{JobQueue, QueueConfig, WorkerPool};
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Smallest byte sequence the content sniffer accepts as PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

/// Image size limit used by test apps.
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

const BOUNDARY: &str = "pixelift-test-boundary";

/// Build a test `ServerConfig` writing into `upload_dir`.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// the in-memory store and a 1 MiB upload limit.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        storage_backend: StorageBackend::Memory,
        database_url: None,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        worker_count: 2,
        queue_capacity: 16,
        processing_delay_min_ms: 50,
        processing_delay_max_ms: 50,
    }
}

/// A running application with direct access to its store and queue.
pub struct TestApp {
    pub router: Router,
    pub store: SharedStorage,
    pub queue: JobQueue,
    pub upload_dir: TempDir,
    pub workers: WorkerPool,
}

/// Build the full application router over a fresh in-memory store and a
/// temporary upload directory.
pub fn build_test_app() -> TestApp {
    build_test_app_with(QueueConfig {
        worker_count: 2,
        capacity: 16,
    })
}

/// Same as [`build_test_app`] with explicit worker pool sizing.
pub fn build_test_app_with(queue_config: QueueConfig) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("create temp upload dir");
    let mut config = test_config(upload_dir.path());
    config.worker_count = queue_config.worker_count;
    config.queue_capacity = queue_config.capacity;

    let store: SharedStorage = Arc::new(MemoryStorage::new());
    let processor = EnhancementProcessor::new(Arc::new(FixedDelay(Duration::from_millis(
        config.processing_delay_min_ms,
    ))));
    let (queue, workers) = WorkerPool::start(
        Arc::clone(&store),
        processor,
        config.queue_config(),
        CancellationToken::new(),
    );

    let state = AppState {
        store: Arc::clone(&store),
        config: Arc::new(config.clone()),
        queue: queue.clone(),
    };
    let router = build_app_router(state, &config);

    TestApp {
        router,
        store,
        queue,
        upload_dir,
        workers,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Encode `parts` as a `multipart/form-data` body.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Convenience: a PNG image part with an optional enhancement type.
pub fn png_upload(enhancement_type: Option<&str>) -> Vec<u8> {
    let mut parts = vec![Part::File {
        name: "image",
        file_name: "photo.png",
        content_type: "image/png",
        data: PNG_BYTES,
    }];
    if let Some(value) = enhancement_type {
        parts.push(Part::Text {
            name: "enhancementType",
            value,
        });
    }
    multipart_body(&parts)
}

/// POST a multipart body.
pub async fn post_multipart(app: &Router, uri: &str, body: Vec<u8>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a GET request.
pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a DELETE request.
pub async fn delete(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Poll `GET /api/enhance/{id}` until the record leaves `processing`.
pub async fn wait_for_terminal(app: &Router, id: i64) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let json = body_json(get(app, &format!("/api/enhance/{id}")).await).await;
        if json["status"] != "processing" {
            return json;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "enhancement {id} still processing after 5s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// File names currently in the upload directory.
pub fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
