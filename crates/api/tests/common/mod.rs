#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use vlogcrew_api::config::ServerConfig;
use vlogcrew_api::router::build_app_router;
use vlogcrew_api::state::AppState;
use vlogcrew_api::vision::{ImageDescriber, VisionError};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
    }
}

// ---------------------------------------------------------------------------
// Image describer stub
// ---------------------------------------------------------------------------

/// Returns a fixed description (or error) and counts calls.
pub struct StubDescriber {
    reply: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubDescriber {
    fn with_reply(reply: Result<String, String>, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn ok(text: &str) -> Arc<Self> {
        Self::with_reply(Ok(text.to_string()), None)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with_reply(Err(message.to_string()), None)
    }

    /// Succeeds, but only after `delay`.
    pub fn slow(text: &str, delay: Duration) -> Arc<Self> {
        Self::with_reply(Ok(text.to_string()), Some(delay))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageDescriber for StubDescriber {
    async fn describe(&self, _image: &[u8], _mime_type: &str) -> Result<String, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(|message| VisionError::Api {
            status: 400,
            message,
        })
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router with a describer that always succeeds.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, StubDescriber::ok("A wok on a gas stove"))
}

/// Build the full application router with the given describer.
pub fn build_test_app_with(pool: PgPool, describer: Arc<dyn ImageDescriber>) -> Router {
    build_test_app_with_config(pool, test_config(), describer)
}

/// Build the full application router with a custom config and describer.
pub fn build_test_app_with_config(
    pool: PgPool,
    config: ServerConfig,
    describer: Arc<dyn ImageDescriber>,
) -> Router {
    let state = AppState::new(pool, config.clone(), describer);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// One part of a multipart form.
pub struct Part {
    pub name: &'static str,
    pub file_name: Option<&'static str>,
    pub content_type: Option<&'static str>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn text(name: &'static str, value: &str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn file(file_name: &'static str, content_type: &'static str, data: &[u8]) -> Self {
        Self {
            name: "file",
            file_name: Some(file_name),
            content_type: Some(content_type),
            data: data.to_vec(),
        }
    }
}

const BOUNDARY: &str = "vlogcrew-test-boundary";

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, parts: &[Part]) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn count_jobs(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await
        .unwrap()
}
