#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use certgen_core::error::GenerationFailure;
use certgen_core::generator::{DesignGenerator, TextGenerator};
use certgen_gemini::GeminiConfig;
use http_body_util::BodyExt;
use tower::ServiceExt;

use certgen_api::config::ServerConfig;
use certgen_api::router::build_app_router;
use certgen_api::state::AppState;

/// A drawing script long enough to pass cleaning.
pub const GOOD_CODE: &str =
    "ctx.clearRect(0, 0, canvas.width, canvas.height);\nctx.fillText('CERTIFICATE', 400, 100);";

/// How the fake generator answers every call.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Fenced, valid code.
    Fenced,
    /// Always fails upstream.
    Fail,
    /// Panics inside the generator.
    Panic,
    /// Hangs for the given time, then fails as an upstream timeout would.
    Hang(Duration),
}

/// Fake [`TextGenerator`] that answers every prompt the same way and records
/// what it was asked.
pub struct FakeGenerator {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.reply {
            Reply::Fenced => Ok(format!("```javascript\n{GOOD_CODE}\n```")),
            Reply::Fail => Err(GenerationFailure::Upstream("503 Service Unavailable".into())),
            Reply::Panic => panic!("generator blew up"),
            Reply::Hang(delay) => {
                tokio::time::sleep(delay).await;
                Err(GenerationFailure::Upstream("request timed out".into()))
            }
        }
    }
}

/// Build a test `ServerConfig` with safe defaults and no throttle.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_throttle: Duration::ZERO,
        gemini: GeminiConfig::new("test-key", "gemini-1.5-flash"),
    }
}

/// Build the full application router around `text`.
pub fn build_test_app(text: Arc<FakeGenerator>) -> Router {
    build_app_with(test_config(), text)
}

/// Build the full application router around `text` with a custom config.
pub fn build_app_with(config: ServerConfig, text: Arc<FakeGenerator>) -> Router {
    let generator = DesignGenerator::new(text).with_throttle(config.generation_throttle);
    build_app_router(AppState::new(config.clone(), generator), &config)
}

/// Build the app with a generator that returns valid fenced code.
pub fn build_default_app() -> Router {
    build_test_app(FakeGenerator::new(Reply::Fenced))
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
