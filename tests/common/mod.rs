// Shared helpers for router-level tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use diary_edge::ai::AiGateway;
use diary_edge::config::AppConfig;
use diary_edge::server::{create_router, AppState};
use diary_edge::store::{KvStore, MemoryStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub cache_store: MemoryStore,
    pub rate_limit_store: MemoryStore,
}

/// Defaults with retries disabled so backend failures surface immediately.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.gemini.max_retries = 0;
    config.gemini.timeout_seconds = 5;
    config.ogp.fetch_timeout_seconds = 5;
    config
}

/// Config pointing the AI backend at a mock server.
pub fn config_with_backend(base_url: &str) -> AppConfig {
    let mut config = test_config();
    config.gemini.api_key = Some("test-key".to_string());
    config.gemini.api_base_url = base_url.to_string();
    config
}

pub fn build_app(config: AppConfig) -> TestApp {
    let cache_store = MemoryStore::new();
    let rate_limit_store = MemoryStore::new();
    let ai = AiGateway::from_config(&config.gemini).unwrap();
    let state = AppState::new(
        config,
        Arc::new(cache_store.clone()) as Arc<dyn KvStore>,
        Arc::new(rate_limit_store.clone()) as Arc<dyn KvStore>,
        ai,
    )
    .unwrap();

    TestApp {
        router: create_router(state),
        cache_store,
        rate_limit_store,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, headers, body }
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(json_request(path, &body, None)).await
    }

    pub async fn post_from(&self, path: &str, body: Value, client_ip: &str) -> TestResponse {
        self.send(json_request(path, &body, Some(client_ip))).await
    }

    /// Wait for the write-behind cache task to land `expected` entries.
    pub async fn wait_for_cache_entries(&self, expected: usize) {
        for _ in 0..100 {
            if self.cache_store.len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("cache never reached {} entries", expected);
    }
}

pub fn json_request(path: &str, body: &Value, client_ip: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(ip) = client_ip {
        builder = builder.header("cf-connecting-ip", ip);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Assert the uniform error shape.
pub fn assert_error(response: &TestResponse, status: StatusCode, code: &str) {
    assert_eq!(response.status, status, "unexpected status, body: {}", response.body);
    assert_eq!(response.body["code"], code);
    assert!(response.body["error"].is_string());
    assert_eq!(response.body.as_object().map(|o| o.len()), Some(2));
}

/// A `generateContent` response carrying a single text part.
pub fn gemini_text_response(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20 }
    })
    .to_string()
}

/// A TCP endpoint that accepts connections and never answers.
pub async fn spawn_silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{}", addr)
}

pub const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";
