// HTTP routes configuration

use super::handlers::{
    ai_chat_handler, ai_emotion_handler, ai_message_handler, ai_prompt_handler, health_handler,
    metrics_handler, not_found_handler, ogp_handler,
};
use super::middleware::{
    admission_control, cors_layer, handle_panic, request_id_layers, track_metrics,
};
use crate::ai::AiGateway;
use crate::config::AppConfig;
use crate::ogp::{OgpError, OgpService};
use crate::ratelimit::RateLimiter;
use crate::store::KvStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub rate_limiter: Arc<RateLimiter>,
    pub ogp: Arc<OgpService>,
    pub ai: Arc<AiGateway>,
    pub cache_store: Arc<dyn KvStore>,
    pub rate_limit_store: Arc<dyn KvStore>,
}

impl AppState {
    /// Wire the services together. The two stores are independent bindings.
    pub fn new(
        config: AppConfig,
        cache_store: Arc<dyn KvStore>,
        rate_limit_store: Arc<dyn KvStore>,
        ai: AiGateway,
    ) -> Result<Self, OgpError> {
        let rate_limiter = RateLimiter::new(Arc::clone(&rate_limit_store), &config.rate_limit);
        let ogp = OgpService::new(Arc::clone(&cache_store), &config.ogp)?;

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(rate_limiter),
            ogp: Arc::new(ogp),
            ai: Arc::new(ai),
            cache_store,
            rate_limit_store,
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    let (set_request_id, propagate_request_id) = request_id_layers();

    // Admission control covers the API surface and unmatched paths alike.
    // Non-POST methods on API paths fall through to 404.
    let api = Router::new()
        .route("/api/ogp", post(ogp_handler).fallback(not_found_handler))
        .route("/api/ai-emotion", post(ai_emotion_handler).fallback(not_found_handler))
        .route("/api/ai-chat", post(ai_chat_handler).fallback(not_found_handler))
        .route("/api/ai-message", post(ai_message_handler).fallback(not_found_handler))
        .route("/api/ai-prompt", post(ai_prompt_handler).fallback(not_found_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), admission_control));

    Router::new()
        .route("/health", get(health_handler).fallback(not_found_handler))
        .route("/metrics", get(metrics_handler).fallback(not_found_handler))
        .merge(api)
        .layer(middleware::from_fn(track_metrics))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
