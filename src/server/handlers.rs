// HTTP request handlers

use super::routes::AppState;
use crate::error::ApiError;
use crate::models::api::{ChatRequest, MessageRequest, OgpRequest, PromptRequest};
use crate::models::{Emotion, PromptType};
use crate::ogp::OgpError;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // AI endpoints degrade to fallback answers without a key
    let ai_check = if state.ai.is_configured() {
        HealthCheck {
            status: "ok".to_string(),
            message: format!("Model: {}", state.config.gemini.model),
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: "No API key configured, serving fallback answers".to_string(),
        }
    };
    checks.insert("ai_backend".to_string(), ai_check);

    for (name, store) in [
        ("cache_store", &state.cache_store),
        ("rate_limit_store", &state.rate_limit_store),
    ] {
        let message = match store.approximate_len() {
            Some(n) => format!("{} entries", n),
            None => "size unknown".to_string(),
        };
        checks.insert(
            name.to_string(),
            HealthCheck {
                status: "ok".to_string(),
                message,
            },
        );
    }

    let limits = &state.config.rate_limit;
    checks.insert(
        "rate_limit".to_string(),
        HealthCheck {
            status: if limits.enabled { "ok" } else { "disabled" }.to_string(),
            message: format!("{} requests per {}ms", limits.max_requests, limits.window_ms),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

/// Deserialize a JSON body. Every failure, including an oversized body, is
/// reported as a validation error.
fn parse_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    let body = body.map_err(|e| {
        debug!("Rejected request body: {}", e);
        ApiError::Validation(if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            "Request body too large".to_string()
        } else {
            "Invalid request body".to_string()
        })
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        debug!("Failed to deserialize request: {}", e);
        ApiError::Validation("Invalid request body".to_string())
    })
}

fn require_message(message: Option<String>) -> Result<String, ApiError> {
    match message {
        Some(m) if !m.trim().is_empty() => Ok(m),
        _ => Err(ApiError::Validation("Message is required".to_string())),
    }
}

fn require_ai(state: &AppState) -> Result<(), ApiError> {
    if state.ai.is_configured() {
        Ok(())
    } else {
        Err(ApiError::Internal("AI service is not configured".to_string()))
    }
}

/// Handler for POST /api/ogp
pub async fn ogp_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let req: OgpRequest = parse_body(body)?;
    let url = match req.url {
        Some(u) if !u.trim().is_empty() => u,
        _ => return Err(ApiError::Validation("URL is required".to_string())),
    };

    match state.ogp.get_ogp(&url).await {
        Ok(lookup) => {
            info!(url = %url, cache = lookup.cache.as_header(), "Served OGP metadata");
            Ok((
                StatusCode::OK,
                [("X-Cache", lookup.cache.as_header())],
                Json(lookup.metadata),
            )
                .into_response())
        }
        Err(OgpError::InvalidUrl(reason)) => {
            debug!(url = %url, reason = %reason, "Rejected OGP target");
            Err(ApiError::Validation("Invalid URL".to_string()))
        }
        Err(e) => {
            warn!(url = %url, error = %e, "OGP extraction failed");
            Err(ApiError::FetchFailed("Failed to fetch OGP data".to_string()))
        }
    }
}

/// Handler for POST /api/ai-emotion
pub async fn ai_emotion_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let req: MessageRequest = parse_body(body)?;
    let message = require_message(req.message)?;
    require_ai(&state)?;

    let result = state.ai.classify_emotion(&message).await;
    Ok(Json(result).into_response())
}

/// Handler for POST /api/ai-chat
pub async fn ai_chat_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let req: ChatRequest = parse_body(body)?;
    let message = require_message(req.message)?;
    require_ai(&state)?;

    let emotion = Emotion::parse_or_normal(req.emotion.as_deref());
    let reply = state.ai.generate_reply(&message, emotion).await;
    Ok(Json(reply).into_response())
}

/// Handler for POST /api/ai-message: classification followed by a reply
pub async fn ai_message_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let req: MessageRequest = parse_body(body)?;
    let message = require_message(req.message)?;
    require_ai(&state)?;

    let analysis = state.ai.analyze_message(&message).await;
    Ok(Json(analysis).into_response())
}

/// Handler for POST /api/ai-prompt. Works without an API key.
pub async fn ai_prompt_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let req: PromptRequest = parse_body(body)?;
    let prompt_type: PromptType = req
        .prompt_type
        .as_deref()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| ApiError::Validation("Invalid prompt type".to_string()))?;
    let emotion = req
        .emotion
        .as_deref()
        .map(|e| Emotion::parse_or_normal(Some(e)));

    let result = state.ai.generate_prompt(prompt_type, emotion).await;
    Ok(Json(result).into_response())
}
