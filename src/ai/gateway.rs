// AI gateway: backend calls with fallback on every failure path

use super::{fallbacks, instructions};
use crate::config::GeminiConfig;
use crate::gemini::{GeminiClient, GeminiError};
use crate::models::api::MessageAnalysis;
use crate::models::{ChatReply, Emotion, EmotionResult, GenerationConfig, PromptResult, PromptType};
use serde::Deserialize;
use tracing::{debug, warn};

/// Structured answer expected from the emotion classifier.
#[derive(Debug, Deserialize)]
struct RawEmotion {
    emotion: String,
    confidence: f64,
}

pub struct AiGateway {
    client: Option<GeminiClient>,
}

impl AiGateway {
    pub fn new(client: Option<GeminiClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let client = GeminiClient::from_config(config)?;
        if client.is_none() {
            warn!("No Gemini API key configured; AI endpoints will use fallback answers");
        }
        Ok(Self::new(client))
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Model answering AI calls, if a backend is configured.
    pub fn model(&self) -> Option<&str> {
        self.client.as_ref().map(GeminiClient::model)
    }

    /// Classify the dominant emotion of a diary message.
    pub async fn classify_emotion(&self, message: &str) -> EmotionResult {
        const OP: &str = "classify_emotion";
        let Some(client) = &self.client else {
            crate::metrics::record_ai_call(OP, "offline");
            return fallbacks::emotion();
        };

        let config = GenerationConfig {
            temperature: Some(0.1),
            max_output_tokens: Some(64),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(instructions::emotion_schema()),
        };

        let outcome = client
            .generate_text(instructions::CLASSIFY_EMOTION, message, config)
            .await
            .and_then(|text| parse_emotion(&text));

        match outcome {
            Ok(result) => {
                debug!(emotion = %result.emotion, confidence = result.confidence, "Emotion classified");
                crate::metrics::record_ai_call(OP, "ok");
                result
            }
            Err(e) => {
                warn!(operation = OP, error = %e, "AI call failed, using fallback");
                crate::metrics::record_ai_call(OP, "fallback");
                fallbacks::emotion()
            }
        }
    }

    /// Generate a short empathetic reply conditioned on `emotion`.
    pub async fn generate_reply(&self, message: &str, emotion: Emotion) -> ChatReply {
        const OP: &str = "generate_reply";
        let Some(client) = &self.client else {
            crate::metrics::record_ai_call(OP, "offline");
            return fallbacks::reply();
        };

        let config = GenerationConfig {
            temperature: Some(0.8),
            max_output_tokens: Some(256),
            ..Default::default()
        };

        let outcome = client
            .generate_text(&instructions::reply(emotion), message, config)
            .await
            .and_then(|text| clean_text(&text).ok_or(GeminiError::EmptyResponse));

        match outcome {
            Ok(message) => {
                crate::metrics::record_ai_call(OP, "ok");
                ChatReply {
                    message,
                    followup_questions: Vec::new(),
                }
            }
            Err(e) => {
                warn!(operation = OP, error = %e, "AI call failed, using fallback");
                crate::metrics::record_ai_call(OP, "fallback");
                fallbacks::reply()
            }
        }
    }

    /// Generate a journaling prompt. Without an API key this never touches
    /// the network and always returns the same offline prompt for a type.
    pub async fn generate_prompt(&self, prompt_type: PromptType, emotion: Option<Emotion>) -> PromptResult {
        const OP: &str = "generate_prompt";
        let Some(client) = &self.client else {
            crate::metrics::record_ai_call(OP, "offline");
            return fallbacks::offline_prompt(prompt_type);
        };

        let config = GenerationConfig {
            temperature: Some(0.9),
            max_output_tokens: Some(128),
            ..Default::default()
        };

        let outcome = client
            .generate_text(
                &instructions::prompt(prompt_type, emotion),
                instructions::PROMPT_USER_CONTENT,
                config,
            )
            .await
            .and_then(|text| clean_text(&text).ok_or(GeminiError::EmptyResponse));

        match outcome {
            Ok(prompt) => {
                crate::metrics::record_ai_call(OP, "ok");
                PromptResult { prompt, prompt_type }
            }
            Err(e) => {
                warn!(operation = OP, prompt_type = prompt_type.as_str(), error = %e, "AI call failed, using fallback");
                crate::metrics::record_ai_call(OP, "fallback");
                fallbacks::degraded_prompt(prompt_type)
            }
        }
    }

    /// Classify a message, then reply conditioned on the classified emotion.
    pub async fn analyze_message(&self, message: &str) -> MessageAnalysis {
        let emotion = self.classify_emotion(message).await;
        let response = self.generate_reply(message, emotion.emotion).await;
        MessageAnalysis { emotion, response }
    }
}

/// Parse the classifier's JSON answer. Unknown labels and non-finite
/// confidences are rejected; finite confidences are clamped to `0.0..=1.0`.
fn parse_emotion(text: &str) -> Result<EmotionResult, GeminiError> {
    let raw: RawEmotion = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GeminiError::Parse(format!("emotion answer: {}", e)))?;

    let emotion: Emotion = raw.emotion.parse().map_err(GeminiError::Parse)?;
    if !raw.confidence.is_finite() {
        return Err(GeminiError::Parse("confidence is not a number".to_string()));
    }

    Ok(EmotionResult {
        emotion,
        confidence: raw.confidence.clamp(0.0, 1.0),
    })
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim().trim_matches('"').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
