//! Data models for the edge API.
//!
//! This module contains the type definitions for request/response bodies used by:
//! - The public JSON API (`api`)
//! - The upstream Google Gemini API (`gemini`)

pub mod api;
pub mod gemini;

pub use api::{ChatReply, Emotion, EmotionResult, PromptResult, PromptType};
pub use gemini::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
