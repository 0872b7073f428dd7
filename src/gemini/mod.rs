// Gemini API client module

mod client;

pub use client::GeminiClient;

use thiserror::Error;

/// Failures talking to the generative-AI backend. None of these reach HTTP
/// clients: the AI gateway converts every one into a fallback value.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API error: HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Gemini API call timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Gemini returned no usable text")]
    EmptyResponse,

    #[error("Response parsing error: {0}")]
    Parse(String),
}
