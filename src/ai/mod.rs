//! AI gateway for the journaling features.
//!
//! Three operations sit in front of the generative-AI backend: emotion
//! classification, empathetic reply generation and prompt-of-the-day
//! generation. Callers never see a backend error. Missing keys, failed calls
//! and malformed answers all resolve to fixed fallback values, and the cause
//! is logged.

pub mod fallbacks;
mod gateway;
mod instructions;

pub use gateway::AiGateway;
