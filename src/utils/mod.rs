//! Utility functions and helpers for the edge API.
//!
//! # Submodules
//!
//! - `logging`: Tracing and logging initialization with secret redaction.
//! - `retry`: Bounded retry with backoff that respects upstream retry hints.

pub mod logging;
pub mod retry;
