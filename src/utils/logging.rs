//! Structured logging and secret redaction.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats, and provides a sanitizer that keeps
//! API keys out of log sinks.

use crate::config::LoggingConfig;
use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
    }

    Ok(())
}

fn secret_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            // Google API keys: "AIza" followed by 35 URL-safe characters
            (
                Regex::new(r"AIza[0-9A-Za-z_\-]{35}").expect("static regex"),
                "[REDACTED_API_KEY]",
            ),
            // Keys passed as query parameters
            (
                Regex::new(r"([?&]key=)[^&\s]+").expect("static regex"),
                "${1}[REDACTED]",
            ),
        ]
    })
}

/// Sanitizes sensitive information from log messages.
///
/// Upstream error bodies can echo the request URL or key back; every
/// detected secret is replaced with a placeholder before logging.
pub fn sanitize(input: &str) -> String {
    secret_patterns()
        .iter()
        .fold(input.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}
