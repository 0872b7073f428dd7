//! Configuration data structures for the diary edge API.
//!
//! This module defines the schema for the application settings: server
//! parameters, CORS policy, admission control, link-preview extraction and
//! the generative-AI backend.

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, client identification).
    #[serde(default)]
    pub server: ServerConfig,

    /// Cross-origin policy applied to every response.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Per-client sliding-window admission control.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Open Graph extraction and caching.
    #[serde(default)]
    pub ogp: OgpConfig,

    /// Upstream generative-AI backend settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8787`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Header carrying the originating client address, set by the edge network.
    /// Default: `cf-connecting-ip`
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,

    /// Largest accepted request body in bytes.
    /// Default: `65536`
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any origin.
    /// Default: `["*"]`
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// Sliding-window admission control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests admitted per client within one window.
    /// Default: `100`
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds.
    /// Default: `3600000` (1 hour)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

/// Link-preview extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OgpConfig {
    /// Lifetime of a cached extraction in seconds.
    /// Default: `3600`
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// Upper bound on fetching a target page.
    /// Default: `10`
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    /// Documents are truncated after this many bytes before scanning.
    /// Default: `1048576`
    #[serde(default = "default_max_html_bytes")]
    pub max_html_bytes: usize,

    /// User-Agent sent when fetching target pages.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Settings for the upstream Gemini API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. When absent every AI operation degrades to its fallback.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the Gemini REST API.
    /// Default: `https://generativelanguage.googleapis.com/v1beta`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model used for every AI operation.
    /// Default: `gemini-2.0-flash`
    #[serde(default = "default_model")]
    pub model: String,

    /// Overall bound on a single AI operation, retries included.
    /// Default: `10`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries on 429/5xx.
    /// Default: `2`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_ip_header: default_client_ip_header(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
        }
    }
}

impl Default for OgpConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl(),
            fetch_timeout_seconds: default_fetch_timeout(),
            max_html_bytes: default_max_html_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_client_ip_header() -> String {
    "cf-connecting-ip".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_ms() -> u64 {
    60 * 60 * 1000
}

fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_html_bytes() -> usize {
    1024 * 1024
}

fn default_user_agent() -> String {
    format!("diary-edge-ogp/{}", env!("CARGO_PKG_VERSION"))
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
