//! Open Graph link previews.
//!
//! Target pages are fetched with a bounded timeout, scanned as a stream of
//! tags (no DOM is built) and the resulting metadata is cached per URL.
//!
//! # Components
//!
//! - `extractor`: the tag-event scanner and the fallback rules for building metadata.
//! - `service`: URL validation, the cache-fronted fetch path and write-behind.

mod extractor;
mod service;

pub use extractor::{scan_document, ScannedTags};
pub use service::{CacheStatus, OgpLookup, OgpService};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const CACHE_KEY_PREFIX: &str = "ogp:";

/// Link-preview metadata returned to clients and stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OgpMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    /// Document order, de-duplicated by exact match.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum OgpError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Not an HTML document: {0}")]
    NotHtml(String),

    #[error("Document has no title")]
    MissingTitle,

    #[error("HTML scan failed: {0}")]
    Scan(String),
}

/// Parse and validate a target URL: absolute, with an `http` or `https` scheme.
pub fn parse_target_url(raw: &str) -> Result<Url, OgpError> {
    if raw.trim().is_empty() {
        return Err(OgpError::InvalidUrl("empty".to_string()));
    }
    let url = Url::parse(raw).map_err(|e| OgpError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(OgpError::InvalidUrl(format!("unsupported scheme {}", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(OgpError::InvalidUrl("missing host".to_string()));
    }
    Ok(url)
}

/// Cache key for a parsed target URL.
pub fn cache_key(url: &Url) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, url.as_str())
}
