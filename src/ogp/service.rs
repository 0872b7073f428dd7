// Cache-fronted Open Graph fetch path

use super::{cache_key, parse_target_url, scan_document, OgpError, OgpMetadata};
use crate::config::OgpConfig;
use crate::store::KvStore;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value of the `X-Cache` response header.
    pub fn as_header(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OgpLookup {
    pub metadata: OgpMetadata,
    pub cache: CacheStatus,
}

/// Fetches, scans and caches link previews.
pub struct OgpService {
    store: Arc<dyn KvStore>,
    http_client: Client,
    config: OgpConfig,
}

impl OgpService {
    pub fn new(store: Arc<dyn KvStore>, config: &OgpConfig) -> Result<Self, OgpError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.fetch_timeout_seconds.min(5)))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .use_rustls_tls()
            .build()
            .map_err(|e| OgpError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            store,
            http_client,
            config: config.clone(),
        })
    }

    /// Look up link-preview metadata for `raw_url`.
    ///
    /// The URL is validated before any I/O. Cache hits are returned as-is
    /// without refreshing their TTL. On a miss the page is fetched and scanned,
    /// and a successful result is written back without waiting for the store.
    pub async fn get_ogp(&self, raw_url: &str) -> Result<OgpLookup, OgpError> {
        let url = parse_target_url(raw_url)?;
        let key = cache_key(&url);

        if let Some(metadata) = self.read_cache(&key).await {
            debug!(url = %url, "OGP cache hit");
            crate::metrics::record_ogp_cache("hit");
            return Ok(OgpLookup {
                metadata,
                cache: CacheStatus::Hit,
            });
        }
        crate::metrics::record_ogp_cache("miss");

        let chunks = self.fetch_document(&url).await.map_err(|e| {
            warn!(url = %url, error = %e, "OGP fetch failed");
            e
        })?;

        let metadata = scan_document(&chunks)?
            .into_metadata(raw_url)
            .ok_or_else(|| {
                info!(url = %url, "No title found in document");
                OgpError::MissingTitle
            })?;

        self.write_behind(key, &metadata);

        Ok(OgpLookup {
            metadata,
            cache: CacheStatus::Miss,
        })
    }

    async fn read_cache(&self, key: &str) -> Option<OgpMetadata> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "OGP cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable OGP cache entry");
                None
            }
        }
    }

    fn write_behind(&self, key: String, metadata: &OgpMetadata) {
        let value = match serde_json::to_string(metadata) {
            Ok(v) => v,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize OGP metadata");
                return;
            }
        };
        let store = Arc::clone(&self.store);
        let ttl = Duration::from_secs(self.config.cache_ttl_seconds);

        tokio::spawn(async move {
            if let Err(e) = store.put(&key, value, ttl).await {
                warn!(key = %key, error = %e, "OGP cache write failed");
                crate::metrics::record_ogp_cache("write_error");
            }
        });
    }

    /// Download the document body as chunks, truncated at `max_html_bytes`.
    async fn fetch_document(&self, url: &Url) -> Result<Vec<Bytes>, OgpError> {
        let timeout = self.config.fetch_timeout_seconds;
        let fetch = async {
            let response = self
                .http_client
                .get(url.clone())
                .header(ACCEPT, "text/html,application/xhtml+xml")
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;

            let status = response.status();
            if !status.is_success() {
                return Err(OgpError::Status(status.as_u16()));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !is_html(&content_type) {
                return Err(OgpError::NotHtml(content_type));
            }

            let limit = self.config.max_html_bytes;
            let mut chunks = Vec::new();
            let mut total = 0usize;
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| map_reqwest_error(e, timeout))?;
                let room = limit.saturating_sub(total);
                if chunk.len() >= room {
                    chunks.push(chunk.slice(..room));
                    debug!(url = %url, limit, "Document truncated before scanning");
                    break;
                }
                total += chunk.len();
                chunks.push(chunk);
            }
            Ok(chunks)
        };

        tokio::time::timeout(Duration::from_secs(timeout), fetch)
            .await
            .map_err(|_| OgpError::Timeout(timeout))?
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

fn map_reqwest_error(e: reqwest::Error, timeout: u64) -> OgpError {
    if e.is_timeout() {
        OgpError::Timeout(timeout)
    } else {
        OgpError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(!is_html("application/json"));
        assert!(!is_html("image/png"));
        assert!(!is_html(""));
    }

    #[test]
    fn test_cache_status_header() {
        assert_eq!(CacheStatus::Hit.as_header(), "HIT");
        assert_eq!(CacheStatus::Miss.as_header(), "MISS");
    }
}
