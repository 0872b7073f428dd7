//! Sliding-window admission control.
//!
//! Each client owns a list of request timestamps (milliseconds since the
//! epoch) in the shared [`KvStore`]. A request is admitted when fewer than
//! `max_requests` timestamps remain inside the window; the new timestamp is
//! then appended and the list persisted with a TTL of one window.
//!
//! The read-modify-write is not atomic. Two requests from the same client
//! racing through `admit` may both be admitted, briefly overshooting the limit.

use crate::config::RateLimitConfig;
use crate::store::{KvStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "ratelimit:";

/// Client identifier used when the originating address is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Outcome of a successful window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { remaining: u32 },
    Rejected,
}

pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    max_requests: u32,
    window_ms: u64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            max_requests: config.max_requests,
            window_ms: config.window_ms,
        }
    }

    /// Admission check against the wall clock. Fails open when the store
    /// cannot be read.
    pub async fn admit(&self, client_id: &str) -> bool {
        self.admit_at(client_id, chrono::Utc::now().timestamp_millis()).await
    }

    /// Admission check at an explicit instant (milliseconds since the epoch).
    pub async fn admit_at(&self, client_id: &str, now_ms: i64) -> bool {
        match self.check_at(client_id, now_ms).await {
            Ok(Admission::Admitted { remaining }) => {
                debug!(client = client_id, remaining, "Request admitted");
                crate::metrics::record_rate_limit("admitted");
                true
            }
            Ok(Admission::Rejected) => {
                warn!(client = client_id, "Rate limit exceeded");
                crate::metrics::record_rate_limit("rejected");
                false
            }
            Err(e) => {
                warn!(client = client_id, error = %e, "Rate limit store unavailable, failing open");
                crate::metrics::record_rate_limit("fail_open");
                true
            }
        }
    }

    /// Window check that surfaces store read failures to the caller.
    ///
    /// Rejected attempts are not recorded. A failed write after admission is
    /// logged and the request stays admitted.
    pub async fn check_at(&self, client_id: &str, now_ms: i64) -> Result<Admission, StoreError> {
        let key = format!("{}{}", KEY_PREFIX, client_id);

        let stored = self.store.get(&key).await?;
        let timestamps: Vec<i64> = match stored {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };

        let mut window = retain_window(timestamps, now_ms, self.window_ms);
        if window.len() >= self.max_requests as usize {
            return Ok(Admission::Rejected);
        }

        window.push(now_ms);
        let remaining = self.max_requests - window.len() as u32;

        // Serializing a Vec<i64> cannot fail
        let value = serde_json::to_string(&window).unwrap_or_else(|_| "[]".to_string());
        if let Err(e) = self.store.put(&key, value, self.ttl()).await {
            warn!(client = client_id, error = %e, "Failed to persist rate limit window");
        }

        Ok(Admission::Admitted { remaining })
    }

    /// Store TTL: the window rounded up to whole seconds.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.window_ms.div_ceil(1000))
    }
}

/// Keep only timestamps no older than `now - window`, preserving insertion order.
fn retain_window(timestamps: Vec<i64>, now_ms: i64, window_ms: u64) -> Vec<i64> {
    let cutoff = now_ms.saturating_sub(window_ms as i64);
    timestamps.into_iter().filter(|&t| t >= cutoff).collect()
}
