//! Key-value stores with per-entry expiry.
//!
//! The edge API keeps its only cross-request state (cached link previews and
//! rate-limit windows) behind the [`KvStore`] trait. Access is plain get/put
//! with no transactions: concurrent writers race and the last write wins.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt value for key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// A string key-value store whose entries expire after a TTL.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns `None` for missing or expired keys.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Inserts or overwrites `key`, expiring it `ttl` from now.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Number of live entries, when the backend can tell cheaply.
    fn approximate_len(&self) -> Option<usize> {
        None
    }
}
