//! Cache backend seam.

use std::time::Duration;

use async_trait::async_trait;

/// Errors a cache backend may raise.
///
/// These never leave the cache layer: [`super::CacheStore`] logs and
/// discards them.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem failure
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be decoded
    #[error("cache entry is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Any other backend-specific failure
    #[error("cache backend error: {message}")]
    Backend { message: String },
}

/// A key/value store with per-entry expiry.
///
/// Values are opaque strings and are always replaced wholesale.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read a live entry. Expired and absent entries are both `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write an entry that expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}
