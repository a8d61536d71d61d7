//! Advisory cache in front of the source site.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::backend::CacheBackend;
use super::memory::MemoryBackend;

/// One week: how long a fetched payload stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Configuration for the cache store.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied to every write.
    pub ttl: Duration,

    /// Maximum number of entries for the in-memory backend.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_capacity: 1000,
        }
    }
}

/// Cache store that never fails its caller.
///
/// Backend errors on read are reported as a miss; errors on write are
/// dropped. Either way they are logged, and the pipeline falls back to a
/// live fetch.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl CacheStore {
    /// Wrap a backend, writing entries with `ttl`.
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// An in-memory store built from `config`.
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(Arc::new(MemoryBackend::new(config.max_capacity)), config.ttl)
    }

    /// TTL applied to writes.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up `key`. Any backend failure is treated as a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key, "cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store `value` under `key`. Failures are logged and ignored.
    pub async fn set(&self, key: &str, value: String) {
        if let Err(e) = self.backend.set(key, value, self.ttl).await {
            warn!(key, error = %e, "cache write failed");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FailingBackend;
    use super::*;

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(604_800));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn round_trip_through_memory() {
        let store = CacheStore::in_memory(&CacheConfig::default());
        store.set("place", "payload".into()).await;
        assert_eq!(store.get("place").await.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn failing_backend_degrades_to_miss() {
        let store = CacheStore::new(Arc::new(FailingBackend), DEFAULT_TTL);

        // Neither call panics nor returns an error
        store.set("place", "payload".into()).await;
        assert!(store.get("place").await.is_none());
    }
}
