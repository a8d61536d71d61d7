//! In-process cache backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;

use super::backend::{CacheBackend, CacheError};

/// Default maximum number of cached places.
const DEFAULT_MAX_CAPACITY: u64 = 1000;

/// A stored value together with its own time-to-live.
#[derive(Debug)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expiry policy that reads the TTL off each entry.
struct PerEntryTtl;

impl Expiry<String, Arc<Entry>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<Entry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<Entry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // A refresh restarts the clock
        Some(value.ttl)
    }
}

/// Cache backend held in process memory.
///
/// Contents are lost on restart; suitable for a single server process.
pub struct MemoryBackend {
    entries: MokaCache<String, Arc<Entry>>,
}

impl MemoryBackend {
    /// Create a backend holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }

    /// Number of live entries (approximate, for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), Arc::new(Entry { value, ttl }))
            .await;
        Ok(())
    }
}
