//! Disk-based cache backend.
//!
//! One JSON file per key, stamped with the time it was written and its
//! TTL. Survives restarts, which matters because payloads are kept for a
//! week.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::backend::{CacheBackend, CacheError};

/// On-disk envelope around a cached value.
#[derive(Debug, Serialize, Deserialize)]
struct CachedValue {
    /// Unix timestamp when the entry was written.
    cached_at_secs: u64,
    /// Lifetime of the entry in seconds.
    ttl_secs: u64,
    /// The cached value.
    value: String,
}

/// Cache backend storing entries as files under a directory.
#[derive(Debug, Clone)]
pub struct DiskBackend {
    dir: PathBuf,
}

impl DiskBackend {
    /// Create a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for `key`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` are replaced so a key can never
    /// name a path outside the cache directory.
    fn entry_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn now_secs() -> Result<u64, CacheError> {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| CacheError::Backend {
            message: "system time before unix epoch".to_string(),
        })
}

#[async_trait]
impl CacheBackend for DiskBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let cached: CachedValue = serde_json::from_str(&contents)?;

        let age_secs = now_secs()?.saturating_sub(cached.cached_at_secs);
        if age_secs >= cached.ttl_secs {
            return Ok(None);
        }

        Ok(Some(cached.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let cached = CachedValue {
            cached_at_secs: now_secs()?,
            ttl_secs: ttl.as_secs(),
            value,
        };

        tokio::fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_string(&cached)?;

        // Write then rename so readers never observe a half-written entry
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_and_load() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new(dir.path());

        backend
            .set("mosquee-a", "{\"times\":[]}".into(), Duration::from_secs(3600))
            .await
            .unwrap();

        let loaded = backend.get("mosquee-a").await.unwrap();
        assert_eq!(loaded.as_deref(), Some("{\"times\":[]}"));
    }

    #[tokio::test]
    async fn expired_entry_returns_none() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new(dir.path());

        // With 0 TTL, the entry is immediately expired
        backend
            .set("mosquee-a", "x".into(), Duration::from_secs(0))
            .await
            .unwrap();

        assert!(backend.get("mosquee-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_entry_returns_none() {
        let backend = DiskBackend::new("/nonexistent/path/cache");
        assert!(backend.get("mosquee-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_entry_is_an_error() {
        let dir = tempdir().unwrap();
        let backend = DiskBackend::new(dir.path());
        std::fs::write(dir.path().join("mosquee-a.json"), "not json").unwrap();

        let result = backend.get("mosquee-a").await;
        assert!(matches!(result, Err(CacheError::Corrupt(_))));
    }

    #[tokio::test]
    async fn creates_cache_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("cache");
        let backend = DiskBackend::new(&nested);

        backend
            .set("mosquee-a", "x".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(nested.join("mosquee-a.json").exists());
    }

    #[test]
    fn keys_cannot_escape_directory() {
        let backend = DiskBackend::new("/cache");
        let path = backend.entry_path("../../etc/passwd");
        assert_eq!(path, PathBuf::from("/cache/.._.._etc_passwd.json"));
    }
}
