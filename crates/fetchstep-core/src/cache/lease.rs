//! RAII guard that releases a cache key when dropped.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use super::Cache;

/// Holds a locked cache key; unlocks it on drop, including on error and cancellation paths.
pub struct CacheLease {
    cache: Arc<dyn Cache>,
    key: String,
}

impl CacheLease {
    /// Locks `key` and returns the lease together with the path the cache assigned.
    pub async fn acquire(cache: Arc<dyn Cache>, key: &str) -> io::Result<(Self, PathBuf)> {
        tracing::debug!(key, "acquiring cache lock");
        let path = cache.lock(key).await?;
        let lease = CacheLease {
            cache,
            key: key.to_string(),
        };
        Ok((lease, path))
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for CacheLease {
    fn drop(&mut self) {
        tracing::debug!(key = %self.key, "releasing cache lock");
        self.cache.unlock(&self.key);
    }
}
