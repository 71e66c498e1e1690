//! Artifact cache capability and cache-key derivation.
//!
//! The orchestrator only depends on the [`Cache`] trait: `lock(key)` waits for
//! exclusive use of a key and returns the path associated with it, `unlock(key)`
//! releases it. [`FileCache`] is the directory-backed implementation the CLI uses.

mod file;
mod key;
mod lease;

pub use file::FileCache;
pub use key::cache_key;
pub use lease::CacheLease;

use std::io;
use std::path::PathBuf;

/// Host-provided artifact cache with advisory per-key locking.
#[async_trait::async_trait]
pub trait Cache: Send + Sync {
    /// Waits until `key` is exclusively ours and returns the path it maps to.
    async fn lock(&self, key: &str) -> io::Result<PathBuf>;

    /// Releases a key taken with `lock`. Releasing a key that is not held is a no-op.
    fn unlock(&self, key: &str);
}
