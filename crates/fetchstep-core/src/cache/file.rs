//! Directory-backed cache with in-process advisory locks per key.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sha1::{Digest, Sha1};
use tokio::sync::OwnedMutexGuard;

use super::Cache;
use crate::source::extension_suffix;

/// Maps cache keys to `<dir>/<sha1-hex(key)><ext>` and serializes access per key.
pub struct FileCache {
    dir: PathBuf,
    keys: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    held: Mutex<HashMap<String, OwnedMutexGuard<()>>>,
}

fn relock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keys: Mutex::new(HashMap::new()),
            held: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a key maps to. Keeps the key's extension so tools that sniff it still work.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let hash = hex::encode(Sha1::digest(key.as_bytes()));
        self.dir.join(format!("{}{}", hash, extension_suffix(key)))
    }

    pub fn is_locked(&self, key: &str) -> bool {
        relock(&self.held).contains_key(key)
    }
}

#[async_trait::async_trait]
impl Cache for FileCache {
    async fn lock(&self, key: &str) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let slot = {
            let mut keys = relock(&self.keys);
            Arc::clone(keys.entry(key.to_string()).or_default())
        };
        let guard = slot.lock_owned().await;
        relock(&self.held).insert(key.to_string(), guard);
        Ok(self.path_for(key))
    }

    fn unlock(&self, key: &str) {
        let guard = relock(&self.held).remove(key);
        drop(guard);
        // Forget the slot once nobody holds or waits on it.
        let mut keys = relock(&self.keys);
        if keys.get(key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            keys.remove(key);
        }
    }
}
