//! Stable cache keys for candidate sources.

use sha1::{Digest, Sha1};

/// Cache key for a source identifier.
///
/// Without a forced extension the identifier itself is the key. With one, the key is
/// `sha1-hex(identifier).ext`, so sources that would collide once their extension is
/// replaced still get distinct keys.
pub fn cache_key(identifier: &str, extension: Option<&str>) -> String {
    match extension.map(|e| e.trim_start_matches('.')).filter(|e| !e.is_empty()) {
        None => identifier.to_string(),
        Some(ext) => {
            let hash = Sha1::digest(identifier.as_bytes());
            format!("{}.{}", hex::encode(hash), ext)
        }
    }
}
