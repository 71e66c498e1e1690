//! Classification of candidate source identifiers.
//!
//! A candidate is either a local file (used in place or copied) or a remote URL
//! handed to curl. Anything that is not an absolute URL is treated as a local path.

use std::path::{Path, PathBuf};
use url::Url;

/// A parsed candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Remote(Url),
}

impl Source {
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        match Url::parse(trimmed) {
            // Single-letter schemes are Windows drive letters (C:\images\x.iso).
            Ok(url) if url.scheme().len() == 1 => Source::Local(PathBuf::from(trimmed)),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Source::Local(path),
                // Relative file URLs such as file:images/x.iso
                Err(()) => Source::Local(PathBuf::from(url.path())),
            },
            Ok(url) => Source::Remote(url),
            Err(_) => Source::Local(PathBuf::from(trimmed)),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Source::Local(_))
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Source::Local(p) => Some(p),
            Source::Remote(_) => None,
        }
    }
}

/// Extension of the last path component of `key`, including the leading dot
/// (e.g. `".iso"`). Remote keys only look at the URL path, so neither the host nor
/// the query string contributes. Empty when there is none.
pub fn extension_suffix(key: &str) -> String {
    let path = match Source::parse(key) {
        Source::Remote(url) => PathBuf::from(url.path()),
        Source::Local(path) => path,
    };
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}
