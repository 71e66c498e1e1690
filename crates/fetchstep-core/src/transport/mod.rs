//! Transports: the blocking I/O that actually moves bytes for one candidate.
//!
//! A transport runs on a dedicated worker thread owned by the transfer executor and
//! may be abandoned mid-flight when the acquisition is cancelled. Implementations
//! therefore stage data next to the target and only rename it into place once the
//! transfer is complete.

mod http;
mod local;

pub use http::{CurlOptions, CurlTransport};
pub use local::LocalTransport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::FetchConfig;
use crate::progress::ProgressTracker;
use crate::request::DownloadTask;
use crate::retry::TransferError;

/// Fetches one candidate into (or resolves it to) a local path.
pub trait Transport: Send + Sync {
    /// Blocking fetch. Reports bytes through `progress` as they arrive.
    fn fetch(&self, task: &DownloadTask, progress: &ProgressTracker)
        -> Result<PathBuf, TransferError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn fetch(
        &self,
        task: &DownloadTask,
        progress: &ProgressTracker,
    ) -> Result<PathBuf, TransferError> {
        (**self).fetch(task, progress)
    }
}

/// Routes local sources to [`LocalTransport`] and everything else to [`CurlTransport`].
pub struct DefaultTransport {
    http: CurlTransport,
    local: LocalTransport,
}

impl DefaultTransport {
    pub fn new(http: CurlTransport, local: LocalTransport) -> Self {
        Self { http, local }
    }

    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self::new(
            CurlTransport::new(CurlOptions::from_config(cfg), cfg.retry_policy()),
            LocalTransport,
        )
    }
}

impl Transport for DefaultTransport {
    fn fetch(
        &self,
        task: &DownloadTask,
        progress: &ProgressTracker,
    ) -> Result<PathBuf, TransferError> {
        if task.local {
            self.local.fetch(task, progress)
        } else {
            self.http.fetch(task, progress)
        }
    }
}

/// Checks a fetched file against the task's checksum, if it has one.
/// Files the transport produced itself (`owned`) are removed on mismatch.
fn check_fetched(task: &DownloadTask, path: &Path, owned: bool) -> Result<(), TransferError> {
    if !task.has_checksum() || task.verify(path) {
        return Ok(());
    }
    if owned {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not remove mismatched download");
        }
    }
    Err(TransferError::ChecksumMismatch {
        expected: task.checksum_hex(),
    })
}
