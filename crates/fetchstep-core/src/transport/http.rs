//! Single-stream curl transport for remote sources.
//!
//! Streams the response body into `<target>.part`, then syncs and renames it onto
//! the target. Transient failures are retried per [`RetryPolicy`].

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

use super::{check_fetched, Transport};
use crate::config::FetchConfig;
use crate::progress::ProgressTracker;
use crate::request::DownloadTask;
use crate::retry::{run_with_retry, RetryPolicy, TransferError};
use crate::source::Source;
use crate::storage::{self, StorageWriter, StorageWriterBuilder};

/// Per-request curl knobs.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Abort when the rate stays below 1 KiB/s for this long.
    pub low_speed_time: Duration,
    pub max_recv_speed: Option<u64>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            user_agent: "fetchstep".to_string(),
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            max_recv_speed: None,
        }
    }
}

impl CurlOptions {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
            max_recv_speed: cfg.max_bytes_per_sec,
            ..Self::default()
        }
    }
}

pub struct CurlTransport {
    options: CurlOptions,
    retry: RetryPolicy,
}

impl CurlTransport {
    pub fn new(options: CurlOptions, retry: RetryPolicy) -> Self {
        Self { options, retry }
    }

    fn fetch_once(
        &self,
        url: &str,
        temp: &Path,
        progress: &ProgressTracker,
    ) -> Result<StorageWriter, TransferError> {
        let storage = StorageWriterBuilder::create(temp)?.build();
        match self.get(url, &storage, progress) {
            Ok(()) => Ok(storage),
            Err(e) => {
                storage.discard();
                Err(e)
            }
        }
    }

    fn get(
        &self,
        url: &str,
        storage: &StorageWriter,
        progress: &ProgressTracker,
    ) -> Result<(), TransferError> {
        let announced: Cell<Option<u64>> = Cell::new(None);
        let write_error: RefCell<Option<io::Error>> = RefCell::new(None);

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.options.user_agent)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(self.options.low_speed_time)?;
        if let Some(speed) = self.options.max_recv_speed {
            easy.max_recv_speed(speed)?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Ok(line) = str::from_utf8(line) {
                    // Each response in a redirect chain starts with a status line.
                    if line.starts_with("HTTP/") {
                        announced.set(None);
                        progress.set_total(None);
                    } else if let Some(len) = parse_content_length(line) {
                        announced.set(Some(len));
                        progress.set_total(Some(len));
                    }
                }
                true
            })?;
            transfer.write_function(|data| match storage.append(data) {
                Ok(()) => {
                    progress.advance(data.len() as u64);
                    Ok(data.len())
                }
                Err(e) => {
                    *write_error.borrow_mut() = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_error.into_inner() {
            return Err(TransferError::Storage(e));
        }
        performed?;

        if url.starts_with("http") {
            let code = easy.response_code()?;
            if !(200..300).contains(&code) {
                return Err(TransferError::Http(code));
            }
        }

        let received = storage.written();
        if let Some(expected) = announced.get() {
            if received != expected {
                return Err(TransferError::PartialTransfer { expected, received });
            }
        }
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn fetch(
        &self,
        task: &DownloadTask,
        progress: &ProgressTracker,
    ) -> Result<PathBuf, TransferError> {
        let url = match &task.kind {
            Source::Remote(url) => url.as_str(),
            Source::Local(_) => return Err(TransferError::UnsupportedSource(task.source.clone())),
        };
        let temp = storage::temp_path(&task.target_path);

        let storage = run_with_retry(&self.retry, |attempt| {
            tracing::debug!(url, attempt, "GET");
            progress.reset();
            self.fetch_once(url, &temp, progress)
        })?;
        storage.sync()?;
        storage.finalize(&task.target_path)?;

        check_fetched(task, &task.target_path, true)?;
        tracing::info!(url, path = %task.target_path.display(), "download complete");
        Ok(task.target_path.clone())
    }
}

/// Parses a `Content-Length` header line (case-insensitive name).
fn parse_content_length(line: &str) -> Option<u64> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse().ok()
}
