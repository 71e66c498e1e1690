//! Sequential writer for temp download files.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Writer for a temp download file. Cloneable so a curl write callback can own a copy.
#[derive(Clone)]
pub struct StorageWriter {
    file: Arc<Mutex<File>>,
    written: Arc<AtomicU64>,
    temp_path: std::path::PathBuf,
}

impl StorageWriter {
    pub(crate) fn from_file_and_path(file: File, temp_path: std::path::PathBuf) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
            written: Arc::new(AtomicU64::new(0)),
            temp_path,
        }
    }

    /// Append `data` at the current end of the staged file.
    pub fn append(&self, data: &[u8]) -> io::Result<()> {
        let mut f = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        f.write_all(data)?;
        self.written.fetch_add(data.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sync_all()
    }

    /// Atomically rename the temp file to the final path. Fails if `final_path` is on a
    /// different filesystem.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        std::fs::rename(&temp_path, final_path)
    }

    /// Drop the staged file after a failed transfer.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), error = %e, "could not remove temp file");
        }
    }
}
