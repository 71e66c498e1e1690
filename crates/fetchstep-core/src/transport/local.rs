//! Local file sources: used in place, or copied into the target path.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use super::{check_fetched, Transport};
use crate::progress::ProgressTracker;
use crate::request::DownloadTask;
use crate::retry::TransferError;
use crate::storage::{self, StorageWriterBuilder};

const COPY_BUF: usize = 256 * 1024;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTransport;

impl Transport for LocalTransport {
    fn fetch(
        &self,
        task: &DownloadTask,
        progress: &ProgressTracker,
    ) -> Result<PathBuf, TransferError> {
        let src = task
            .kind
            .local_path()
            .ok_or_else(|| TransferError::UnsupportedSource(task.source.clone()))?;
        let meta = std::fs::metadata(src)
            .ok()
            .filter(|m| m.is_file())
            .ok_or_else(|| TransferError::MissingSource(src.to_path_buf()))?;
        progress.set_total(Some(meta.len()));

        if !task.copy_file || src == task.target_path {
            // In place: the source is never ours to delete.
            check_fetched(task, src, false)?;
            progress.advance(meta.len());
            return Ok(src.to_path_buf());
        }

        let mut input = File::open(src).map_err(|_| TransferError::MissingSource(src.to_path_buf()))?;
        let writer = StorageWriterBuilder::create(&storage::temp_path(&task.target_path))?.build();
        let mut buf = vec![0u8; COPY_BUF];
        let copied = loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) => break Err(e),
            };
            if let Err(e) = writer.append(&buf[..n]) {
                break Err(e);
            }
            progress.advance(n as u64);
        };
        if let Err(e) = copied.and_then(|()| writer.sync()) {
            writer.discard();
            return Err(TransferError::Storage(e));
        }
        writer.finalize(&task.target_path)?;
        check_fetched(task, &task.target_path, true)?;
        tracing::debug!(src = %src.display(), dst = %task.target_path.display(), "copied local source");
        Ok(task.target_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::ChecksumType;

    const SHA1_HELLO: &str = "f572d396fae9206628714fb2ce00f72e94f2258f";

    fn sha1_hello() -> (ChecksumType, Vec<u8>) {
        (ChecksumType::Sha1, hex::decode(SHA1_HELLO).unwrap())
    }

    #[test]
    fn in_place_returns_source_path() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("disk.iso");
        std::fs::write(&src, b"hello\n").unwrap();
        let task = DownloadTask::new(
            src.to_str().unwrap(),
            dir.path().join("cache/target.iso"),
            Some(&sha1_hello()),
            false,
        );
        let progress = ProgressTracker::new();
        let path = LocalTransport.fetch(&task, &progress).unwrap();
        assert_eq!(path, src);
        assert_eq!(progress.bytes_done(), 6);
        assert!(!task.target_path.exists());
    }

    #[test]
    fn copy_writes_target_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("disk.iso");
        std::fs::write(&src, b"hello\n").unwrap();
        let target = dir.path().join("cache/target.iso");
        let task = DownloadTask::new(src.to_str().unwrap(), target.clone(), Some(&sha1_hello()), true);
        let progress = ProgressTracker::new();
        let path = LocalTransport.fetch(&task, &progress).unwrap();
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"hello\n");
        assert!(!storage::temp_path(&target).exists());
        assert_eq!(progress.snapshot().total_bytes, Some(6));
    }

    #[test]
    fn missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let task = DownloadTask::new(
            dir.path().join("nope.iso").to_str().unwrap(),
            dir.path().join("t.iso"),
            None,
            false,
        );
        let err = LocalTransport.fetch(&task, &ProgressTracker::new()).unwrap_err();
        assert!(matches!(err, TransferError::MissingSource(_)));
    }

    #[test]
    fn mismatched_copy_is_removed_but_source_kept() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("disk.iso");
        std::fs::write(&src, b"other bytes").unwrap();
        let target = dir.path().join("target.iso");

        let copy = DownloadTask::new(src.to_str().unwrap(), target.clone(), Some(&sha1_hello()), true);
        let err = LocalTransport.fetch(&copy, &ProgressTracker::new()).unwrap_err();
        assert!(matches!(err, TransferError::ChecksumMismatch { .. }));
        assert!(!target.exists());

        let in_place = DownloadTask::new(src.to_str().unwrap(), target, Some(&sha1_hello()), false);
        assert!(LocalTransport.fetch(&in_place, &ProgressTracker::new()).is_err());
        assert!(src.exists());
    }
}
