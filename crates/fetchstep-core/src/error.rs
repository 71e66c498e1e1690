//! Fatal acquisition errors.
//!
//! Per-candidate transfer failures live in [`crate::retry::TransferError`] and never
//! surface here on their own; only request validation, cache failures, exhaustion of
//! every candidate, or cancellation halt an acquisition.

use std::io;

use crate::checksum::ChecksumType;

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("Error parsing checksum: {0}")]
    MalformedChecksum(#[source] hex::FromHexError),

    #[error("unsupported checksum type: {0}")]
    UnsupportedChecksumType(String),

    #[error("{kind} checksum must be {expected} bytes, got {actual}")]
    ChecksumLength {
        kind: ChecksumType,
        expected: usize,
        actual: usize,
    },

    #[error("no source locations given for {0}")]
    NoCandidates(String),

    #[error("cache lock for {key}: {source}")]
    Cache {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("{description} download failed.")]
    DownloadFailed { description: String },

    #[error("download cancelled")]
    Cancelled,
}

impl AcquireError {
    /// True for an interrupted acquisition, which callers report differently from a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
