//! Transfer error type for one candidate source.

use std::fmt;
use std::path::PathBuf;

/// Error returned by a transport while fetching one candidate. Always recoverable
/// from the orchestrator's point of view: the candidate is abandoned and the next
/// one is tried.
#[derive(Debug)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Transfer completed but fewer bytes arrived than the server announced.
    PartialTransfer { expected: u64, received: u64 },
    /// Disk/storage write failed (e.g. disk full, permission denied). Not retried.
    Storage(std::io::Error),
    /// A local source does not exist or cannot be read.
    MissingSource(PathBuf),
    /// The source identifier cannot be handled by this transport.
    UnsupportedSource(String),
    /// The fetched file does not hash to the expected checksum.
    ChecksumMismatch { expected: String },
    /// The background worker went away without reporting an outcome.
    WorkerLost,
    /// Any other failure reported by a transport implementation.
    Other(String),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http(code) => write!(f, "HTTP {}", code),
            TransferError::PartialTransfer { expected, received } => {
                write!(f, "partial transfer: expected {} bytes, got {}", expected, received)
            }
            TransferError::Storage(e) => write!(f, "storage: {}", e),
            TransferError::MissingSource(p) => write!(f, "source file not found: {}", p.display()),
            TransferError::UnsupportedSource(s) => write!(f, "unsupported source: {}", s),
            TransferError::ChecksumMismatch { expected } => {
                write!(f, "checksums didn't match expected: {}", expected)
            }
            TransferError::WorkerLost => write!(f, "transfer worker exited without a result"),
            TransferError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<curl::Error> for TransferError {
    fn from(e: curl::Error) -> Self {
        TransferError::Curl(e)
    }
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Storage(e)
    }
}
