//! Acquisition requests and the per-candidate tasks derived from them.

use std::path::{Path, PathBuf};

use crate::checksum::{self, ChecksumType};
use crate::error::AcquireError;
use crate::source::Source;

/// What the caller wants acquired: one logical artifact, several possible sources.
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    /// Candidate source identifiers, tried in order.
    pub sources: Vec<String>,
    /// Expected digest as hex. Empty or absent disables the already-downloaded check.
    pub checksum: Option<String>,
    /// Digest algorithm name (md5, sha1, sha256, sha512).
    pub checksum_type: Option<String>,
    /// Fixed destination for every candidate; bypasses the cache.
    pub target_path: Option<PathBuf>,
    /// Extension forced onto cache-derived targets (e.g. "iso").
    pub extension: Option<String>,
    /// Short human-readable name, e.g. "ISO" or "Guest Additions".
    pub description: String,
    /// Slot under which the final path is published.
    pub result_key: String,
    /// Copy local sources into the target instead of using them in place.
    pub copy_local: bool,
}

impl AcquisitionRequest {
    pub fn new<I, S>(description: &str, result_key: &str, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            checksum: None,
            checksum_type: None,
            target_path: None,
            extension: None,
            description: description.to_string(),
            result_key: result_key.to_string(),
            copy_local: false,
        }
    }

    pub fn with_checksum(mut self, checksum_type: &str, checksum: &str) -> Self {
        self.checksum_type = Some(checksum_type.to_string());
        self.checksum = Some(checksum.to_string());
        self
    }

    pub fn with_target_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_path = Some(path.into());
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }

    pub fn with_copy_local(mut self, copy_local: bool) -> Self {
        self.copy_local = copy_local;
        self
    }

    /// Decodes and validates the expected digest.
    ///
    /// Returns `Ok(None)` when no checksum is configured. When no algorithm is named,
    /// it is inferred from the digest length.
    pub fn expected_checksum(&self) -> Result<Option<(ChecksumType, Vec<u8>)>, AcquireError> {
        let hex = match self.checksum.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(h) => h,
        };
        let digest = checksum::decode_checksum(hex).map_err(AcquireError::MalformedChecksum)?;

        let named = self
            .checksum_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let kind = match named {
            Some(name) => ChecksumType::parse(name)
                .ok_or_else(|| AcquireError::UnsupportedChecksumType(name.to_string()))?,
            None => infer_checksum_type(digest.len()).ok_or_else(|| {
                AcquireError::UnsupportedChecksumType(format!("<{}-byte digest>", digest.len()))
            })?,
        };
        if digest.len() != kind.digest_len() {
            return Err(AcquireError::ChecksumLength {
                kind,
                expected: kind.digest_len(),
                actual: digest.len(),
            });
        }
        Ok(Some((kind, digest)))
    }
}

fn infer_checksum_type(len: usize) -> Option<ChecksumType> {
    [
        ChecksumType::Md5,
        ChecksumType::Sha1,
        ChecksumType::Sha256,
        ChecksumType::Sha512,
    ]
    .into_iter()
    .find(|k| k.digest_len() == len)
}

/// One candidate's resolved configuration. Built once per candidate at the start of an
/// acquisition and not modified afterwards.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// The candidate identifier as given in the request.
    pub source: String,
    pub kind: Source,
    pub target_path: PathBuf,
    pub checksum_type: Option<ChecksumType>,
    /// Raw expected digest; empty when no checksum is configured.
    pub checksum: Vec<u8>,
    /// True when the source is a local file rather than a remote fetch.
    pub local: bool,
    /// For local sources: copy into `target_path` instead of using the file in place.
    pub copy_file: bool,
}

impl DownloadTask {
    pub fn new(
        source: &str,
        target_path: PathBuf,
        expected: Option<&(ChecksumType, Vec<u8>)>,
        copy_local: bool,
    ) -> Self {
        let kind = Source::parse(source);
        let local = kind.is_local();
        Self {
            source: source.to_string(),
            kind,
            target_path,
            checksum_type: expected.map(|(k, _)| *k),
            checksum: expected.map(|(_, d)| d.clone()).unwrap_or_default(),
            local,
            copy_file: local && copy_local,
        }
    }

    pub fn has_checksum(&self) -> bool {
        self.checksum_type.is_some() && !self.checksum.is_empty()
    }

    pub fn checksum_hex(&self) -> String {
        hex::encode(&self.checksum)
    }

    /// True when `path` already satisfies the expected digest. Always false without a checksum.
    pub fn verify(&self, path: &Path) -> bool {
        match self.checksum_type {
            Some(kind) if !self.checksum.is_empty() => {
                checksum::verify_path(path, kind, &self.checksum)
            }
            _ => false,
        }
    }
}
