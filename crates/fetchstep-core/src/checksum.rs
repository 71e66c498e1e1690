//! Checksum decoding and on-demand file digests.
//!
//! Digests are computed in bounded chunks so multi-gigabyte artifacts can be
//! checked without loading them into memory. A missing or unreadable file never
//! matches; it is not an error from the verifier's point of view.

use anyhow::{Context, Result};
use sha2::Digest;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithm named by an acquisition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumType {
    /// Parses an algorithm name case-insensitively. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "md5" => Some(Self::Md5),
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of a raw digest in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported checksum type: {}", s))
    }
}

/// Decodes a hex checksum (either case) into raw digest bytes.
pub fn decode_checksum(expected: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    hex::decode(expected.trim())
}

fn hash_reader<D: Digest>(reader: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

/// Computes the raw digest of the file at `path` under `kind`.
pub fn digest_path(path: &Path, kind: ChecksumType) -> io::Result<Vec<u8>> {
    let mut f = File::open(path)?;
    match kind {
        ChecksumType::Md5 => hash_reader::<md5::Md5>(&mut f),
        ChecksumType::Sha1 => hash_reader::<sha1::Sha1>(&mut f),
        ChecksumType::Sha256 => hash_reader::<sha2::Sha256>(&mut f),
        ChecksumType::Sha512 => hash_reader::<sha2::Sha512>(&mut f),
    }
}

/// Lowercase hex digest of a file, for display (e.g. the `checksum` command).
pub fn hex_digest_path(path: &Path, kind: ChecksumType) -> Result<String> {
    let digest = digest_path(path, kind)
        .with_context(|| format!("{} of {}", kind, path.display()))?;
    Ok(hex::encode(digest))
}

/// Returns true when the file at `path` hashes to `expected` under `kind`.
///
/// An empty `expected` never matches, and neither does a missing or unreadable file.
pub fn verify_path(path: &Path, kind: ChecksumType, expected: &[u8]) -> bool {
    if expected.is_empty() {
        return false;
    }
    match digest_path(path, kind) {
        Ok(actual) => actual == expected,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "checksum not computed");
            false
        }
    }
}
