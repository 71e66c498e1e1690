//! Checksum command: print a file's digest in `sha256sum` style.

use anyhow::{anyhow, Result};
use fetchstep_core::checksum::{self, ChecksumType};
use std::path::Path;

pub fn run_checksum(path: &Path, kind: &str) -> Result<()> {
    let kind = ChecksumType::parse(kind).ok_or_else(|| anyhow!("unsupported checksum type: {}", kind))?;
    let digest = checksum::hex_digest_path(path, kind)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
