//! SHA-256 verification of the upstream artifact.
//!
//! The digest is computed after the download has been written to disk, then
//! compared against the expected value from the release descriptor.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUF_SIZE: usize = 64 * 1024;

/// Downloaded bytes do not hash to the expected digest.
#[derive(Debug, Error)]
#[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
pub struct ChecksumMismatch {
    pub path: PathBuf,
    pub expected: String,
    pub actual: String,
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hash `path` and compare with `expected` (case-insensitive).
/// A mismatch is returned as a [`ChecksumMismatch`] inside the error chain.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_path(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        }
        .into());
    }
    tracing::debug!(path = %path.display(), sha256 = %actual, "checksum verified");
    Ok(())
}
