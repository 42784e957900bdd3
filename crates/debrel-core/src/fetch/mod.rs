//! Upstream release download with checksum verification.
//!
//! The artifact is streamed to `<dest>.part`, hashed, and only renamed to
//! `dest` when the digest matches the release descriptor. A mismatching
//! download is deleted and reported as a [`ChecksumMismatch`]; nothing
//! downstream may run on it.
//!
//! [`ChecksumMismatch`]: crate::checksum::ChecksumMismatch

mod http;
mod source_url;

pub use http::CurlTimeouts;
pub use source_url::{render_download_url, VERSION_PLACEHOLDER};

use crate::checksum;
use crate::release::ReleaseDescriptor;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage::StagedFile;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// How `fetch_release` satisfied the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Downloaded and verified `bytes` bytes.
    Downloaded { path: PathBuf, bytes: u64 },
    /// `dest` already held a file with the expected digest.
    Cached { path: PathBuf },
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Downloaded { path, .. } | FetchOutcome::Cached { path } => path,
        }
    }
}

/// Download options beyond the URL and destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub retry: RetryPolicy,
    pub timeouts: CurlTimeouts,
}

/// Fetch `url` to `dest` and verify it against `release.sha256()`.
///
/// An existing `dest` with the right digest is reused without network access;
/// one with the wrong digest is replaced.
pub fn fetch_release(
    url: &str,
    release: &ReleaseDescriptor,
    dest: &Path,
    opts: &FetchOptions,
) -> Result<FetchOutcome> {
    if dest.exists() {
        match checksum::verify_sha256(dest, release.sha256()) {
            Ok(()) => {
                tracing::info!(path = %dest.display(), "reusing verified download");
                return Ok(FetchOutcome::Cached {
                    path: dest.to_path_buf(),
                });
            }
            Err(e) => {
                tracing::warn!("discarding cached artifact: {:#}", e);
                std::fs::remove_file(dest)
                    .with_context(|| format!("remove stale {}", dest.display()))?;
            }
        }
    }

    tracing::info!(%url, dest = %dest.display(), "downloading release {}", release.version());
    let mut staged = StagedFile::create(dest)?;
    let downloaded = run_with_retry(&opts.retry, |attempt| {
        tracing::debug!(attempt, "GET {}", url);
        http::download_once(url, &mut staged, opts.timeouts)
    });
    let bytes = match downloaded {
        Ok(n) => n,
        Err(e) => {
            staged.discard();
            return Err(anyhow::Error::new(e).context(format!("download {} failed", url)));
        }
    };

    staged.sync()?;
    if let Err(e) = checksum::verify_sha256(staged.temp_path(), release.sha256()) {
        staged.discard();
        return Err(e.context(format!("refusing to package {}", url)));
    }
    let path = staged.finalize()?;
    tracing::info!(bytes, path = %path.display(), "download verified");
    Ok(FetchOutcome::Downloaded { path, bytes })
}
