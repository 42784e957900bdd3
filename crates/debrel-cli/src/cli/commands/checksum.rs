//! `debrel checksum <path>`: print a value suitable for CLI_DOWNLOAD_SHA256.

use anyhow::{Context, Result};
use debrel_core::checksum;
use std::path::Path;

/// Same output format as `sha256sum`.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let owned = path.to_path_buf();
    let digest = tokio::task::spawn_blocking(move || checksum::sha256_path(&owned))
        .await
        .context("checksum task join")??;
    tracing::debug!(path = %path.display(), %digest, "computed checksum");
    println!("{}  {}", digest, path.display());
    Ok(())
}
