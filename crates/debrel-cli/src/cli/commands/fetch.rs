//! `debrel fetch`: download and verify the upstream artifact without packaging.

use anyhow::{Context, Result};
use debrel_core::archive;
use debrel_core::config::DebrelConfig;
use debrel_core::fetch::{self, FetchOptions, FetchOutcome};
use debrel_core::retry::RetryPolicy;
use std::path::PathBuf;

use crate::cli::ReleaseArgs;

pub async fn run_fetch(cfg: DebrelConfig, release: &ReleaseArgs, dest: Option<PathBuf>) -> Result<()> {
    let release = release.descriptor()?;
    let url = fetch::render_download_url(&cfg.source.url_template, release.version())?;
    let dest = match dest {
        Some(d) => d,
        None => std::env::current_dir()?
            .join(archive::orig_tarball_name(&cfg.package.name, release.version())),
    };
    let opts = FetchOptions {
        retry: cfg.retry.as_ref().map(RetryPolicy::from).unwrap_or_default(),
        ..FetchOptions::default()
    };

    let outcome = tokio::task::spawn_blocking(move || fetch::fetch_release(&url, &release, &dest, &opts))
        .await
        .context("fetch task join")??;
    match outcome {
        FetchOutcome::Downloaded { path, bytes } => {
            println!("downloaded {} ({} bytes), checksum OK", path.display(), bytes)
        }
        FetchOutcome::Cached { path } => println!("{} already present, checksum OK", path.display()),
    }
    Ok(())
}
