//! `debrel verify <deb>`: check a built package, optionally install and run it.

use anyhow::{Context, Result};
use clap::Args;
use debrel_core::config::DebrelConfig;
use debrel_core::verify;
use std::path::PathBuf;

use crate::cli::VersionArg;

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// Package to check.
    pub deb: PathBuf,

    #[command(flatten)]
    pub version: VersionArg,

    /// Install with `dpkg -i` (needs root) and run the installed binary.
    #[arg(long)]
    pub install: bool,
}

pub async fn run_verify(cfg: &DebrelConfig, args: &VerifyArgs) -> Result<()> {
    let deb = args.deb.clone();
    let info = tokio::task::spawn_blocking(move || verify::inspect(&deb))
        .await
        .context("inspect task join")??;
    verify::check_artifact(&args.deb, &info, &args.version.cli_version, &cfg.package)?;
    println!(
        "{}: {} {} ({}) OK",
        args.deb.display(),
        info.package,
        info.version,
        info.architecture
    );

    if args.install {
        let deb = args.deb.clone();
        let binary = cfg.package.binary.clone();
        let version = args.version.cli_version.clone();
        let out = tokio::task::spawn_blocking(move || {
            verify::install(&deb)?;
            verify::check_installed(&binary, &version)
        })
        .await
        .context("install task join")??;
        println!("{} --version:\n{}", cfg.package.binary, out.trim_end());
    }
    Ok(())
}
