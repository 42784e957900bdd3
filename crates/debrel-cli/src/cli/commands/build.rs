//! `debrel build`: run the full packaging pipeline.

use anyhow::{Context, Result};
use clap::Args;
use debrel_core::build::{self, BuildOptions, DpkgBuildpackage};
use debrel_core::config::DebrelConfig;
use debrel_core::fetch::FetchOptions;
use debrel_core::retry::RetryPolicy;
use std::path::PathBuf;

use crate::cli::ReleaseArgs;

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Staging directory (default: [build].work_dir, else a temporary directory).
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Where to place the .deb (default: [build].output_dir, else the current directory).
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Use this hand-edited changelog instead of generating one.
    #[arg(long, value_name = "FILE")]
    pub changelog: Option<PathBuf>,

    /// Fail on the first download error instead of retrying.
    #[arg(long)]
    pub no_retry: bool,

    /// Print the build report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run_build(cfg: DebrelConfig, args: BuildArgs) -> Result<()> {
    let release = args.release.descriptor()?;
    let retry = if args.no_retry {
        RetryPolicy::single_attempt()
    } else {
        cfg.retry.as_ref().map(RetryPolicy::from).unwrap_or_default()
    };
    let opts = BuildOptions {
        work_dir: args.work_dir,
        output_dir: args.out_dir,
        changelog: args.changelog,
        changelog_date: None,
        fetch: FetchOptions {
            retry,
            ..FetchOptions::default()
        },
    };

    let report = tokio::task::spawn_blocking(move || {
        let tool = DpkgBuildpackage::from_config(&cfg.build);
        build::run_build(&cfg, &release, &opts, &tool)
    })
    .await
    .context("build task join")??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.artifact.display());
        println!("  version:  {}", report.version);
        println!("  sha256:   {}", report.artifact_sha256);
        println!(
            "  upstream: {}{}",
            report.upstream_url,
            if report.upstream_cached { " (cached)" } else { "" }
        );
    }
    Ok(())
}
