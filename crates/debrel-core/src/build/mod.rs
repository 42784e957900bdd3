//! End-to-end package build.
//!
//! fetch + verify -> extract -> `debian/` -> packaging tool -> collect the
//! `.deb`. Stages run strictly in order and the first failure stops the run;
//! in particular nothing is extracted or packaged unless the upstream
//! checksum matched.

mod tool;

pub use tool::{DpkgBuildpackage, PackageTool};

use crate::archive;
use crate::checksum;
use crate::config::DebrelConfig;
use crate::debian::{self, changelog, ChangelogSource};
use crate::fetch::{self, FetchOptions, FetchOutcome};
use crate::release::ReleaseDescriptor;
use crate::storage;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-run overrides on top of [`DebrelConfig`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Staging directory; overrides `[build].work_dir`. None and unset = temp dir.
    pub work_dir: Option<PathBuf>,
    /// Overrides `[build].output_dir`. None and unset = current directory.
    pub output_dir: Option<PathBuf>,
    /// Hand-edited changelog to use instead of a generated one.
    pub changelog: Option<PathBuf>,
    /// Date for the generated changelog; None = `SOURCE_DATE_EPOCH` or now.
    pub changelog_date: Option<DateTime<Utc>>,
    pub fetch: FetchOptions,
}

/// What a successful build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub package: String,
    /// Full Debian version, `<upstream>-<revision>`.
    pub version: String,
    pub artifact: PathBuf,
    pub artifact_sha256: String,
    pub upstream_url: String,
    pub upstream_sha256: String,
    /// True when a previously verified download was reused.
    pub upstream_cached: bool,
}

enum WorkDir {
    Temp(tempfile::TempDir),
    Fixed(PathBuf),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(t) => t.path(),
            WorkDir::Fixed(p) => p,
        }
    }
}

fn prepare_work_dir(configured: Option<&Path>) -> Result<WorkDir> {
    match configured {
        Some(p) => {
            fs::create_dir_all(p).with_context(|| format!("create work dir {}", p.display()))?;
            Ok(WorkDir::Fixed(p.to_path_buf()))
        }
        None => {
            let t = tempfile::Builder::new()
                .prefix("debrel-")
                .tempdir()
                .context("create temporary work dir")?;
            Ok(WorkDir::Temp(t))
        }
    }
}

/// Names of `.deb` files in `dir`, for error messages when the expected one is missing.
fn debs_in(dir: &Path) -> Vec<String> {
    let mut found: Vec<String> = fs::read_dir(dir)
        .map(|rd| {
            rd.flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.ends_with(".deb"))
                .collect()
        })
        .unwrap_or_default();
    found.sort();
    found
}

/// Build `release` into `<output_dir>/<package>_<version>-<rev>_<arch>.deb`.
pub fn run_build(
    cfg: &DebrelConfig,
    release: &ReleaseDescriptor,
    opts: &BuildOptions,
    tool: &dyn PackageTool,
) -> Result<BuildReport> {
    let pkg = &cfg.package;
    let version = release.version();
    let full_version = release.debian_version(pkg.revision);
    let artifact_name = release.artifact_file_name(&pkg.name, pkg.revision, &pkg.architecture);

    let work = prepare_work_dir(opts.work_dir.as_deref().or(cfg.build.work_dir.as_deref()))?;
    let work_path = work.path();
    tracing::info!(
        package = %pkg.name,
        version = %full_version,
        work = %work_path.display(),
        "starting build"
    );

    // 1. fetch + verify
    let url = fetch::render_download_url(&cfg.source.url_template, version)?;
    let orig_name = archive::orig_tarball_name(&pkg.name, version);
    let download_dir = cfg.source.cache_dir.as_deref().unwrap_or(work_path);
    let outcome = fetch::fetch_release(&url, release, &download_dir.join(&orig_name), &opts.fetch)?;
    let orig_path = work_path.join(&orig_name);
    if outcome.path() != orig_path.as_path() {
        storage::copy_atomic(outcome.path(), &orig_path)?;
    }

    // 2. extract
    let source_dir = work_path.join(archive::source_dir_name(&pkg.name, version));
    archive::extract_tar_gz(&orig_path, &source_dir)?;

    // 3. debian/
    let changelog_source = match &opts.changelog {
        Some(p) => ChangelogSource::File(p.clone()),
        None => ChangelogSource::Generated {
            date: match opts.changelog_date {
                Some(d) => d,
                None => changelog::changelog_date()?,
            },
        },
    };
    debian::create_debian_dir(&source_dir, pkg, version, &changelog_source)?;

    // 4. package
    let built = work_path.join(&artifact_name);
    if built.exists() {
        fs::remove_file(&built).with_context(|| format!("remove stale {}", built.display()))?;
    }
    tool.build(&source_dir)
        .with_context(|| format!("{} failed for {}", tool.name(), source_dir.display()))?;
    if !built.is_file() {
        anyhow::bail!(
            "{} did not produce {} in {} (found: {:?})",
            tool.name(),
            artifact_name,
            work_path.display(),
            debs_in(work_path)
        );
    }

    // 5. collect
    let output_dir = match opts.output_dir.as_ref().or(cfg.build.output_dir.as_ref()) {
        Some(d) => d.clone(),
        None => std::env::current_dir().context("current directory")?,
    };
    let artifact = output_dir.join(&artifact_name);
    storage::copy_atomic(&built, &artifact)?;
    let artifact_sha256 = checksum::sha256_path(&artifact)?;
    tracing::info!(artifact = %artifact.display(), sha256 = %artifact_sha256, "package ready");

    Ok(BuildReport {
        package: pkg.name.clone(),
        version: full_version,
        artifact,
        artifact_sha256,
        upstream_url: url,
        upstream_sha256: release.sha256().to_string(),
        upstream_cached: matches!(outcome, FetchOutcome::Cached { .. }),
    })
}
