//! `debrel create-dir <source-dir>`: write debian/ into an unpacked source tree.

use anyhow::Result;
use debrel_core::config::DebrelConfig;
use debrel_core::debian::{self, changelog, ChangelogSource};
use std::path::{Path, PathBuf};

pub fn run_create_dir(
    cfg: &DebrelConfig,
    source_dir: &Path,
    version: &str,
    changelog_file: Option<PathBuf>,
) -> Result<()> {
    let source = match changelog_file {
        Some(p) => ChangelogSource::File(p),
        None => ChangelogSource::Generated {
            date: changelog::changelog_date()?,
        },
    };
    let out = debian::create_debian_dir(source_dir, &cfg.package, version, &source)?;
    for f in &out.files {
        println!("{}", out.root.join(f).display());
    }
    Ok(())
}
