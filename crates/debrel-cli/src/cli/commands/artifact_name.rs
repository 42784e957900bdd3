//! `debrel artifact-name`: print the expected .deb file name.

use anyhow::Result;
use debrel_core::config::DebrelConfig;
use debrel_core::release::{artifact_file_name, is_valid_upstream_version};

pub fn run_artifact_name(cfg: &DebrelConfig, version: &str) -> Result<()> {
    if !is_valid_upstream_version(version) {
        anyhow::bail!("invalid version {:?}", version);
    }
    let pkg = &cfg.package;
    println!(
        "{}",
        artifact_file_name(&pkg.name, version, pkg.revision, &pkg.architecture)
    );
    Ok(())
}
