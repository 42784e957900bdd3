//! Post-build verification: inspect the `.deb`, install it, run the binary.
//!
//! Mirrors the manual release check: `dpkg -i <deb>`, then `az` and
//! `az --version` must exit 0 and the latter must report the packaged version.

use crate::cmd::CommandExt;
use crate::config::PackageConfig;
use crate::release::{artifact_file_name, debian_version};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::process::Command;

/// Control fields read back from a built package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DebInfo {
    pub package: String,
    pub version: String,
    pub architecture: String,
}

/// Parse `dpkg-deb --field` output (`Name: value` lines).
pub fn parse_fields(output: &str) -> DebInfo {
    let mut info = DebInfo::default();
    for line in output.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim() {
            n if n.eq_ignore_ascii_case("package") => info.package = value,
            n if n.eq_ignore_ascii_case("version") => info.version = value,
            n if n.eq_ignore_ascii_case("architecture") => info.architecture = value,
            _ => {}
        }
    }
    info
}

/// `dpkg-deb --field <deb> Package Version Architecture`.
pub fn inspect(deb: &Path) -> Result<DebInfo> {
    let output = Command::new("dpkg-deb")
        .arg("--field")
        .arg(deb)
        .args(["Package", "Version", "Architecture"])
        .try_exec_with_output()?;
    Ok(parse_fields(&String::from_utf8_lossy(&output.stdout)))
}

/// Compare the file name and control fields of `deb` with what upstream `version` should produce.
pub fn check_artifact(deb: &Path, info: &DebInfo, version: &str, pkg: &PackageConfig) -> Result<()> {
    let expected_name = artifact_file_name(&pkg.name, version, pkg.revision, &pkg.architecture);
    let actual_name = deb
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if actual_name != expected_name {
        anyhow::bail!("artifact is named {}, expected {}", actual_name, expected_name);
    }
    let expected = DebInfo {
        package: pkg.name.clone(),
        version: debian_version(version, pkg.revision),
        architecture: pkg.architecture.clone(),
    };
    if *info != expected {
        anyhow::bail!("package metadata {:?} does not match expected {:?}", info, expected);
    }
    Ok(())
}

/// `dpkg -i <deb>`; needs root.
pub fn install(deb: &Path) -> Result<()> {
    tracing::info!(deb = %deb.display(), "installing package");
    Command::new("dpkg")
        .arg("-i")
        .arg(deb)
        .try_exec()
        .with_context(|| format!("install {}", deb.display()))
}

/// True when `version` appears in `output` as a whole token, so `0.2.1`
/// does not match `0.2.10` or `10.2.1`.
pub fn reports_version(output: &str, version: &str) -> bool {
    if version.is_empty() {
        return false;
    }
    let is_part = |c: char| c.is_ascii_alphanumeric() || c == '.';
    output.match_indices(version).any(|(i, _)| {
        let before = output[..i].chars().next_back();
        let after = output[i + version.len()..].chars().next();
        !before.is_some_and(is_part) && !after.is_some_and(is_part)
    })
}

/// Run `<binary>` and `<binary> --version`; both must exit 0 and the latter must report `version`.
/// Returns the `--version` output.
pub fn check_installed(binary: &str, version: &str) -> Result<String> {
    Command::new(binary)
        .try_exec_with_output()
        .with_context(|| format!("run {}", binary))?;
    let output = Command::new(binary)
        .arg("--version")
        .try_exec_with_output()
        .with_context(|| format!("run {} --version", binary))?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    if !reports_version(&text, version) {
        anyhow::bail!("`{} --version` does not report {}:\n{}", binary, version, text.trim());
    }
    tracing::info!(%binary, %version, "installed binary reports expected version");
    Ok(text)
}
