//! `debian/` directory creator.
//!
//! Writes the packaging skeleton dpkg-buildpackage needs into an unpacked
//! source tree. Every file is rendered from [`PackageConfig`] and the release
//! version; running it again replaces the previous `debian/` wholesale.

pub mod changelog;
pub mod control;
pub mod copyright;
pub mod rules;

use crate::config::PackageConfig;
use crate::release::{debian_version, is_valid_upstream_version};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub use changelog::{ChangelogEntry, ChangelogMismatch};

/// Source format written to `debian/source/format`.
pub const SOURCE_FORMAT: &str = "3.0 (quilt)";

/// File names under `debian/` the launcher must not shadow.
const RESERVED: &[&str] = &["changelog", "compat", "control", "copyright", "rules", "source"];

/// Where the changelog comes from.
#[derive(Debug, Clone)]
pub enum ChangelogSource {
    /// Render a single entry dated `date`.
    Generated { date: DateTime<Utc> },
    /// Use an operator-edited file verbatim after checking its top entry.
    File(PathBuf),
}

/// Result of [`create_debian_dir`].
#[derive(Debug, Clone)]
pub struct DebianDir {
    pub root: PathBuf,
    /// Files written, relative to `root`, in write order.
    pub files: Vec<PathBuf>,
}

fn validate(pkg: &PackageConfig, version: &str) -> Result<()> {
    if !control::is_valid_package_name(&pkg.name) {
        anyhow::bail!("invalid Debian package name {:?}", pkg.name);
    }
    if !is_valid_upstream_version(version) {
        anyhow::bail!("invalid upstream version {:?}", version);
    }
    if pkg.binary.is_empty() || pkg.binary.contains('/') || RESERVED.contains(&pkg.binary.as_str()) {
        anyhow::bail!("invalid launcher name {:?}", pkg.binary);
    }
    if !pkg.install_prefix.starts_with('/') {
        anyhow::bail!("install prefix must be absolute, got {:?}", pkg.install_prefix);
    }
    if pkg.pip_sources.is_empty() {
        anyhow::bail!("no pip sources configured; nothing would be installed");
    }
    Ok(())
}

struct Writer {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Writer {
    fn write(&mut self, rel: &str, contents: &str, executable: bool) -> Result<()> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        if executable {
            make_executable(&path)?;
        }
        self.files.push(PathBuf::from(rel));
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod 0755 {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Create `<source_dir>/debian` for `pkg` at upstream `version`.
pub fn create_debian_dir(
    source_dir: &Path,
    pkg: &PackageConfig,
    version: &str,
    changelog: &ChangelogSource,
) -> Result<DebianDir> {
    validate(pkg, version)?;
    let full_version = debian_version(version, pkg.revision);

    let changelog_text = match changelog {
        ChangelogSource::Generated { date } => ChangelogEntry {
            package: &pkg.name,
            version: &full_version,
            distribution: &pkg.distribution,
            urgency: &pkg.urgency,
            message: &pkg.changelog_message,
            maintainer: &pkg.maintainer,
            date: *date,
        }
        .render(),
        ChangelogSource::File(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read changelog {}", path.display()))?;
            changelog::check_top_entry(&text, &pkg.name, &full_version)
                .with_context(|| format!("changelog {}", path.display()))?;
            text
        }
    };

    let root = source_dir.join("debian");
    if root.exists() {
        tracing::debug!(path = %root.display(), "replacing existing debian directory");
        fs::remove_dir_all(&root).with_context(|| format!("remove {}", root.display()))?;
    }
    fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;

    let mut w = Writer {
        root,
        files: Vec::new(),
    };
    w.write("changelog", &changelog_text, false)?;
    w.write("compat", &format!("{}\n", pkg.debhelper_compat), false)?;
    w.write("control", &control::render_control(pkg), false)?;
    w.write("copyright", &copyright::render_copyright(pkg), false)?;
    w.write("rules", &rules::render_rules(pkg, &full_version), true)?;
    w.write("source/format", &format!("{}\n", SOURCE_FORMAT), false)?;
    w.write(&pkg.binary, &rules::render_launcher(pkg), true)?;

    tracing::info!(
        package = %pkg.name,
        version = %full_version,
        path = %w.root.display(),
        "created debian directory"
    );
    Ok(DebianDir {
        root: w.root,
        files: w.files,
    })
}
