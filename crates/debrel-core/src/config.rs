use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters for the upstream download (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 250,
            max_delay_secs: 30,
        }
    }
}

/// Metadata written into `debian/control`, `debian/changelog` and friends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Debian source and binary package name.
    pub name: String,
    /// Name of the launcher installed into `/usr/bin`.
    pub binary: String,
    /// `Maintainer:` field and changelog trailer, `Name <email>`.
    pub maintainer: String,
    pub homepage: String,
    pub section: String,
    pub priority: String,
    pub architecture: String,
    pub depends: Vec<String>,
    pub build_depends: Vec<String>,
    pub standards_version: String,
    pub debhelper_compat: u32,
    pub short_description: String,
    /// Long description; blank lines become ` .` in the control file.
    pub long_description: String,
    /// Absolute directory the virtualenv is installed into.
    pub install_prefix: String,
    /// Python module the launcher runs with `-m`.
    pub entry_module: String,
    /// Paths inside the upstream tree passed to `pip install`, in order.
    pub pip_sources: Vec<String>,
    /// Debian revision appended to the upstream version.
    pub revision: u32,
    pub distribution: String,
    pub urgency: String,
    /// Bullet text of the generated changelog entry.
    pub changelog_message: String,
    /// Upstream license name (DEP-5 short name) and full text.
    pub license: String,
    pub license_text: String,
    pub copyright: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "azure-cli".to_string(),
            binary: "az".to_string(),
            maintainer: "Azure Python CLI Team <azpycli@microsoft.com>".to_string(),
            homepage: "https://github.com/Azure/azure-cli".to_string(),
            section: "python".to_string(),
            priority: "extra".to_string(),
            architecture: "all".to_string(),
            depends: vec!["python3 (>= 3.5)".to_string(), "libssl-dev".to_string()],
            build_depends: vec![
                "debhelper (>= 9)".to_string(),
                "python3".to_string(),
                "python3-venv".to_string(),
                "libssl-dev".to_string(),
                "libffi-dev".to_string(),
            ],
            standards_version: "3.9.5".to_string(),
            debhelper_compat: 9,
            short_description: "Azure CLI 2.0".to_string(),
            long_description: "A great cloud needs great tools; we're excited to introduce \
                Azure CLI 2.0, our next generation multi-platform command line experience for Azure."
                .to_string(),
            install_prefix: "/opt/az".to_string(),
            entry_module: "azure.cli".to_string(),
            pip_sources: vec![
                "src/azure-cli-core".to_string(),
                "src/azure-cli".to_string(),
            ],
            revision: 1,
            distribution: "unstable".to_string(),
            urgency: "low".to_string(),
            changelog_message: "Debian package release.".to_string(),
            license: "MIT".to_string(),
            license_text: MIT_LICENSE_TEXT.to_string(),
            copyright: "Copyright (c) Microsoft Corporation. All rights reserved.".to_string(),
        }
    }
}

const MIT_LICENSE_TEXT: &str = "Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.";

/// Where the upstream release comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Download URL; `{version}` is replaced with the release version.
    pub url_template: String,
    /// Directory verified downloads are kept in (None = the work dir, no reuse across runs).
    pub cache_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: "https://github.com/Azure/azure-cli/archive/all-v{version}.tar.gz"
                .to_string(),
            cache_dir: None,
        }
    }
}

/// Packaging tool invocation and output placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Staging directory (None = fresh temp dir per run).
    pub work_dir: Option<PathBuf>,
    /// Where the finished `.deb` is copied (None = current directory).
    pub output_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: "dpkg-buildpackage".to_string(),
            args: vec!["-us".to_string(), "-uc".to_string(), "-b".to_string()],
            work_dir: None,
            output_dir: None,
        }
    }
}

/// Global configuration loaded from `~/.config/debrel/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebrelConfig {
    pub package: PackageConfig,
    pub source: SourceConfig,
    pub build: BuildConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("debrel")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DebrelConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DebrelConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<DebrelConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: DebrelConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
