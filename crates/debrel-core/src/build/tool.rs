//! The Debian packaging tool invoked on the prepared source tree.

use crate::cmd::CommandExt;
use crate::config::BuildConfig;
use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Builds binary packages from a source tree that already has `debian/`.
/// Output `.deb` files are expected in the source tree's parent directory,
/// as dpkg-buildpackage leaves them.
pub trait PackageTool {
    fn name(&self) -> &str;
    fn build(&self, source_dir: &Path) -> Result<()>;
}

/// `dpkg-buildpackage -us -uc -b` (or whatever `[build]` configures).
#[derive(Debug, Clone)]
pub struct DpkgBuildpackage {
    command: String,
    args: Vec<String>,
}

impl DpkgBuildpackage {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(cfg: &BuildConfig) -> Self {
        Self::new(cfg.command.clone(), cfg.args.clone())
    }

    pub(crate) fn command(&self, source_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args).current_dir(source_dir);
        cmd
    }
}

impl Default for DpkgBuildpackage {
    fn default() -> Self {
        Self::from_config(&BuildConfig::default())
    }
}

impl PackageTool for DpkgBuildpackage {
    fn name(&self) -> &str {
        &self.command
    }

    fn build(&self, source_dir: &Path) -> Result<()> {
        tracing::info!(tool = %self.command, dir = %source_dir.display(), "running packaging tool");
        self.command(source_dir).try_exec()
    }
}
