//! Running external tools (dpkg-buildpackage, dpkg-deb, dpkg).

use anyhow::{bail, Context, Result};
use std::process::{Command, Output};

/// Render a command line for logs and errors.
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

pub trait CommandExt {
    /// Run with inherited stdio; non-zero exit is an error.
    fn try_exec(&mut self) -> Result<()>;
    /// Run capturing output; non-zero exit is an error carrying stderr.
    fn try_exec_with_output(&mut self) -> Result<Output>;
}

impl CommandExt for Command {
    fn try_exec(&mut self) -> Result<()> {
        let line = describe(self);
        tracing::debug!(command = %line, "exec");
        let status = self
            .status()
            .with_context(|| format!("failed to start `{}`", line))?;
        if status.success() {
            Ok(())
        } else {
            bail!("`{}` failed with {}", line, status)
        }
    }

    fn try_exec_with_output(&mut self) -> Result<Output> {
        let line = describe(self);
        tracing::debug!(command = %line, "exec (captured)");
        let output = self
            .output()
            .with_context(|| format!("failed to start `{}`", line))?;
        if output.status.success() {
            Ok(output)
        } else {
            bail!(
                "`{}` failed with {}: {}",
                line,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )
        }
    }
}
