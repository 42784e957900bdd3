//! CLI for debrel, the Debian release packager.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use debrel_core::config::{self, DebrelConfig};
use debrel_core::release::{ReleaseDescriptor, SHA256_ENV, VERSION_ENV};
use std::path::PathBuf;

use commands::{
    run_artifact_name, run_build, run_checksum, run_completions, run_create_dir, run_fetch,
    run_man, run_verify, BuildArgs, VerifyArgs,
};

/// Top-level CLI for debrel.
#[derive(Debug, Parser)]
#[command(name = "debrel", version)]
#[command(about = "debrel: package CLI releases as Debian .deb files", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/debrel/config.toml, created on first run).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Upstream version, from `--cli-version` or `CLI_VERSION`.
#[derive(Debug, Clone, Args)]
pub struct VersionArg {
    /// Upstream version to package (e.g. 0.2.1).
    #[arg(long = "cli-version", env = VERSION_ENV, value_name = "VERSION")]
    pub cli_version: String,
}

/// Release descriptor, from flags or `CLI_VERSION` / `CLI_DOWNLOAD_SHA256`.
#[derive(Debug, Clone, Args)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub version: VersionArg,

    /// Expected SHA-256 of the upstream release artifact.
    #[arg(long, env = SHA256_ENV, value_name = "HEX")]
    pub sha256: String,
}

impl ReleaseArgs {
    pub fn descriptor(&self) -> Result<ReleaseDescriptor> {
        Ok(ReleaseDescriptor::new(&self.version.cli_version, &self.sha256)?)
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch, verify and package a release into <package>_<version>-<rev>_<arch>.deb.
    Build(BuildArgs),

    /// Write the debian/ directory into an unpacked source tree.
    CreateDir {
        /// Unpacked upstream source directory.
        source_dir: PathBuf,
        #[command(flatten)]
        version: VersionArg,
        /// Use this hand-edited changelog instead of generating one.
        #[arg(long, value_name = "FILE")]
        changelog: Option<PathBuf>,
    },

    /// Download and verify the upstream release artifact only.
    Fetch {
        #[command(flatten)]
        release: ReleaseArgs,
        /// Destination file (default: ./<package>_<version>.orig.tar.gz).
        #[arg(long, value_name = "PATH")]
        dest: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file (e.g. to fill in CLI_DOWNLOAD_SHA256).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Check a built package; optionally install it and run the binary.
    Verify(VerifyArgs),

    /// Print the file name the build will produce.
    ArtifactName {
        #[command(flatten)]
        version: VersionArg,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

fn load_config(path: Option<&PathBuf>) -> Result<DebrelConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Completions and man pages need no config.
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = load_config(cli.config.as_ref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Build(args) => run_build(cfg, args).await?,
            CliCommand::CreateDir {
                source_dir,
                version,
                changelog,
            } => run_create_dir(&cfg, &source_dir, &version.cli_version, changelog)?,
            CliCommand::Fetch { release, dest } => run_fetch(cfg, &release, dest).await?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
            CliCommand::Verify(args) => run_verify(&cfg, &args).await?,
            CliCommand::ArtifactName { version } => run_artifact_name(&cfg, &version.cli_version)?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
