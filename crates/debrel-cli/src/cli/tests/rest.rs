//! Tests for create-dir, checksum, verify, artifact-name, completions, man.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[test]
fn cli_parse_create_dir() {
    match parse(&["debrel", "create-dir", "azure-cli-0.2.1", "--cli-version", "0.2.1"]) {
        CliCommand::CreateDir {
            source_dir,
            version,
            changelog,
        } => {
            assert_eq!(source_dir, PathBuf::from("azure-cli-0.2.1"));
            assert_eq!(version.cli_version, "0.2.1");
            assert!(changelog.is_none());
        }
        _ => panic!("expected CreateDir"),
    }
}

#[test]
fn cli_parse_create_dir_with_changelog() {
    match parse(&[
        "debrel",
        "create-dir",
        "src",
        "--cli-version",
        "0.2.1",
        "--changelog",
        "notes/changelog",
    ]) {
        CliCommand::CreateDir { changelog, .. } => {
            assert_eq!(changelog, Some(PathBuf::from("notes/changelog")))
        }
        _ => panic!("expected CreateDir"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["debrel", "checksum", "/tmp/all-v0.2.1.tar.gz"]) {
        CliCommand::Checksum { path } => {
            assert_eq!(path, PathBuf::from("/tmp/all-v0.2.1.tar.gz"))
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_verify() {
    match parse(&[
        "debrel",
        "verify",
        "azure-cli_0.2.1-1_all.deb",
        "--cli-version",
        "0.2.1",
    ]) {
        CliCommand::Verify(args) => {
            assert_eq!(args.deb, PathBuf::from("azure-cli_0.2.1-1_all.deb"));
            assert_eq!(args.version.cli_version, "0.2.1");
            assert!(!args.install);
        }
        _ => panic!("expected Verify"),
    }
}

#[test]
fn cli_parse_verify_install() {
    match parse(&[
        "debrel",
        "verify",
        "x.deb",
        "--cli-version",
        "0.2.1",
        "--install",
    ]) {
        CliCommand::Verify(args) => assert!(args.install),
        _ => panic!("expected Verify --install"),
    }
}

#[test]
fn cli_parse_artifact_name() {
    match parse(&["debrel", "artifact-name", "--cli-version", "2.0.1"]) {
        CliCommand::ArtifactName { version } => assert_eq!(version.cli_version, "2.0.1"),
        _ => panic!("expected ArtifactName"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["debrel", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_parse_man() {
    assert!(matches!(parse(&["debrel", "man"]), CliCommand::Man));
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["debrel", "publish"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
