//! `debian/changelog`: generated single entry, or an operator-edited file checked against the release.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

/// Reproducible-builds convention for pinning timestamps.
pub const SOURCE_DATE_EPOCH_ENV: &str = "SOURCE_DATE_EPOCH";

/// The top entry of a supplied changelog names a different package or version.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("changelog top entry is {found_package} ({found_version}), expected {package} ({version})")]
pub struct ChangelogMismatch {
    pub package: String,
    pub version: String,
    pub found_package: String,
    pub found_version: String,
}

/// One changelog stanza.
#[derive(Debug, Clone)]
pub struct ChangelogEntry<'a> {
    pub package: &'a str,
    /// Full Debian version including revision.
    pub version: &'a str,
    pub distribution: &'a str,
    pub urgency: &'a str,
    pub message: &'a str,
    pub maintainer: &'a str,
    pub date: DateTime<Utc>,
}

impl ChangelogEntry<'_> {
    pub fn render(&self) -> String {
        format!(
            "{} ({}) {}; urgency={}\n\n  * {}\n\n -- {}  {}\n",
            self.package,
            self.version,
            self.distribution,
            self.urgency,
            self.message,
            self.maintainer,
            self.date.format("%a, %d %b %Y %H:%M:%S %z"),
        )
    }
}

/// `SOURCE_DATE_EPOCH` when set, otherwise now.
pub fn changelog_date() -> Result<DateTime<Utc>> {
    match std::env::var(SOURCE_DATE_EPOCH_ENV) {
        Ok(raw) => parse_epoch(&raw),
        Err(_) => Ok(Utc::now()),
    }
}

fn parse_epoch(raw: &str) -> Result<DateTime<Utc>> {
    let secs: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} is not an integer: {:?}", SOURCE_DATE_EPOCH_ENV, raw))?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .with_context(|| format!("{} out of range: {}", SOURCE_DATE_EPOCH_ENV, secs))
}

/// Package and version of the first entry: `name (version) dist; urgency=...`.
pub fn top_entry(text: &str) -> Option<(&str, &str)> {
    let line = text.lines().find(|l| !l.trim().is_empty())?;
    let (name, rest) = line.split_once(" (")?;
    let (version, _) = rest.split_once(')')?;
    Some((name.trim(), version.trim()))
}

/// Check a supplied changelog against the package being built.
pub fn check_top_entry(text: &str, package: &str, version: &str) -> Result<()> {
    let (found_package, found_version) = top_entry(text)
        .context("changelog has no parsable top entry (expected `name (version) dist; ...`)")?;
    if found_package != package || found_version != version {
        return Err(ChangelogMismatch {
            package: package.to_string(),
            version: version.to_string(),
            found_package: found_package.to_string(),
            found_version: found_version.to_string(),
        }
        .into());
    }
    Ok(())
}
