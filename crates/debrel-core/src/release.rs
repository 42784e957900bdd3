//! Release descriptor: which upstream version to package and its expected SHA-256.

use thiserror::Error;

/// Environment variable holding the upstream version.
pub const VERSION_ENV: &str = "CLI_VERSION";
/// Environment variable holding the expected SHA-256 of the upstream artifact.
pub const SHA256_ENV: &str = "CLI_DOWNLOAD_SHA256";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("invalid version {0:?}: must start with a digit and contain only [A-Za-z0-9.+~]")]
    InvalidVersion(String),
    #[error("invalid SHA-256 {0:?}: expected 64 hex characters")]
    InvalidSha256(String),
}

/// Identifies the upstream release to fetch and package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    version: String,
    sha256: String,
}

impl ReleaseDescriptor {
    /// Validates both fields. The digest is normalized to lowercase.
    pub fn new(version: &str, sha256: &str) -> Result<Self, ReleaseError> {
        let version = version.trim();
        if !is_valid_upstream_version(version) {
            return Err(ReleaseError::InvalidVersion(version.to_string()));
        }
        let sha256 = sha256.trim();
        if sha256.len() != 64 || !sha256.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ReleaseError::InvalidSha256(sha256.to_string()));
        }
        Ok(Self {
            version: version.to_string(),
            sha256: sha256.to_ascii_lowercase(),
        })
    }

    /// Reads `CLI_VERSION` and `CLI_DOWNLOAD_SHA256`.
    pub fn from_env() -> Result<Self, ReleaseError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ReleaseDescriptor::from_env`] with a caller-supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReleaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let version = lookup(VERSION_ENV).ok_or(ReleaseError::MissingEnv(VERSION_ENV))?;
        let sha256 = lookup(SHA256_ENV).ok_or(ReleaseError::MissingEnv(SHA256_ENV))?;
        Self::new(&version, &sha256)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Full Debian version, `<version>-<revision>`.
    pub fn debian_version(&self, revision: u32) -> String {
        debian_version(&self.version, revision)
    }

    /// `<package>_<version>-<revision>_<arch>.deb`.
    pub fn artifact_file_name(&self, package: &str, revision: u32, arch: &str) -> String {
        artifact_file_name(package, &self.version, revision, arch)
    }
}

/// Upstream part of a Debian version. Hyphens are rejected since the revision is appended here.
pub fn is_valid_upstream_version(version: &str) -> bool {
    match version.bytes().next() {
        Some(first) if first.is_ascii_digit() => version
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'~')),
        _ => false,
    }
}

pub fn debian_version(version: &str, revision: u32) -> String {
    format!("{}-{}", version, revision)
}

pub fn artifact_file_name(package: &str, version: &str, revision: u32, arch: &str) -> String {
    format!("{}_{}_{}.deb", package, debian_version(version, revision), arch)
}
