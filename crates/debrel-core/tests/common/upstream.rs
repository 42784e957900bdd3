//! Fake upstream release tarball and packaging tool.

use anyhow::Result;
use debrel_core::build::PackageTool;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::cell::Cell;
use std::fs;
use std::path::Path;

/// Gzipped tarball shaped like a GitHub archive of the CLI sources.
pub fn release_tarball(version: &str) -> Vec<u8> {
    let top = format!("azure-cli-all-v{}", version);
    let files: [(String, String); 2] = [
        (format!("{}/README.rst", top), "Azure CLI\n".to_string()),
        (
            format!("{}/src/azure-cli/setup.py", top),
            format!("VERSION = \"{}\"\n", version),
        ),
    ];
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
    for (name, data) in &files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        builder.append_data(&mut header, name, data.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Stands in for dpkg-buildpackage: checks the tree it is given and writes
/// `file_name` into the source dir's parent.
pub struct FakeDpkg {
    pub file_name: String,
    pub calls: Cell<u32>,
}

impl FakeDpkg {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            calls: Cell::new(0),
        }
    }
}

impl PackageTool for FakeDpkg {
    fn name(&self) -> &str {
        "fake-dpkg"
    }

    fn build(&self, source_dir: &Path) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        for f in ["debian/control", "debian/changelog", "debian/rules", "src/azure-cli/setup.py"] {
            anyhow::ensure!(source_dir.join(f).is_file(), "missing {}", f);
        }
        let changelog = fs::read_to_string(source_dir.join("debian/changelog"))?;
        let parent = source_dir.parent().unwrap();
        fs::write(parent.join(&self.file_name), changelog.as_bytes())?;
        Ok(())
    }
}
