//! Staged file writes.
//!
//! Downloads and output artifacts are written to `<name>.part` first and
//! renamed into place only once complete (and, for downloads, verified), so
//! a final path never holds a partial or unverified file.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` (e.g. `az.tar.gz` -> `az.tar.gz.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for a `.part` file that becomes `final_path` on [`StagedFile::finalize`].
pub struct StagedFile {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl StagedFile {
    /// Create (or truncate) the temp file for `final_path`. A stale `.part` from an
    /// interrupted run is overwritten.
    pub fn create(final_path: &Path) -> Result<Self> {
        let temp_path = temp_path(final_path);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let file = File::create(&temp_path)
            .with_context(|| format!("create temp file {}", temp_path.display()))?;
        Ok(Self {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    /// Start over from an empty file (used between download attempts).
    pub fn reset(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.written = 0;
        Ok(())
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written since creation or the last reset.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush and fsync without renaming; the temp file can then be inspected (e.g. hashed).
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush().context("flush staged file")?;
        self.file.sync_all().context("sync staged file")?;
        Ok(())
    }

    /// Sync and atomically rename the temp file to its final path.
    pub fn finalize(mut self) -> Result<PathBuf> {
        self.sync()?;
        let StagedFile {
            file,
            temp_path,
            final_path,
            ..
        } = self;
        drop(file);
        fs::rename(&temp_path, &final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(final_path)
    }

    /// Remove the temp file. Used when a download fails or does not verify.
    pub fn discard(self) {
        let StagedFile { file, temp_path, .. } = self;
        drop(file);
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("could not remove {}: {}", temp_path.display(), e);
            }
        }
    }
}

/// Copy `src` to `dest` through a `.part` file so `dest` is never half-written.
pub fn copy_atomic(src: &Path, dest: &Path) -> Result<u64> {
    let mut input = File::open(src).with_context(|| format!("open {}", src.display()))?;
    let mut staged = StagedFile::create(dest)?;
    let n = io::copy(&mut input, &mut staged.file)
        .with_context(|| format!("copy {} to {}", src.display(), staged.temp_path.display()))?;
    staged.written = n;
    staged.finalize()?;
    Ok(n)
}
