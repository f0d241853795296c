//! Staging files for rebuild-and-swap.
//!
//! Every write that replaces an archive goes through a [`StagingFile`] at
//! `<path>.tmp` beside the target. The staging file is removed when the guard
//! is dropped without being committed, so an error or cancellation anywhere
//! in the rebuild leaves the target exactly as it was.
//!
//! Committing deletes the original and renames the staging file onto it.
//! A crash between those two steps leaves only `<path>.tmp`; callers can
//! detect that state with [`stale_temp`]. Leftover staging files are never
//! cleaned up automatically.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Returns the staging path for `target`: the same path with `.tmp` appended.
pub fn temp_path(target: impl AsRef<Path>) -> PathBuf {
    let mut name = OsString::from(target.as_ref().as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Returns the staging file left behind by an interrupted write, if any.
pub fn stale_temp(target: impl AsRef<Path>) -> Option<PathBuf> {
    let temp = temp_path(target);
    temp.is_file().then_some(temp)
}

/// Scoped guard over `<target>.tmp`.
#[derive(Debug)]
pub(crate) struct StagingFile {
    target: PathBuf,
    temp: PathBuf,
    committed: bool,
}

impl StagingFile {
    pub(crate) fn new(target: &Path) -> Self {
        Self {
            target: target.to_path_buf(),
            temp: temp_path(target),
            committed: false,
        }
    }

    /// Path of the staging file.
    pub(crate) fn path(&self) -> &Path {
        &self.temp
    }

    /// Creates (or truncates) the staging file.
    pub(crate) fn create(&self) -> Result<File> {
        File::create(&self.temp).map_err(|e| Error::destination(&self.temp, e))
    }

    /// Fills the staging file with a copy of the target, for writers that
    /// extend an existing archive.
    pub(crate) fn copy_target(&self) -> Result<()> {
        fs::copy(&self.target, &self.temp).map_err(|e| Error::destination(&self.temp, e))?;
        Ok(())
    }

    /// Replaces the target with the staging file.
    pub(crate) fn commit(mut self) -> Result<()> {
        match fs::remove_file(&self.target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::destination(&self.target, e)),
        }
        fs::rename(&self.temp, &self.target).map_err(|e| Error::destination(&self.target, e))?;
        self.committed = true;
        log::debug!("committed '{}'", self.target.display());
        Ok(())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.temp) {
            Ok(()) => log::debug!("discarded staging file '{}'", self.temp.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "failed to remove staging file '{}': {}",
                self.temp.display(),
                e
            ),
        }
    }
}
