//! Archive creation.
//!
//! [`create`] builds a new archive from files and directories on disk. The
//! format comes from [`CreateOptions::format`] or, when unset, from the
//! archive path (an unknown suffix writes a zip). The archive is written to
//! `<path>.tmp` and moved into place only once it is complete.
//!
//! # Example
//!
//! ```rust,no_run
//! use arcmill::write::{self, CompressionLevel, CreateOptions};
//!
//! let result = write::create(
//!     "site.tar.xz",
//!     &["public", "README.md"],
//!     &CreateOptions::new().level(CompressionLevel::Maximum),
//! )?;
//! println!("{} entries, {} bytes", result.entries_written, result.bytes_written);
//! # Ok::<(), arcmill::Error>(())
//! ```

mod level;
mod options;
mod sources;

pub use level::CompressionLevel;
pub use options::{CreateOptions, WriteResult};

pub(crate) use sources::{PlannedAddition, collect_sources, output_key};

use sources::write_addition;

use std::path::Path;

use crate::codec::{self, ContainerWriter};
use crate::format::{ArchiveFamily, ArchiveFormat, classify_for_write};
use crate::progress::ProgressTracker;
use crate::staging::StagingFile;
use crate::{Error, Result};

/// Creates an archive at `path` from `sources`.
///
/// Each source is a file or a directory. A file is stored under its file
/// name; a directory is walked recursively and its entries are keyed
/// relative to the directory's parent. Entries are written in walk order.
/// Empty directories become directory entries when the format holds them.
///
/// An existing file at `path` is replaced. Single-stream formats (`.gz`,
/// `.bz2`, `.xz`) take exactly one file and fail with
/// [`Error::TooManyEntries`] otherwise, before anything is written.
pub fn create<P: AsRef<Path>>(
    path: impl AsRef<Path>,
    sources: &[P],
    options: &CreateOptions,
) -> Result<WriteResult> {
    let path = path.as_ref();
    let format = match options.format {
        Some(format) if !format.is_writable() => return Err(Error::ReadOnlyFormat { format }),
        Some(format) => format,
        None => classify_for_write(path)?,
    };

    let mut additions = collect_sources(sources)?;
    if !format.holds_directories() {
        additions.retain(|a| !a.is_directory());
    }
    check_entry_count(format, additions.len())?;

    let total_bytes = additions.iter().map(|a| a.size).sum();
    let mut tracker = ProgressTracker::new(
        options.progress.as_ref(),
        options.cancel.as_ref(),
        additions.len(),
        total_bytes,
    );
    log::debug!(
        "creating {} archive '{}' with {} entries",
        format,
        path.display(),
        additions.len()
    );
    let bytes_written = write_new(path, format, options.level, &additions, &mut tracker)?;

    Ok(WriteResult {
        entries_written: tracker.entries_processed(),
        bytes_written,
    })
}

/// Rejects entry counts a single-stream format cannot hold.
pub(crate) fn check_entry_count(format: ArchiveFormat, count: usize) -> Result<()> {
    if format.family() == ArchiveFamily::SingleStream && count != 1 {
        return Err(Error::TooManyEntries { format, count });
    }
    Ok(())
}

/// Writes `additions` into a fresh archive staged beside `path`, then
/// commits it. Returns the bytes written.
pub(crate) fn write_new(
    path: &Path,
    format: ArchiveFormat,
    level: CompressionLevel,
    additions: &[PlannedAddition],
    tracker: &mut ProgressTracker<'_>,
) -> Result<u64> {
    let staging = StagingFile::new(path);
    let file = staging.create()?;
    let mut writer = codec::open_writer(file, staging.path(), format, level)?;

    let bytes_written = write_additions(writer.as_mut(), additions, 0, tracker)?;
    writer.finish()?;
    staging.commit()?;
    Ok(bytes_written)
}

/// Writes `additions` after `ordinal` entries already in the output,
/// checking for cancellation before each one.
pub(crate) fn write_additions(
    writer: &mut dyn ContainerWriter,
    additions: &[PlannedAddition],
    ordinal: usize,
    tracker: &mut ProgressTracker<'_>,
) -> Result<u64> {
    let mut bytes_written = 0u64;
    for (index, addition) in additions.iter().enumerate() {
        tracker.check_cancelled()?;
        let key = output_key(&addition.key, ordinal + index + 1);
        let written = write_addition(writer, addition, &key)?;
        bytes_written += written;
        tracker.entry_done(&key, written);
    }
    Ok(bytes_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Compression;
    use crate::progress::{CancellationFlag, RecordingProgress};
    use std::fs;

    #[test]
    fn test_create_zip_reports_totals() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"hello").unwrap();
        let archive = dir.path().join("out.zip");

        let progress = RecordingProgress::shared();
        let options = CreateOptions::new().progress(progress.clone());
        let result = create(&archive, &[&src], &options).unwrap();

        assert_eq!(result.entries_written, 1);
        assert_eq!(result.bytes_written, 5);
        assert!(archive.exists());
        assert!(!crate::staging::temp_path(&archive).exists());

        let last = progress.last().unwrap();
        assert_eq!(last.entries_processed, 1);
        assert_eq!(last.total_bytes, 5);
    }

    #[test]
    fn test_stream_rejects_two_files_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();
        let archive = dir.path().join("out.gz");

        let err = create(&archive, &[&a, &b], &CreateOptions::new()).unwrap_err();
        assert!(matches!(err, Error::TooManyEntries { count: 2, .. }));
        assert!(!archive.exists());
        assert!(!crate::staging::temp_path(&archive).exists());
    }

    #[test]
    fn test_explicit_read_only_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = create(
            dir.path().join("x.bin"),
            &[dir.path()],
            &CreateOptions::new().format(ArchiveFormat::Cab),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ReadOnlyFormat { .. }));
    }

    #[test]
    fn test_explicit_format_overrides_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"abc").unwrap();
        let archive = dir.path().join("blob.bin");

        let options = CreateOptions::new().format(ArchiveFormat::Tar(Compression::Gzip));
        create(&archive, &[&src], &options).unwrap();

        let entries = codec::open_reader(&archive, ArchiveFormat::Tar(Compression::Gzip))
            .unwrap()
            .entries()
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "a.txt");
    }

    #[test]
    fn test_cancelled_create_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"abc").unwrap();
        let archive = dir.path().join("out.tar");

        let flag = CancellationFlag::new();
        flag.cancel();
        let err = create(&archive, &[&src], &CreateOptions::new().cancel(flag)).unwrap_err();
        assert!(err.is_cancelled());
        assert!(!archive.exists());
        assert!(!crate::staging::temp_path(&archive).exists());
    }
}
