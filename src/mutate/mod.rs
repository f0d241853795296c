//! In-place archive modification.
//!
//! Archives are never edited where they lie. A mutation plans which file
//! entries survive, writes a complete new archive to `<path>.tmp` and swaps
//! it in by deleting the original and renaming the staging file. Until the
//! swap the original is untouched; a failed or cancelled mutation removes
//! the staging file and returns the error.
//!
//! Directory entries are carried over like file entries. Additions are files
//! only; empty source directories are not added to an existing archive.
//!
//! The swap is two filesystem operations. A crash between them leaves only
//! `<path>.tmp`, which [`staging::stale_temp`](crate::staging::stale_temp)
//! reports.
//!
//! # Example
//!
//! ```rust,no_run
//! use arcmill::mutate::{self, MutateOptions};
//!
//! let options = MutateOptions::new();
//! mutate::add_or_replace("bundle.zip", &["notes.txt"], &options)?;
//! mutate::delete_entries("bundle.zip", &["old/readme.md"], &options)?;
//! # Ok::<(), arcmill::Error>(())
//! ```

mod engine;
mod options;
mod plan;

pub use options::{MutateOptions, MutationResult};

pub(crate) use engine::rebuild;
pub(crate) use plan::MutationPlan;

use std::io;
use std::path::Path;

use crate::codec;
use crate::format::{ArchiveFormat, classify_for_write};
use crate::key::KeySet;
use crate::progress::ProgressTracker;
use crate::staging::StagingFile;
use crate::write::{self, CreateOptions, PlannedAddition, collect_sources, write_additions};
use crate::{Error, Result};

/// Adds files and directories to an archive, replacing entries with the
/// same key.
///
/// Sources are collected the way [`write::create`] collects them. Existing
/// entries whose key matches an addition (ignoring case) are dropped. When
/// `path` does not exist the archive is created.
///
/// With [`MutateOptions::in_place_append`] set, a zip archive whose entries
/// none of the additions replace is extended instead of rebuilt. Both paths
/// produce the same entries.
pub fn add_or_replace<P: AsRef<Path>>(
    path: impl AsRef<Path>,
    sources: &[P],
    options: &MutateOptions,
) -> Result<MutationResult> {
    let path = path.as_ref();
    let format = classify_for_write(path)?;

    if !path.exists() {
        log::debug!("'{}' does not exist, creating it", path.display());
        let create_options = CreateOptions {
            format: None,
            level: options.level,
            progress: options.progress.clone(),
            cancel: options.cancel.clone(),
        };
        let created = write::create(path, sources, &create_options)?;
        return Ok(MutationResult {
            entries_added: created.entries_written,
            bytes_written: created.bytes_written,
            ..MutationResult::default()
        });
    }

    let mut additions = collect_sources(sources)?;
    additions.retain(|a| !a.is_directory());

    if options.in_place_append && format == ArchiveFormat::Zip {
        if let Some(result) = try_append(path, &additions, options)? {
            return Ok(result);
        }
    }

    let replaced: KeySet = additions.iter().map(|a| a.key.as_str()).collect();
    let plan = MutationPlan::build(path, replaced, additions)?;
    run(path, &plan, options)
}

/// Removes the entries with the given keys.
///
/// Keys are normalized and matched ignoring case; keys with no matching
/// entry are ignored. An empty key list, or one that matches nothing,
/// leaves the archive untouched.
pub fn delete_entries<S: AsRef<str>>(
    path: impl AsRef<Path>,
    keys: &[S],
    options: &MutateOptions,
) -> Result<MutationResult> {
    let path = path.as_ref();
    if keys.is_empty() {
        return Ok(MutationResult::unchanged());
    }
    if !path.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("archive '{}' not found", path.display()),
        )));
    }

    let dropped: KeySet = keys
        .iter()
        .map(|k| k.as_ref().trim_end_matches(['/', '\\']))
        .collect();
    let plan = MutationPlan::build(path, dropped, Vec::new())?;
    if plan.removed == 0 {
        log::debug!("no entries of '{}' match, nothing to delete", path.display());
        return Ok(MutationResult {
            entries_kept: plan.kept.len(),
            ..MutationResult::unchanged()
        });
    }
    run(path, &plan, options)
}

fn run(path: &Path, plan: &MutationPlan, options: &MutateOptions) -> Result<MutationResult> {
    let mut tracker = ProgressTracker::new(
        options.progress.as_ref(),
        options.cancel.as_ref(),
        plan.total_entries,
        plan.total_bytes,
    );
    let bytes_written = rebuild(path, plan, options.level, &mut tracker)?;
    Ok(MutationResult {
        entries_kept: plan.kept.len(),
        entries_removed: plan.removed,
        entries_added: plan.additions.len(),
        bytes_written,
        in_place: false,
    })
}

/// Appends to a copy of a zip when no addition collides with an existing
/// entry, then swaps the copy in. Returns `None` when a rebuild is needed.
fn try_append(
    path: &Path,
    additions: &[PlannedAddition],
    options: &MutateOptions,
) -> Result<Option<MutationResult>> {
    let entries = codec::open_reader(path, ArchiveFormat::Zip)?.entries()?;
    let existing: KeySet = entries
        .iter()
        .map(|e| e.key.trim_end_matches('/'))
        .collect();
    if additions.iter().any(|a| existing.contains(&a.key)) {
        log::debug!("additions replace existing entries, rebuilding instead of appending");
        return Ok(None);
    }

    let total_bytes = additions.iter().map(|a| a.size).sum();
    let mut tracker = ProgressTracker::new(
        options.progress.as_ref(),
        options.cancel.as_ref(),
        additions.len(),
        total_bytes,
    );
    tracker.check_cancelled()?;

    let staging = StagingFile::new(path);
    staging.copy_target()?;
    let bytes_written = {
        let mut writer = codec::open_zip_appender(staging.path(), options.level)?;
        let written = write_additions(writer.as_mut(), additions, entries.len(), &mut tracker)?;
        writer.finish()?;
        written
    };
    staging.commit()?;

    log::debug!(
        "appended {} entries to '{}'",
        additions.len(),
        path.display()
    );
    Ok(Some(MutationResult {
        entries_kept: entries.len(),
        entries_removed: 0,
        entries_added: additions.len(),
        bytes_written,
        in_place: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read;
    use std::fs;

    fn keys(path: &Path) -> Vec<String> {
        read::list(path)
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect()
    }

    #[test]
    fn test_add_creates_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"abc").unwrap();
        let archive = dir.path().join("new.tar");

        let result = add_or_replace(&archive, &[&src], &MutateOptions::new()).unwrap();
        assert_eq!(result.entries_added, 1);
        assert!(!result.in_place);
        assert_eq!(keys(&archive), vec!["a.txt"]);
    }

    #[test]
    fn test_add_replaces_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("A.TXT");
        fs::write(&first, b"old").unwrap();
        let archive = dir.path().join("x.zip");
        write::create(&archive, &[&first], &CreateOptions::new()).unwrap();

        let sub = dir.path().join("new");
        fs::create_dir_all(&sub).unwrap();
        let second = sub.join("a.txt");
        fs::write(&second, b"newer").unwrap();

        let result = add_or_replace(&archive, &[&second], &MutateOptions::new()).unwrap();
        assert_eq!(result.entries_removed, 1);
        assert_eq!(result.entries_added, 1);
        assert_eq!(result.entries_kept, 0);
        assert_eq!(keys(&archive), vec!["a.txt"]);
    }

    #[test]
    fn test_in_place_append() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();
        let archive = dir.path().join("x.zip");
        write::create(&archive, &[&a], &CreateOptions::new()).unwrap();

        let options = MutateOptions::new().in_place_append(true);
        let result = add_or_replace(&archive, &[&b], &options).unwrap();
        assert!(result.in_place);
        assert_eq!(result.entries_kept, 1);
        assert_eq!(keys(&archive), vec!["a.txt", "b.txt"]);
        assert!(read::test(&archive));

        // A collision falls back to the rebuild.
        let result = add_or_replace(&archive, &[&b], &options).unwrap();
        assert!(!result.in_place);
        assert_eq!(keys(&archive), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_delete_empty_set_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let none: [&str; 0] = [];
        let result = delete_entries(dir.path().join("missing.zip"), &none, &MutateOptions::new())
            .unwrap();
        assert!(result.is_unchanged());
    }

    #[test]
    fn test_delete_from_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let err = delete_entries(dir.path().join("missing.zip"), &["a"], &MutateOptions::new())
            .unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delete_read_only_format() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("old.lzh");
        fs::write(&archive, b"not really lzh").unwrap();
        let err = delete_entries(&archive, &["a"], &MutateOptions::new()).unwrap_err();
        assert!(matches!(err, Error::ReadOnlyFormat { .. }));
        assert!(!crate::staging::temp_path(&archive).exists());
    }
}
