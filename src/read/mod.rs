//! Reading API: listing, extraction and integrity testing.
//!
//! Every function here takes an archive path, classifies it by name, opens a
//! reader for the resolved format and drops it before returning. Nothing is
//! cached between calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use arcmill::read::{self, ExtractOptions};
//!
//! for entry in read::list("backup.tar.gz")? {
//!     println!("{:>10} {}", entry.size, entry.key);
//! }
//!
//! read::extract_subset(
//!     "backup.tar.gz",
//!     &["docs/readme.md"],
//!     "./restore",
//!     &ExtractOptions::default(),
//! )?;
//!
//! assert!(read::test("backup.tar.gz"));
//! # Ok::<(), arcmill::Error>(())
//! ```

mod entry;
mod extraction;
mod info;
mod options;

pub use entry::{EntryDescriptor, listing_order};
pub use info::{ArchiveInfo, ExtractResult, TestResult};
pub use options::ExtractOptions;

use std::path::Path;

use crate::Result;
use crate::codec;
use crate::format::{Intent, classify};
use crate::key::KeySet;

use extraction::Selection;

/// Lists the entries of an archive.
///
/// Directories come first, then every other entry ordered by key,
/// case-insensitively with an ordinal tie-break.
pub fn list(path: impl AsRef<Path>) -> Result<Vec<EntryDescriptor>> {
    let path = path.as_ref();
    let format = classify(path, Intent::Read)?;
    let mut entries = codec::open_reader(path, format)?.entries()?;
    entries.sort_by(listing_order);
    Ok(entries)
}

/// Returns summary information about an archive.
pub fn info(path: impl AsRef<Path>) -> Result<ArchiveInfo> {
    let path = path.as_ref();
    let format = classify(path, Intent::Read)?;
    let entries = codec::open_reader(path, format)?.entries()?;

    let mut info = ArchiveInfo {
        format,
        entry_count: entries.len(),
        directory_count: 0,
        total_size: 0,
        packed_size: 0,
        has_encrypted_entries: false,
    };
    for entry in &entries {
        if entry.is_directory {
            info.directory_count += 1;
        } else {
            info.total_size += entry.size;
            info.packed_size += entry.compressed_size;
        }
        info.has_encrypted_entries |= entry.is_encrypted;
    }
    Ok(info)
}

/// Extracts every entry into `dest`.
///
/// Relative paths are preserved and existing files are overwritten.
/// Directory entries become directories. An entry whose key would land
/// outside `dest` fails the extraction with
/// [`Error::PathTraversal`](crate::Error::PathTraversal).
pub fn extract_all(
    path: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractResult> {
    extraction::extract(path.as_ref(), dest.as_ref(), Selection::All, options)
}

/// Extracts only the entries whose keys are listed.
///
/// Requested keys are normalized and matched case-insensitively; keys with
/// no matching entry are ignored.
pub fn extract_subset<S: AsRef<str>>(
    path: impl AsRef<Path>,
    keys: &[S],
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractResult> {
    let wanted: KeySet = keys
        .iter()
        .map(|k| k.as_ref().trim_end_matches(['/', '\\']))
        .collect();
    extraction::extract(
        path.as_ref(),
        dest.as_ref(),
        Selection::Keys(&wanted),
        options,
    )
}

/// Tests an archive for integrity.
///
/// Decodes every file entry, checking stored CRC-32 values. Returns `false`
/// on the first failure of any kind, including failure to open the archive.
pub fn test(path: impl AsRef<Path>) -> bool {
    archive_test::test(path.as_ref())
}

/// Tests every entry and reports each failure instead of stopping at the
/// first one.
pub fn test_detailed(path: impl AsRef<Path>) -> TestResult {
    archive_test::test_detailed(path.as_ref())
}
