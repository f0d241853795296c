//! Copying and moving entries between archives.
//!
//! A transfer runs in two phases. The requested entries are first read from
//! the source into memory; an entry that cannot be read becomes a warning
//! and the rest carry on. The destination is then created, or rebuilt
//! through its staging file, with the copied entries merged in under the
//! collision policy of [`TransferOptions`].
//!
//! Source and destination may be of different formats. Both are classified
//! before anything is read, so an unknown source suffix or a read-only
//! destination fails without I/O.
//!
//! # Example
//!
//! ```rust,no_run
//! use arcmill::transfer::{self, TransferOptions};
//!
//! let options = TransferOptions::new().dest_prefix("imported");
//! let result = transfer::copy_entries("legacy.lzh", "current.zip", &["manual.txt"], &options)?;
//! if result.is_partial() {
//!     for warning in &result.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//! }
//! # Ok::<(), arcmill::Error>(())
//! ```

mod options;

pub use options::{CopyResult, TransferOptions};

use std::collections::HashMap;
use std::path::Path;
use std::time::{Instant, SystemTime};

use crate::Result;
use crate::codec::{self, CopyError, copy_entry};
use crate::format::{ArchiveFormat, Intent, classify, classify_for_write};
use crate::key::{KeySet, fold_key, keys_equal, normalize_key, strip_prefix_ignore_case};
use crate::mutate::{self, MutateOptions, MutationPlan};
use crate::progress::ProgressTracker;
use crate::write::{self, PlannedAddition, check_entry_count};

/// Copies entries from `source` into `dest`.
///
/// Each requested key is matched against the source ignoring case. The
/// destination key is the source key with
/// [`source_prefix`](TransferOptions::source_prefix) removed and
/// [`dest_prefix`](TransferOptions::dest_prefix) prepended. When `dest`
/// does not exist it is created from the copied entries. When nothing ends
/// up being written `dest` is left untouched.
pub fn copy_entries<S: AsRef<str>>(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    keys: &[S],
    options: &TransferOptions,
) -> Result<CopyResult> {
    let start = Instant::now();
    let outcome = transfer(source.as_ref(), dest.as_ref(), keys, options)?;
    let mut result = outcome.result;
    result.elapsed = start.elapsed();
    Ok(result)
}

/// Moves entries from `source` into `dest`.
///
/// Runs [`copy_entries`], then deletes from the source every entry that now
/// exists in the destination: the copied ones and the ones skipped as
/// identical. Entries skipped for any other reason stay in the source: those
/// that collided with a destination entry without
/// [`overwrite_existing`](TransferOptions::overwrite_existing), and those
/// shadowed by a later source entry mapping to the same destination key.
///
/// Formats that cannot delete entries keep the source intact; the result
/// then has [`source_retained`](CopyResult::source_retained) set and a
/// warning.
pub fn move_entries<S: AsRef<str>>(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    keys: &[S],
    options: &TransferOptions,
) -> Result<CopyResult> {
    let start = Instant::now();
    let source = source.as_ref();
    let outcome = transfer(source, dest.as_ref(), keys, options)?;
    let mut result = outcome.result;

    if result.success && !outcome.moved.is_empty() {
        if outcome.source_format.supports_deletion() {
            let delete_options = MutateOptions {
                level: options.level,
                in_place_append: false,
                progress: None,
                cancel: options.cancel.clone(),
            };
            if let Err(e) = mutate::delete_entries(source, &outcome.moved, &delete_options) {
                result.source_retained = true;
                result.warn(format!(
                    "entries were copied but not removed from '{}': {}",
                    source.display(),
                    e
                ));
            }
        } else {
            result.source_retained = true;
            result.warn(format!(
                "{} archives cannot delete entries, '{}' was left intact",
                outcome.source_format,
                source.display()
            ));
        }
    }

    result.elapsed = start.elapsed();
    Ok(result)
}

/// One entry read from the source.
struct CopiedEntry {
    source_key: String,
    data: Vec<u8>,
    modified: Option<SystemTime>,
}

struct Outcome {
    result: CopyResult,
    /// Source keys that now exist in the destination.
    moved: Vec<String>,
    source_format: ArchiveFormat,
}

/// Maps a source key onto its destination key.
fn map_key(key: &str, source_prefix: &str, dest_prefix: &str) -> String {
    let rest = strip_prefix_ignore_case(key, source_prefix).unwrap_or_else(|| normalize_key(key));
    let prefix = normalize_key(dest_prefix);
    let prefix = prefix.trim_end_matches('/');
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, rest),
    }
}

fn transfer<S: AsRef<str>>(
    source: &Path,
    dest: &Path,
    keys: &[S],
    options: &TransferOptions,
) -> Result<Outcome> {
    let source_format = classify(source, Intent::Read)?;
    let dest_format = classify_for_write(dest)?;
    let mut result = CopyResult::default();

    let wanted: KeySet = keys
        .iter()
        .map(|k| k.as_ref().trim_end_matches(['/', '\\']))
        .collect();
    let (copied, failures) = read_requested(source, source_format, &wanted, options, &mut result)?;

    let mut missing = 0usize;
    let mut reported = KeySet::new();
    for key in keys {
        let key = key.as_ref().trim_end_matches(['/', '\\']);
        let seen = failures.contains(key) || copied.iter().any(|c| keys_equal(&c.source_key, key));
        if !seen && reported.insert(key) {
            missing += 1;
            result.warn(format!("'{}' not found in '{}'", key, source.display()));
        }
    }

    let dest_exists = dest.exists();
    let existing: HashMap<String, u64> = if dest_exists {
        codec::open_reader(dest, dest_format)?
            .entries()?
            .into_iter()
            .filter(|e| !e.is_directory)
            .map(|e| (fold_key(&e.key), e.size))
            .collect()
    } else {
        HashMap::new()
    };

    // Several source keys can map onto one destination key; the last wins.
    let mut mapped: Vec<(String, CopiedEntry)> = Vec::with_capacity(copied.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for entry in copied {
        let dest_key = map_key(&entry.source_key, &options.source_prefix, &options.dest_prefix);
        let folded = fold_key(&dest_key);
        match positions.get(&folded) {
            Some(&index) => {
                result.skipped += 1;
                result.warn(format!(
                    "'{}' and '{}' both map to '{}', keeping '{}'",
                    mapped[index].1.source_key, entry.source_key, dest_key, entry.source_key
                ));
                mapped[index] = (dest_key, entry);
            }
            None => {
                positions.insert(folded, mapped.len());
                mapped.push((dest_key, entry));
            }
        }
    }

    let mut additions = Vec::new();
    let mut replaced = KeySet::new();
    let mut moved = Vec::new();
    for (dest_key, entry) in mapped {
        match existing.get(&fold_key(&dest_key)) {
            Some(&size) if options.skip_identical && size == entry.data.len() as u64 => {
                log::debug!("'{}' is identical in the destination, skipped", dest_key);
                result.skipped += 1;
                moved.push(entry.source_key);
                continue;
            }
            Some(_) if options.overwrite_existing => {
                replaced.insert(&dest_key);
            }
            Some(_) => {
                result.skipped += 1;
                result.warn(format!(
                    "'{}' already exists in '{}', skipped",
                    dest_key,
                    dest.display()
                ));
                continue;
            }
            None => {}
        }
        result.copied += 1;
        result.bytes_copied += entry.data.len() as u64;
        moved.push(entry.source_key);
        additions.push(PlannedAddition::from_bytes(dest_key, entry.data, entry.modified));
    }

    let attempted = result.copied + result.skipped;
    result.success = attempted > 0 || (failures.is_empty() && missing == 0);

    if additions.is_empty() {
        log::debug!("nothing to write, '{}' left untouched", dest.display());
        return Ok(Outcome {
            result,
            moved,
            source_format,
        });
    }

    if !dest_exists {
        check_entry_count(dest_format, additions.len())?;
        let total_bytes = additions.iter().map(|a| a.size).sum();
        let mut tracker = ProgressTracker::new(
            options.progress.as_ref(),
            options.cancel.as_ref(),
            additions.len(),
            total_bytes,
        );
        write::write_new(dest, dest_format, options.level, &additions, &mut tracker)?;
    } else {
        let plan = MutationPlan::build(dest, replaced, additions)?;
        let mut tracker = ProgressTracker::new(
            options.progress.as_ref(),
            options.cancel.as_ref(),
            plan.total_entries,
            plan.total_bytes,
        );
        mutate::rebuild(dest, &plan, options.level, &mut tracker)?;
    }

    log::debug!(
        "copied {} entries from '{}' to '{}' ({} skipped)",
        result.copied,
        source.display(),
        dest.display(),
        result.skipped
    );
    Ok(Outcome {
        result,
        moved,
        source_format,
    })
}

/// Reads every requested file entry of `source` into memory.
///
/// Returns the entries read and the keys that failed to read. A key present
/// more than once keeps its last occurrence.
fn read_requested(
    source: &Path,
    format: ArchiveFormat,
    wanted: &KeySet,
    options: &TransferOptions,
    result: &mut CopyResult,
) -> Result<(Vec<CopiedEntry>, KeySet)> {
    let mut copied: Vec<CopiedEntry> = Vec::new();
    let mut failures = KeySet::new();
    if wanted.is_empty() {
        return Ok((copied, failures));
    }

    let mut reader = codec::open_reader(source, format)?;
    reader.visit(&mut |entry, data| {
        if entry.is_directory || !wanted.contains(&entry.key) {
            return Ok(());
        }
        if let Some(flag) = &options.cancel {
            flag.check()?;
        }

        let mut buf = Vec::with_capacity(entry.size.min(codec::MAX_PREALLOC) as usize);
        match copy_entry(data, &mut buf) {
            Ok(_) => {
                copied.retain(|c| !keys_equal(&c.source_key, &entry.key));
                copied.push(CopiedEntry {
                    source_key: entry.key.clone(),
                    data: buf,
                    modified: entry.modified,
                });
            }
            Err(CopyError::Read(e) | CopyError::Write(e)) => {
                failures.insert(&entry.key);
                result.warn(format!("failed to read '{}': {}", entry.key, e));
            }
        }
        Ok(())
    })?;
    Ok((copied, failures))
}
