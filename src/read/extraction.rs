//! Extraction to the filesystem.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;

use super::{EntryDescriptor, ExtractOptions, ExtractResult};
use crate::codec::{self, copy_entry};
use crate::format::{Intent, classify};
use crate::key::{self, KeySet};
use crate::progress::ProgressTracker;
use crate::{Error, Result};

/// Which entries an extraction writes.
pub(crate) enum Selection<'a> {
    All,
    Keys(&'a KeySet),
}

impl Selection<'_> {
    fn matches(&self, entry: &EntryDescriptor) -> bool {
        match self {
            Selection::All => true,
            Selection::Keys(keys) => keys.contains(entry.key.trim_end_matches('/')),
        }
    }
}

pub(crate) fn extract(
    path: &Path,
    dest: &Path,
    selection: Selection<'_>,
    options: &ExtractOptions,
) -> Result<ExtractResult> {
    let format = classify(path, Intent::Read)?;
    let mut reader = codec::open_reader(path, format)?;

    // Totals come from declared sizes, known before any data is decoded.
    let (total_entries, total_bytes) = reader
        .entries()?
        .iter()
        .filter(|e| selection.matches(e))
        .fold((0usize, 0u64), |(n, bytes), e| (n + 1, bytes + e.size));

    fs::create_dir_all(dest).map_err(|e| Error::destination(dest, e))?;
    log::debug!(
        "extracting {} entries ({} bytes) from '{}' to '{}'",
        total_entries,
        total_bytes,
        path.display(),
        dest.display()
    );

    let mut tracker = ProgressTracker::new(
        options.progress.as_ref(),
        options.cancel.as_ref(),
        total_entries,
        total_bytes,
    );
    let mut result = ExtractResult::default();
    let mut directory_times: Vec<(PathBuf, SystemTime)> = Vec::new();

    reader.visit(&mut |entry, data| {
        if !selection.matches(entry) {
            return Ok(());
        }
        tracker.check_cancelled()?;
        let target = key::safe_join(dest, &entry.key)?;

        let written = if entry.is_directory {
            fs::create_dir_all(&target).map_err(|e| Error::destination(&target, e))?;
            if let Some(modified) = entry.modified {
                directory_times.push((target, modified));
            }
            result.directories_created += 1;
            0
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::destination(parent, e))?;
            }
            let written = write_file(&target, &entry.key, data)?;
            if options.preserve_mtime {
                if let Some(modified) = entry.modified {
                    set_mtime(&target, modified);
                }
            }
            result.entries_extracted += 1;
            result.bytes_extracted += written;
            written
        };

        tracker.entry_done(&entry.key, written);
        Ok(())
    })?;

    // Directory times last, since writing files into them bumps the mtime.
    if options.preserve_mtime {
        for (dir, modified) in directory_times {
            set_mtime(&dir, modified);
        }
    }
    Ok(result)
}

fn write_file(target: &Path, key: &str, data: &mut dyn std::io::Read) -> Result<u64> {
    let file = File::create(target).map_err(|e| Error::destination(target, e))?;
    let mut out = BufWriter::new(file);
    let written = copy_entry(data, &mut out).map_err(|e| e.into_error(key, target))?;
    out.flush().map_err(|e| Error::destination(target, e))?;
    Ok(written)
}

fn set_mtime(path: &Path, modified: SystemTime) {
    if let Err(e) = filetime::set_file_mtime(path, FileTime::from_system_time(modified)) {
        log::warn!(
            "failed to set modification time on '{}': {}",
            path.display(),
            e
        );
    }
}
