//! Rebuild-and-swap.

use std::path::Path;

use super::plan::MutationPlan;
use crate::codec;
use crate::progress::ProgressTracker;
use crate::staging::StagingFile;
use crate::write::{CompressionLevel, output_key, write_additions};
use crate::{Error, Result};

/// Rewrites `path` according to `plan` and swaps the result into place.
///
/// Kept entries are streamed from the current archive under their original
/// keys, directories included, then the additions are written from their
/// sources. Everything goes
/// to `<path>.tmp`; any failure, cancellation included, removes it and
/// leaves `path` untouched. Returns the bytes written.
pub(crate) fn rebuild(
    path: &Path,
    plan: &MutationPlan,
    level: CompressionLevel,
    tracker: &mut ProgressTracker<'_>,
) -> Result<u64> {
    let staging = StagingFile::new(path);
    let bytes_written = {
        let mut reader = codec::open_reader(path, plan.format)?;
        let file = staging.create()?;
        let mut writer = codec::open_writer(file, staging.path(), plan.format, level)?;

        let mut ordinal = 0usize;
        let mut bytes_written = 0u64;
        let mut planned = plan.kept.iter();
        reader.visit(&mut |entry, data| {
            if !plan.keeps(&entry.key) {
                return Ok(());
            }
            if planned.next().is_none_or(|p| p.key != entry.key) {
                return Err(Error::codec(
                    plan.format,
                    format!("'{}' changed while it was being rebuilt", path.display()),
                ));
            }
            tracker.check_cancelled()?;
            ordinal += 1;
            let key = output_key(&entry.key, ordinal);
            let written = if entry.is_directory {
                writer.add_directory(key.trim_end_matches('/'), entry.modified)?;
                0
            } else {
                writer.add_entry(&key, entry.size, entry.modified, data)?
            };
            bytes_written += written;
            tracker.entry_done(&key, written);
            Ok(())
        })?;

        bytes_written += write_additions(writer.as_mut(), &plan.additions, ordinal, tracker)?;
        writer.finish()?;
        bytes_written
    };

    staging.commit()?;
    Ok(bytes_written)
}
