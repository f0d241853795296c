//! Mutation options and results.

use std::sync::Arc;

use crate::progress::{CancellationFlag, ProgressSink};
use crate::write::CompressionLevel;

/// Options for [`add_or_replace`](super::add_or_replace) and
/// [`delete_entries`](super::delete_entries).
#[derive(Clone, Default)]
pub struct MutateOptions {
    /// Compression level for every entry of the rebuilt archive.
    pub level: CompressionLevel,
    /// Append new zip entries to the existing file instead of rebuilding it,
    /// when none of them replaces an existing entry.
    ///
    /// Existing entries are copied byte for byte instead of being
    /// recompressed. The append runs on a staged copy, so the archive is
    /// only replaced once it succeeds. Off by default.
    pub in_place_append: bool,
    /// Progress sink, notified once per written entry.
    pub progress: Option<Arc<dyn ProgressSink>>,
    /// Cancellation flag, checked before each entry.
    pub cancel: Option<CancellationFlag>,
}

impl std::fmt::Debug for MutateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutateOptions")
            .field("level", &self.level)
            .field("in_place_append", &self.in_place_append)
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl MutateOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Enables or disables the zip in-place append path.
    pub fn in_place_append(mut self, enabled: bool) -> Self {
        self.in_place_append = enabled;
        self
    }

    /// Sets the progress sink.
    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Sets the cancellation flag.
    pub fn cancel(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Result of a mutation.
#[must_use = "mutation results should be checked"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationResult {
    /// Existing entries carried over into the new archive.
    pub entries_kept: usize,
    /// Existing entries dropped, either deleted or replaced.
    pub entries_removed: usize,
    /// Entries written from the sources.
    pub entries_added: usize,
    /// Uncompressed bytes written, kept entries included.
    pub bytes_written: u64,
    /// True when new entries were appended after the existing ones instead
    /// of rebuilding every entry.
    pub in_place: bool,
}

impl MutationResult {
    /// Result of a mutation that had nothing to do.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Returns true if the archive on disk was not touched.
    pub fn is_unchanged(&self) -> bool {
        self.entries_removed == 0 && self.entries_added == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MutateOptions::new();
        assert!(!options.in_place_append);
        assert_eq!(options.level, CompressionLevel::Normal);
    }

    #[test]
    fn test_unchanged() {
        assert!(MutationResult::unchanged().is_unchanged());
        let result = MutationResult {
            entries_removed: 1,
            ..Default::default()
        };
        assert!(!result.is_unchanged());
    }
}
