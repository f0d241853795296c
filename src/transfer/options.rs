//! Transfer options and results.

use std::sync::Arc;
use std::time::Duration;

use crate::progress::{CancellationFlag, ProgressSink};
use crate::write::CompressionLevel;

/// Options for [`copy_entries`](super::copy_entries) and
/// [`move_entries`](super::move_entries).
///
/// # Example
///
/// ```rust
/// use arcmill::transfer::TransferOptions;
///
/// // Copy "assets/img/*" to "static/img/*", replacing changed entries.
/// let options = TransferOptions::new()
///     .source_prefix("assets")
///     .dest_prefix("static")
///     .overwrite_existing(true);
/// assert!(options.skip_identical);
/// ```
#[derive(Clone)]
pub struct TransferOptions {
    /// Prefix removed from source keys, ignoring case.
    pub source_prefix: String,
    /// Prefix prepended to destination keys.
    pub dest_prefix: String,
    /// Skip a colliding entry when the destination copy has the same size.
    pub skip_identical: bool,
    /// Replace colliding entries that are not skipped as identical.
    pub overwrite_existing: bool,
    /// Compression level for the destination archive.
    pub level: CompressionLevel,
    /// Progress sink, notified once per entry written to the destination.
    pub progress: Option<Arc<dyn ProgressSink>>,
    /// Cancellation flag, checked before each entry.
    pub cancel: Option<CancellationFlag>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            source_prefix: String::new(),
            dest_prefix: String::new(),
            skip_identical: true,
            overwrite_existing: false,
            level: CompressionLevel::default(),
            progress: None,
            cancel: None,
        }
    }
}

impl std::fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferOptions")
            .field("source_prefix", &self.source_prefix)
            .field("dest_prefix", &self.dest_prefix)
            .field("skip_identical", &self.skip_identical)
            .field("overwrite_existing", &self.overwrite_existing)
            .field("level", &self.level)
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl TransferOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix stripped from source keys.
    pub fn source_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.source_prefix = prefix.into();
        self
    }

    /// Sets the prefix prepended to destination keys.
    pub fn dest_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.dest_prefix = prefix.into();
        self
    }

    /// Sets whether same-size collisions are skipped.
    pub fn skip_identical(mut self, skip: bool) -> Self {
        self.skip_identical = skip;
        self
    }

    /// Sets whether collisions replace the destination entry.
    pub fn overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Sets the compression level.
    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
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

/// Outcome of a copy or move.
///
/// Per-entry problems do not fail the transfer. They are collected in
/// [`warnings`](Self::warnings) and make the result partial.
///
/// A move removes from the source only what now exists in the destination:
/// the copied entries and those skipped as identical. Every other entry
/// counted in [`skipped`](Self::skipped) stays in the source, whether it
/// collided with a different destination entry or was shadowed by another
/// source entry mapping to the same destination key. Its warning names it.
#[must_use = "transfer results should be checked"]
#[derive(Debug, Clone, Default)]
pub struct CopyResult {
    /// False when nothing could be transferred because every requested
    /// entry was missing or unreadable.
    pub success: bool,
    /// Entries written to the destination.
    pub copied: usize,
    /// Entries not written: identical to, or colliding with, a destination
    /// entry, or shadowed by a later source entry with the same destination
    /// key.
    pub skipped: usize,
    /// Uncompressed bytes of the copied entries.
    pub bytes_copied: u64,
    /// Wall-clock time of the whole operation.
    pub elapsed: Duration,
    /// Non-fatal problems, one line each.
    pub warnings: Vec<String>,
    /// For moves: the source still holds the moved entries.
    pub source_retained: bool,
}

impl CopyResult {
    /// Returns true if the transfer succeeded with warnings.
    pub fn is_partial(&self) -> bool {
        self.success && !self.warnings.is_empty()
    }

    pub(crate) fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }
}
