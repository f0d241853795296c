//! Progress reporting and cooperative cancellation.
//!
//! Every long-running operation reports one [`ProgressSnapshot`] per entry
//! to an injected [`ProgressSink`], synchronously and on the operation's own
//! thread. Snapshots are monotonic: neither the processed-entry count nor the
//! processed-byte count ever decreases, and the last snapshot of a successful
//! operation has `entries_processed == total_entries`.
//!
//! Cancellation is a shared [`CancellationFlag`] that the engine checks once
//! per entry, before the entry starts.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use arcmill::progress::{CancellationFlag, ProgressSnapshot};
//! use arcmill::read::{self, ExtractOptions};
//!
//! let cancel = CancellationFlag::new();
//! let options = ExtractOptions::new()
//!     .progress(Arc::new(|s: &ProgressSnapshot| {
//!         println!("{:>5.1}% {}", s.percentage(), s.current_entry);
//!     }))
//!     .cancel(cancel.clone());
//! read::extract_all("backup.tar.gz", "./out", &options)?;
//! # Ok::<(), arcmill::Error>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{Error, Result};

// Floating point versions for formatting calculations
const BYTES_KB: f64 = 1024.0;
const BYTES_MB: f64 = BYTES_KB * 1024.0;
const BYTES_GB: f64 = BYTES_MB * 1024.0;

/// Point-in-time view of an operation's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Key of the entry that was just processed.
    pub current_entry: String,
    /// Number of entries processed so far, including `current_entry`.
    pub entries_processed: usize,
    /// Total number of entries the operation will process.
    pub total_entries: usize,
    /// Uncompressed bytes processed so far.
    pub bytes_processed: u64,
    /// Total uncompressed bytes, as declared before streaming started.
    ///
    /// Single-stream wrappers that do not record their size report 0.
    pub total_bytes: u64,
}

impl ProgressSnapshot {
    /// Returns the completion percentage (0.0 - 100.0).
    ///
    /// Falls back to the entry count when the byte total is unknown.
    pub fn percentage(&self) -> f64 {
        if self.total_bytes > 0 {
            (self.bytes_processed as f64 / self.total_bytes as f64 * 100.0).min(100.0)
        } else if self.total_entries > 0 {
            self.entries_processed as f64 / self.total_entries as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Returns `true` once every entry has been processed.
    pub fn is_complete(&self) -> bool {
        self.entries_processed >= self.total_entries
    }
}

/// Receives progress snapshots.
///
/// Implemented for any `Fn(&ProgressSnapshot) + Send + Sync` closure.
pub trait ProgressSink: Send + Sync {
    /// Called after each entry completes.
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressSnapshot) + Send + Sync,
{
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

/// A sink that discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}
}

/// A sink that keeps every snapshot it receives.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    snapshots: Mutex<Vec<ProgressSnapshot>>,
}

impl RecordingProgress {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder ready to be shared with an options struct.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns a copy of the snapshots received so far.
    pub fn snapshots(&self) -> Vec<ProgressSnapshot> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Returns the most recent snapshot.
    pub fn last(&self) -> Option<ProgressSnapshot> {
        self.snapshots
            .lock()
            .ok()
            .and_then(|s| s.last().cloned())
    }
}

impl ProgressSink for RecordingProgress {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push(snapshot.clone());
        }
    }
}

/// Shared, thread-safe cancellation flag.
///
/// Clones observe the same flag. Once cancelled a flag stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Creates a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(Error::Cancelled)` if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Per-operation progress bookkeeping.
///
/// Owns the running totals and forwards a snapshot to the sink after each
/// entry.
pub(crate) struct ProgressTracker<'a> {
    sink: Option<&'a dyn ProgressSink>,
    cancel: Option<&'a CancellationFlag>,
    snapshot: ProgressSnapshot,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(
        sink: Option<&'a Arc<dyn ProgressSink>>,
        cancel: Option<&'a CancellationFlag>,
        total_entries: usize,
        total_bytes: u64,
    ) -> Self {
        Self {
            sink: sink.map(|s| s.as_ref()),
            cancel,
            snapshot: ProgressSnapshot {
                total_entries,
                total_bytes,
                ..ProgressSnapshot::default()
            },
        }
    }

    /// Fails with [`Error::Cancelled`] if the flag is set.
    pub(crate) fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) => flag.check(),
            None => Ok(()),
        }
    }

    /// Records one finished entry and notifies the sink.
    pub(crate) fn entry_done(&mut self, key: &str, bytes: u64) {
        self.snapshot.current_entry = key.to_string();
        self.snapshot.entries_processed += 1;
        self.snapshot.bytes_processed = self.snapshot.bytes_processed.saturating_add(bytes);
        if let Some(sink) = self.sink {
            sink.on_progress(&self.snapshot);
        }
    }

    pub(crate) fn entries_processed(&self) -> usize {
        self.snapshot.entries_processed
    }
}

/// Formats a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Formats bytes as a human-readable string using IEC units (KiB, MiB, GiB).
///
/// # Examples
///
/// ```rust
/// use arcmill::progress::format_bytes_iec;
///
/// assert_eq!(format_bytes_iec(0), "0 B");
/// assert_eq!(format_bytes_iec(1536), "1.5 KiB");
/// assert_eq!(format_bytes_iec(1048576), "1.0 MiB");
/// ```
pub fn format_bytes_iec(bytes: u64) -> String {
    let bytes_f64 = bytes as f64;
    if bytes_f64 < BYTES_KB {
        format!("{} B", bytes)
    } else if bytes_f64 < BYTES_MB {
        format!("{:.1} KiB", bytes_f64 / BYTES_KB)
    } else if bytes_f64 < BYTES_GB {
        format!("{:.1} MiB", bytes_f64 / BYTES_MB)
    } else {
        format!("{:.1} GiB", bytes_f64 / BYTES_GB)
    }
}
