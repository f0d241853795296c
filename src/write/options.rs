//! Write options and result types for archive creation.

use std::sync::Arc;

use super::CompressionLevel;
use crate::format::ArchiveFormat;
use crate::progress::{CancellationFlag, ProgressSink};

/// Options for [`create`](super::create).
///
/// # Example
///
/// ```rust
/// use arcmill::format::{ArchiveFormat, Compression};
/// use arcmill::write::{CompressionLevel, CreateOptions};
///
/// let options = CreateOptions::new()
///     .format(ArchiveFormat::Tar(Compression::Xz))
///     .level(CompressionLevel::Maximum);
/// assert_eq!(options.level, CompressionLevel::Maximum);
/// ```
#[derive(Clone, Default)]
pub struct CreateOptions {
    /// Explicit format. When unset the format is derived from the path.
    pub format: Option<ArchiveFormat>,
    /// Compression level.
    pub level: CompressionLevel,
    /// Progress sink, notified once per written entry.
    pub progress: Option<Arc<dyn ProgressSink>>,
    /// Cancellation flag, checked before each entry.
    pub cancel: Option<CancellationFlag>,
}

impl std::fmt::Debug for CreateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateOptions")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl CreateOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the format derived from the archive path.
    pub fn format(mut self, format: ArchiveFormat) -> Self {
        self.format = Some(format);
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

/// Result of creating an archive.
#[must_use = "write results should be checked"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of entries written, directories included.
    pub entries_written: usize,
    /// Total uncompressed bytes written.
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Compression;

    #[test]
    fn test_defaults() {
        let options = CreateOptions::default();
        assert!(options.format.is_none());
        assert_eq!(options.level, CompressionLevel::Normal);
        assert!(options.progress.is_none());
    }

    #[test]
    fn test_builder() {
        let options = CreateOptions::new()
            .format(ArchiveFormat::Stream(Compression::Gzip))
            .level(CompressionLevel::None)
            .cancel(CancellationFlag::new());
        assert_eq!(
            options.format,
            Some(ArchiveFormat::Stream(Compression::Gzip))
        );
        assert!(options.level.is_stored());
        assert!(options.cancel.is_some());
        assert!(format!("{:?}", options).contains("progress: false"));
    }
}
