//! Extraction options.

use std::sync::Arc;

use crate::progress::{CancellationFlag, ProgressSink};

/// Options for [`extract_all`](super::extract_all) and
/// [`extract_subset`](super::extract_subset).
#[derive(Clone)]
pub struct ExtractOptions {
    /// Progress sink, notified once per extracted entry.
    pub progress: Option<Arc<dyn ProgressSink>>,
    /// Cancellation flag, checked before each entry.
    pub cancel: Option<CancellationFlag>,
    /// Apply stored modification times to extracted files.
    pub preserve_mtime: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            progress: None,
            cancel: None,
            preserve_mtime: true,
        }
    }
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .field("preserve_mtime", &self.preserve_mtime)
            .finish()
    }
}

impl ExtractOptions {
    /// Creates extraction options with default settings.
    pub fn new() -> Self {
        Self::default()
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

    /// Sets whether modification times are applied to extracted files.
    pub fn preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::new();
        assert!(options.preserve_mtime);
        assert!(options.progress.is_none());
        assert!(options.cancel.is_none());
    }

    #[test]
    fn test_builder() {
        let flag = CancellationFlag::new();
        let options = ExtractOptions::new()
            .progress(Arc::new(NoProgress))
            .cancel(flag.clone())
            .preserve_mtime(false);
        assert!(!options.preserve_mtime);
        assert!(options.progress.is_some());
        flag.cancel();
        assert!(options.cancel.as_ref().is_some_and(|c| c.is_cancelled()));
        assert!(format!("{:?}", options).contains("preserve_mtime: false"));
    }
}
