//! Progress bar for CLI operations.

use arcmill::progress::{ProgressSink, ProgressSnapshot};
use indicatif::{ProgressBar, ProgressStyle};

/// Entry-count progress bar driven by the engine's snapshots.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a new progress display
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries {wide_msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        };
        Self { bar }
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Finishes with a custom message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.abandon_with_message(msg.into());
    }
}

impl ProgressSink for CliProgress {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_length(snapshot.total_entries as u64);
        self.bar.set_position(snapshot.entries_processed as u64);

        // Truncate long names
        let name = &snapshot.current_entry;
        let display_name = match name.char_indices().rev().nth(36) {
            Some((index, _)) if name.chars().count() > 40 => format!("...{}", &name[index..]),
            _ => name.clone(),
        };
        self.bar.set_message(display_name);
    }
}
