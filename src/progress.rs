//! Console progress reporting for batch conversions.

use indicatif::{ProgressBar, ProgressStyle};

use crate::engine::ProgressSink;

/// Indicatif-backed [`ProgressSink`] for the CLI.
#[derive(Debug)]
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn set_range(&mut self, max: u64) {
        self.bar.set_length(max);
    }

    fn set_position(&mut self, value: u64) {
        self.bar.set_position(value);
    }

    fn step(&mut self, delta: u64) {
        self.bar.inc(delta);
    }
}
