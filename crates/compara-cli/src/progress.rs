//! Progress bar utilities for CLI operations
//!
//! Bridges the record scan progress of the ingest pipeline to indicatif.

use compara_ingest::family::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})";

/// Create a simple progress bar with custom message
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Record progress drawn as a terminal bar
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(message: &str) -> Self {
        Self {
            bar: create_progress_bar(0, message),
        }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl ProgressReporter for BarProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, position: usize, _total: usize) {
        self.bar.set_position(position as u64);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// One stderr line every `interval` records, independent of the log level
pub struct IntervalProgress {
    interval: usize,
}

impl IntervalProgress {
    pub fn new(interval: usize) -> Self {
        Self { interval }
    }

    /// Line printed at `position`, if that position is on the interval
    pub fn line(&self, position: usize, total: usize) -> Option<String> {
        (self.interval > 0 && position % self.interval == 0).then(|| format!("-- {position}/{total} --"))
    }
}

impl ProgressReporter for IntervalProgress {
    fn advance(&self, position: usize, total: usize) {
        if let Some(line) = self.line(position, total) {
            eprintln!("{line}");
        }
    }
}

/// Progress bar by default, plain stderr lines when an interval is configured
pub fn reporter(interval: Option<usize>, message: &str) -> Box<dyn ProgressReporter> {
    match interval {
        Some(interval) => Box::new(IntervalProgress::new(interval)),
        None => Box::new(BarProgress::new(message)),
    }
}
