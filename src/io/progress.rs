//! Batch progress display with a rolling window of recently finished files

use crate::batch::{BatchObserver, BatchStatistics, ProcessingResult};
use crate::io::configuration::{MAX_RECENT_FILE_BARS, PROGRESS_BAR_WIDTH};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::VecDeque;
use std::sync::LazyLock;

/// Coordinates the terminal display for one batch
///
/// A single bar tracks overall progress; below it a fixed number of lines
/// show the most recently finished files, newest last.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bars: Vec<ProgressBar>,
    /// Display lines for the last finished files
    recent: VecDeque<String>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static FILE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Files: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

impl ProgressManager {
    /// Create a progress manager drawing to stderr
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Create a progress manager that draws nothing
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi_progress: MultiProgress::with_draw_target(target),
            batch_bar: None,
            file_bars: Vec::new(),
            recent: VecDeque::with_capacity(MAX_RECENT_FILE_BARS),
        }
    }

    /// Create the batch bar and the recent-file lines for `total` files
    pub fn initialize(&mut self, total: usize) {
        let batch_bar = ProgressBar::new(total as u64);
        batch_bar.set_style(BATCH_STYLE.clone());
        self.batch_bar = Some(self.multi_progress.add(batch_bar));

        self.file_bars.clear();
        self.recent.clear();
        for _ in 0..total.min(MAX_RECENT_FILE_BARS) {
            let bar = ProgressBar::new(1);
            bar.set_style(FILE_STYLE.clone());
            self.file_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Advance the batch bar and push `result` into the recent-file window
    pub fn complete_file(&mut self, result: &ProcessingResult) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        let line = if result.success {
            format!(
                "✓ {} ({:.2}s)",
                result.file_name,
                result.elapsed.as_secs_f64()
            )
        } else {
            format!("✗ {}: {}", result.file_name, result.message)
        };
        if self.recent.len() == MAX_RECENT_FILE_BARS {
            self.recent.pop_front();
        }
        self.recent.push_back(line);
        self.update_bars();
    }

    /// Show a short status next to the batch bar
    pub fn set_status(&self, status: &str) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.set_message(status.to_string());
        }
    }

    /// Lines currently shown for recently finished files, oldest first
    pub fn recent_files(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Number of files the batch bar has counted
    pub fn position(&self) -> u64 {
        self.batch_bar.as_ref().map_or(0, ProgressBar::position)
    }

    /// Close the batch bar with a summary and clear the file lines
    pub fn finish(&self, statistics: &BatchStatistics, cancelled: bool) {
        if let Some(ref batch_bar) = self.batch_bar {
            let verdict = if cancelled { "Cancelled" } else { "Done" };
            batch_bar.finish_with_message(format!(
                "{verdict}: {} ok, {} failed, {} skipped",
                statistics.success, statistics.failed, statistics.skipped
            ));
        }
        for bar in &self.file_bars {
            bar.finish_and_clear();
        }
    }

    fn update_bars(&self) {
        for (bar_idx, bar) in self.file_bars.iter().enumerate() {
            bar.set_message(self.recent.get(bar_idx).cloned().unwrap_or_default());
        }
    }
}

impl BatchObserver for ProgressManager {
    fn on_started(&mut self, total: usize) {
        self.initialize(total);
    }

    fn on_file_processed(&mut self, result: &ProcessingResult) {
        self.complete_file(result);
    }

    fn on_statistics(&mut self, statistics: &BatchStatistics) {
        if statistics.processed < statistics.total {
            self.set_status(&format!(
                "{:.1} files/s, ~{:.0}s left",
                statistics.speed, statistics.remaining
            ));
        }
    }

    fn on_finished(&mut self, statistics: &BatchStatistics, cancelled: bool) {
        self.finish(statistics, cancelled);
    }
}
