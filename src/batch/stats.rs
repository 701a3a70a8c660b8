//! Thread-safe counters and the statistics derived from them

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Snapshot of batch progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchStatistics {
    /// Tasks finished, successfully or not
    pub processed: usize,
    /// Tasks submitted
    pub total: usize,
    /// Tasks that wrote an output
    pub success: usize,
    /// Tasks that failed
    pub failed: usize,
    /// Images left out before the batch started
    pub skipped: usize,
    /// Seconds since the batch started
    pub elapsed: f64,
    /// Processed tasks per second
    pub speed: f64,
    /// Estimated seconds until completion
    pub remaining: f64,
    /// Share of tasks processed, 0 to 100
    pub percent: f64,
}

/// Atomic tallies updated as results arrive
#[derive(Debug, Default)]
pub struct Counters {
    processed: AtomicUsize,
    success: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl Counters {
    /// Fresh counters starting from `skipped` pre-filtered images
    pub fn with_skipped(skipped: usize) -> Self {
        let counters = Self::default();
        counters.skipped.store(skipped, Ordering::Relaxed);
        counters
    }

    /// Record one finished task and return the new processed count
    pub fn record(&self, success: bool) -> usize {
        if success {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.processed.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Tasks finished so far
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }

    /// Build a statistics snapshot
    ///
    /// Final snapshots report no remaining time, and 100% when every task ran.
    pub fn snapshot(&self, total: usize, elapsed: Duration, is_final: bool) -> BatchStatistics {
        let processed = self.processed();
        let elapsed_secs = elapsed.as_secs_f64();
        let speed = if elapsed_secs > 0.0 {
            processed as f64 / elapsed_secs
        } else {
            0.0
        };
        let remaining = if is_final || speed <= 0.0 {
            0.0
        } else {
            total.saturating_sub(processed) as f64 / speed
        };
        let percent = if is_final && processed == total {
            100.0
        } else if total == 0 {
            0.0
        } else {
            processed as f64 / total as f64 * 100.0
        };

        BatchStatistics {
            processed,
            total,
            success: self.success.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            elapsed: elapsed_secs,
            speed,
            remaining,
            percent,
        }
    }
}
