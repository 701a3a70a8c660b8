//! Fixed-size worker pool running annotation tasks with pause, cancel and checkpoint hooks

use crate::batch::control::BatchControl;
use crate::batch::stats::{BatchStatistics, Counters};
use crate::batch::task::{ProcessingResult, ProcessingTask};
use crate::io::configuration::{DEFAULT_AUTO_SAVE_INTERVAL, STATISTICS_INTERVAL};
use crate::io::error::{AnnotateError, Result};
use crate::io::settings::{PerformanceSettings, resolve_thread_count};
use crate::render::Compositor;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Work performed for each task; implementations must be shareable across threads
pub trait TaskProcessor: Sync {
    /// Annotate one image
    ///
    /// # Errors
    ///
    /// Returns an error describing why the task failed
    fn process(&self, task: &ProcessingTask) -> Result<()>;
}

impl TaskProcessor for Compositor {
    fn process(&self, task: &ProcessingTask) -> Result<()> {
        self.process_file(task).map(|_| ())
    }
}

/// Receives batch events on the thread that called [`BatchRunner::run`]
pub trait BatchObserver {
    /// The batch is about to start `total` tasks
    fn on_started(&mut self, _total: usize) {}

    /// One task finished
    fn on_file_processed(&mut self, _result: &ProcessingResult) {}

    /// `processed` of `total` tasks are done; `file_name` was the latest
    fn on_progress(&mut self, _processed: usize, _total: usize, _file_name: &str) {}

    /// Periodic and final statistics
    fn on_statistics(&mut self, _statistics: &BatchStatistics) {}

    /// Time to persist progress
    fn on_checkpoint(&mut self) {}

    /// The batch ended; `cancelled` tells whether tasks were left unstarted
    fn on_finished(&mut self, _statistics: &BatchStatistics, _cancelled: bool) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl BatchObserver for NullObserver {}

/// Pool size and checkpoint cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Worker threads; `0` picks a count from the available cores
    pub thread_count: usize,
    /// Whether [`BatchObserver::on_checkpoint`] fires during the run
    pub auto_save: bool,
    /// Processed tasks between checkpoint events
    pub auto_save_interval: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            thread_count: 0,
            auto_save: true,
            auto_save_interval: DEFAULT_AUTO_SAVE_INTERVAL,
        }
    }
}

impl From<&PerformanceSettings> for BatchConfig {
    fn from(performance: &PerformanceSettings) -> Self {
        Self {
            thread_count: performance.thread_count,
            auto_save: performance.auto_save,
            auto_save_interval: performance.auto_save_interval,
        }
    }
}

/// Runs tasks on a dedicated thread pool
#[derive(Debug, Clone)]
pub struct BatchRunner {
    config: BatchConfig,
    control: BatchControl,
}

impl BatchRunner {
    /// Runner driven by `control`
    pub const fn new(config: BatchConfig, control: BatchControl) -> Self {
        Self { config, control }
    }

    /// Handle for pausing or cancelling this runner
    pub const fn control(&self) -> &BatchControl {
        &self.control
    }

    /// Number of worker threads the pool will use
    pub fn thread_count(&self) -> usize {
        resolve_thread_count(self.config.thread_count)
    }

    /// Process `tasks`, reporting to `observer`, and return the final statistics
    ///
    /// `skipped` counts images excluded before the run; it is only reported.
    /// Failing or panicking tasks become failed results. After cancellation
    /// no new task starts and the call returns once running tasks finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread pool cannot be created
    pub fn run<P, O>(
        &self,
        tasks: &[ProcessingTask],
        skipped: usize,
        processor: &P,
        observer: &mut O,
    ) -> Result<BatchStatistics>
    where
        P: TaskProcessor + ?Sized,
        O: BatchObserver + ?Sized,
    {
        let threads = self.thread_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("panelstamp-worker-{index}"))
            .build()
            .map_err(|e| AnnotateError::ThreadPool {
                reason: e.to_string(),
            })?;

        let total = tasks.len();
        let counters = Counters::with_skipped(skipped);
        let start = Instant::now();
        let control = &self.control;
        info!(total, threads, skipped, "Starting batch");
        observer.on_started(total);

        pool.in_place_scope(|scope| {
            let (sender, receiver) = mpsc::channel::<ProcessingResult>();

            for task in tasks {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    if control.is_cancelled() || !control.wait_while_paused() {
                        return;
                    }
                    let result = run_task(processor, task);
                    if sender.send(result).is_err() {
                        debug!("Result receiver closed");
                    }
                });
            }
            drop(sender);

            for result in receiver {
                let processed = counters.record(result.success);
                if !result.success {
                    warn!(
                        file = result.file_name.as_str(),
                        error = result.message.as_str(),
                        "Task failed"
                    );
                }
                observer.on_file_processed(&result);
                observer.on_progress(processed, total, &result.file_name);

                if processed % STATISTICS_INTERVAL == 0 {
                    observer.on_statistics(&counters.snapshot(total, start.elapsed(), false));
                }
                if self.config.auto_save
                    && self.config.auto_save_interval > 0
                    && processed % self.config.auto_save_interval == 0
                {
                    observer.on_checkpoint();
                }
            }
        });

        let cancelled = control.is_cancelled();
        let statistics = counters.snapshot(total, start.elapsed(), true);
        info!(
            processed = statistics.processed,
            success = statistics.success,
            failed = statistics.failed,
            cancelled,
            "Batch finished"
        );
        observer.on_statistics(&statistics);
        observer.on_finished(&statistics, cancelled);
        Ok(statistics)
    }
}

fn run_task<P: TaskProcessor + ?Sized>(processor: &P, task: &ProcessingTask) -> ProcessingResult {
    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| processor.process(task)));

    let (success, message) = match outcome {
        Ok(Ok(())) => (true, "OK".to_string()),
        Ok(Err(error)) => (false, error.to_string()),
        Err(payload) => (false, format!("worker panicked: {}", panic_message(&*payload))),
    };

    ProcessingResult {
        file_name: task.file_name(),
        success,
        message,
        elapsed: start.elapsed(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
