/// Pause and cancel handle shared with workers
pub mod control;
/// Atomic counters and statistics snapshots
pub mod stats;
/// Task planning and results
pub mod task;
/// Thread pool runner and observer hooks
pub mod worker;

pub use control::BatchControl;
pub use stats::BatchStatistics;
pub use task::{ProcessingResult, ProcessingTask, TaskPlan, plan_tasks};
pub use worker::{BatchConfig, BatchObserver, BatchRunner, NullObserver, TaskProcessor};
