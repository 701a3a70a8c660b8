//! Cooperative pause and cancel shared between the caller and the workers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

/// Cloneable handle used to pause, resume or cancel a running batch
///
/// Workers observe the handle between tasks; a task already running is
/// always allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    shared: Arc<Shared>,
}

impl BatchControl {
    /// New handle, neither paused nor cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold workers before their next task
    pub fn pause(&self) {
        *self.lock_paused() = true;
    }

    /// Release paused workers
    pub fn resume(&self) {
        *self.lock_paused() = false;
        self.shared.resumed.notify_all();
    }

    /// Stop starting new tasks; also releases a pause so workers can exit
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
        self.resume();
    }

    /// Whether workers are currently held
    pub fn is_paused(&self) -> bool {
        *self.lock_paused()
    }

    /// Whether the batch was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Block while paused; returns `false` when the batch was cancelled
    pub fn wait_while_paused(&self) -> bool {
        let guard = self.lock_paused();
        let _guard = self
            .shared
            .resumed
            .wait_while(guard, |paused| *paused && !self.is_cancelled())
            .unwrap_or_else(PoisonError::into_inner);
        !self.is_cancelled()
    }

    // A poisoned flag is still a valid bool
    fn lock_paused(&self) -> std::sync::MutexGuard<'_, bool> {
        self.shared
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
