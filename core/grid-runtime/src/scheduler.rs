//! FILENAME: core/grid-runtime/src/scheduler.rs
//! Debounced Scheduling - Coalesces bursts of calls into one deferred run.
//!
//! Each `schedule` call replaces the pending one, so only the last call in a
//! burst runs, `delay` after it was made.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "grid::scheduler";

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` once `delay` has passed without another `schedule` call.
    ///
    /// Outside a tokio runtime there is nothing to defer onto, so `f` runs
    /// immediately.
    pub fn schedule<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(target: LOG_TARGET, "no tokio runtime; running debounced call immediately");
                self.cancel();
                f();
                return;
            }
        };

        let delay = self.delay;
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        });

        if let Some(previous) = self.slot().replace(task) {
            if !previous.is_finished() {
                debug!(target: LOG_TARGET, "superseded pending call");
            }
            previous.abort();
        }
    }

    /// Drops the pending call, if any. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(task) => {
                let was_pending = !task.is_finished();
                task.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
