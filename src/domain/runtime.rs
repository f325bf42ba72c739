//! Execution seams for the single-threaded event loop.
//!
//! The stores never talk to the browser directly: futures are handed to a
//! [`Spawner`] and delayed work to a [`Scheduler`]. The browser binds these
//! to `spawn_local` and `setTimeout`; headless runs use a local pool and a
//! manually advanced clock.

use futures::future::LocalBoxFuture;
use std::time::Duration;

/// Runs a `!Send` future to completion on the current thread.
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Runs a callback once after a delay.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> ScheduledTask;
}

/// Handle to a scheduled callback.
///
/// Dropping the handle leaves the task armed; only [`ScheduledTask::cancel`]
/// disarms it.
pub struct ScheduledTask {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ScheduledTask {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A handle with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
