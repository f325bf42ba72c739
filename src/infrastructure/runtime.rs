//! Spawner and scheduler implementations.

use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::runtime::{ScheduledTask, Scheduler, Spawner};
use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawn_local(task) {
            get_logger().error(LogComponent::Infrastructure("Runtime"), &format!("Failed to spawn task: {e}"));
        }
    }
}

type DueTask = Box<dyn FnOnce()>;

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    // (due, seq) keeps same-deadline tasks in scheduling order
    tasks: BTreeMap<(Duration, u64), DueTask>,
}

/// Scheduler driven by an explicit clock. Nothing runs until
/// [`ManualScheduler::advance`] moves time past a deadline.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    /// Number of armed tasks.
    pub fn pending(&self) -> usize {
        self.clock.borrow().tasks.len()
    }

    /// Moves the clock forward and runs every task that came due, in
    /// deadline order. Tasks scheduled by those tasks run too if they fall
    /// inside the window. Returns how many ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.clock.borrow().now + by;
        let mut ran = 0;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let due = clock.tasks.keys().next().copied().filter(|(at, _)| *at <= target);
                match due {
                    Some(slot) => {
                        clock.now = slot.0;
                        clock.tasks.remove(&slot)
                    }
                    None => None,
                }
            };
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        self.clock.borrow_mut().now = target;
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> ScheduledTask {
        let slot = {
            let mut clock = self.clock.borrow_mut();
            let slot = (clock.now + delay, clock.next_seq);
            clock.next_seq += 1;
            clock.tasks.insert(slot, task);
            slot
        };
        let clock = Rc::downgrade(&self.clock);
        ScheduledTask::new(move || {
            if let Some(clock) = clock.upgrade() {
                clock.borrow_mut().tasks.remove(&slot);
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserScheduler, BrowserSpawner};

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use gloo_timers::callback::Timeout;

    /// `wasm_bindgen_futures::spawn_local`.
    #[derive(Clone, Copy, Default)]
    pub struct BrowserSpawner;

    impl Spawner for BrowserSpawner {
        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            wasm_bindgen_futures::spawn_local(task);
        }
    }

    /// `setTimeout` / `clearTimeout`.
    #[derive(Clone, Copy, Default)]
    pub struct BrowserScheduler;

    impl Scheduler for BrowserScheduler {
        fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> ScheduledTask {
            let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
            // forget: the browser owns the callback until it fires or is cleared
            let handle = Timeout::new(millis, task).forget();
            ScheduledTask::new(move || {
                if let Some(id) = handle.as_f64() {
                    gloo::utils::window().clear_timeout_with_handle(id as i32);
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn tasks_fire_in_deadline_order_and_cancel_disarms() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        scheduler.schedule(Duration::from_millis(20), Box::new(move || l.borrow_mut().push("late")));
        let l = log.clone();
        scheduler.schedule(Duration::from_millis(10), Box::new(move || l.borrow_mut().push("early")));
        let l = log.clone();
        let cancelled = scheduler.schedule(Duration::from_millis(5), Box::new(move || l.borrow_mut().push("never")));
        cancelled.cancel();

        assert_eq!(scheduler.advance(Duration::from_millis(15)), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(15)), 1);
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(30));
    }

    #[test]
    fn dropping_the_handle_keeps_the_task_armed() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        drop(scheduler.schedule(Duration::from_millis(1), Box::new(move || f.set(true))));
        scheduler.advance(Duration::from_millis(1));
        assert!(fired.get());
    }
}
