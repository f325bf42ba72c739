//! Ordered queue of transient user-facing messages.

use crate::domain::logging::{LogComponent, get_logger, get_time_provider};
use crate::domain::runtime::{ScheduledTask, Scheduler};
use derive_more::Display;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use strum::{AsRefStr, EnumIter, EnumString};
use uuid::Uuid;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, EnumIter, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: u64,
    /// Zero means the notification stays until dismissed.
    pub duration: Duration,
}

pub type NotificationListener = Rc<dyn Fn(&[Notification])>;

struct CenterInner {
    scheduler: Rc<dyn Scheduler>,
    default_duration: Duration,
    queue: RefCell<Vec<Notification>>,
    timers: RefCell<HashMap<NotificationId, ScheduledTask>>,
    listeners: RefCell<Vec<(u64, NotificationListener)>>,
    next_listener: Cell<u64>,
}

#[derive(Clone)]
pub struct NotificationCenter {
    inner: Rc<CenterInner>,
}

impl NotificationCenter {
    pub fn new(scheduler: Rc<dyn Scheduler>, default_duration: Duration) -> Self {
        Self {
            inner: Rc::new(CenterInner {
                scheduler,
                default_duration,
                queue: RefCell::new(Vec::new()),
                timers: RefCell::new(HashMap::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Appends with the configured default duration.
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        self.notify_for(kind, message, self.inner.default_duration)
    }

    pub fn notify_for(&self, kind: NotificationKind, message: impl Into<String>, duration: Duration) -> NotificationId {
        let notification = Notification {
            id: NotificationId::random(),
            kind,
            message: message.into(),
            created_at: get_time_provider().current_timestamp(),
            duration,
        };
        let id = notification.id;

        get_logger().debug(
            LogComponent::Domain("Notifications"),
            &format!("🔔 [{}] {} ({} ms)", kind, notification.message, duration.as_millis()),
        );
        self.inner.queue.borrow_mut().push(notification);

        if !duration.is_zero() {
            let weak: Weak<CenterInner> = Rc::downgrade(&self.inner);
            let task = self.inner.scheduler.schedule(
                duration,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        NotificationCenter { inner }.expire(id);
                    }
                }),
            );
            self.inner.timers.borrow_mut().insert(id, task);
        }

        self.emit();
        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.notify(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.notify(NotificationKind::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.notify(NotificationKind::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.notify(NotificationKind::Warning, message)
    }

    /// Removes the notification and cancels its timer. Unknown ids are ignored.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let timer = self.inner.timers.borrow_mut().remove(&id);
        if let Some(timer) = timer {
            timer.cancel();
        }
        self.remove(id)
    }

    // timer fired: the task is spent, nothing to cancel
    fn expire(&self, id: NotificationId) {
        self.inner.timers.borrow_mut().remove(&id);
        self.remove(id);
    }

    fn remove(&self, id: NotificationId) -> bool {
        let removed = {
            let mut queue = self.inner.queue.borrow_mut();
            let before = queue.len();
            queue.retain(|n| n.id != id);
            queue.len() != before
        };
        if removed {
            self.emit();
        }
        removed
    }

    /// Active notifications in insertion order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.queue.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }

    pub fn subscribe(&self, listener: impl Fn(&[Notification]) + 'static) -> u64 {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.inner.listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
    }

    /// Cancels every pending timer and empties the queue.
    pub fn dispose(&self) {
        let timers: Vec<ScheduledTask> = self.inner.timers.borrow_mut().drain().map(|(_, t)| t).collect();
        for timer in timers {
            timer.cancel();
        }
        self.inner.queue.borrow_mut().clear();
        self.inner.listeners.borrow_mut().clear();
    }

    fn emit(&self) {
        let snapshot = self.notifications();
        let listeners: Vec<NotificationListener> =
            self.inner.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
