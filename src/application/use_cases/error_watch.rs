use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::notifications::NotificationCenter;
use crate::domain::query::{QueryState, QueryStatus};
use std::cell::Cell;

/// Turns a query's transition into `Error` into exactly one notification.
///
/// Staying in error (further change events) does not notify again; leaving
/// and re-entering it does.
#[derive(Debug)]
pub struct ErrorWatch {
    label: &'static str,
    in_error: Cell<bool>,
}

impl ErrorWatch {
    pub fn new(label: &'static str) -> Self {
        Self { label, in_error: Cell::new(false) }
    }

    /// Returns true when a notification was raised.
    pub fn check<T>(&self, state: &QueryState<T>, notifications: &NotificationCenter) -> bool {
        match (state.status, &state.error) {
            (QueryStatus::Error, Some(error)) => {
                if self.in_error.replace(true) {
                    return false;
                }
                get_logger().warn(
                    LogComponent::Application(self.label),
                    &format!("Query failed: {error}"),
                );
                notifications.error(error.message());
                true
            }
            _ => {
                self.in_error.set(false);
                false
            }
        }
    }
}
