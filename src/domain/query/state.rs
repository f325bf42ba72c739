use crate::domain::errors::FetchError;
use std::rc::Rc;
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum QueryStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Snapshot of one cache entry as seen by a typed observer.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    /// Last successful result; kept while a refetch is pending.
    pub data: Option<Rc<T>>,
    pub error: Option<FetchError>,
    pub fetched_at: Option<u64>,
}

// manual impl: `Rc<T>` is cloneable for every `T`
impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self { status: QueryStatus::Idle, data: None, error: None, fetched_at: None }
    }

    pub fn is_idle(&self) -> bool {
        self.status == QueryStatus::Idle
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }
}
