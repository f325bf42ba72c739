//! Current identity, persisted in durable storage and hydrated once at start.

use crate::domain::errors::{FetchError, FetchResult, StorageError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::portfolio::{Identity, UserId};
use crate::domain::runtime::Spawner;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Key/value persistence that survives a reload (`localStorage` in the browser).
pub trait DurableStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// What a view is allowed to decide right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionGate {
    /// Persisted identity not read yet; render a loading state, never redirect.
    Hydrating,
    Anonymous,
    Authenticated(Identity),
}

impl SessionGate {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionGate::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Only an anonymous gate may send the user to the login view.
    pub fn should_redirect_to_login(&self) -> bool {
        matches!(self, SessionGate::Anonymous)
    }
}

pub type SessionListener = Rc<dyn Fn(&SessionGate)>;

struct SessionInner {
    storage: Rc<dyn DurableStorage>,
    storage_key: String,
    identity: RefCell<Option<Identity>>,
    hydrating: Cell<bool>,
    // identity was set explicitly before hydration finished
    set_during_hydration: Cell<bool>,
    listeners: RefCell<Vec<(u64, SessionListener)>>,
    next_listener: Cell<u64>,
}

/// Owner of the single active [`Identity`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<SessionInner>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn DurableStorage>, storage_key: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                storage,
                storage_key: storage_key.into(),
                identity: RefCell::new(None),
                hydrating: Cell::new(true),
                set_during_hydration: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Schedules hydration on the event loop so the first render sees
    /// [`SessionGate::Hydrating`].
    pub fn init(&self, spawner: &dyn Spawner) {
        let store = self.clone();
        spawner.spawn(async move { store.hydrate() }.boxed_local());
    }

    /// Reads the persisted identity. Runs at most once per store.
    pub fn hydrate(&self) {
        if !self.inner.hydrating.get() {
            return;
        }

        let restored = self.read_persisted();
        if !self.inner.set_during_hydration.get() {
            *self.inner.identity.borrow_mut() = restored;
        }
        self.inner.hydrating.set(false);

        get_logger().debug(
            LogComponent::Domain("Session"),
            &format!("💧 Hydration finished (signed in: {})", self.inner.identity.borrow().is_some()),
        );
        self.emit();
    }

    fn read_persisted(&self) -> Option<Identity> {
        let raw = match self.inner.storage.read(&self.inner.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                get_logger().warn(LogComponent::Domain("Session"), &format!("Could not read session: {e}"));
                return None;
            }
        };

        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                get_logger().warn(
                    LogComponent::Domain("Session"),
                    &format!("Ignoring malformed persisted session: {e}"),
                );
                None
            }
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.identity.borrow().clone()
    }

    /// Input check for fetches that belong to `user_id`. Fails when that
    /// user is no longer signed in.
    pub fn require_user(&self, user_id: UserId) -> FetchResult<UserId> {
        match self.inner.identity.borrow().as_ref() {
            Some(identity) if identity.id == user_id => Ok(user_id),
            _ => Err(FetchError::MissingDependency("signed-in user")),
        }
    }

    pub fn is_hydrating(&self) -> bool {
        self.inner.hydrating.get()
    }

    pub fn gate(&self) -> SessionGate {
        if self.is_hydrating() {
            return SessionGate::Hydrating;
        }
        match self.identity() {
            Some(identity) => SessionGate::Authenticated(identity),
            None => SessionGate::Anonymous,
        }
    }

    /// Persists first; on a storage failure the in-memory identity is left as is.
    pub fn set_identity(&self, identity: Option<Identity>) -> Result<(), StorageError> {
        let key = &self.inner.storage_key;
        match &identity {
            Some(identity) => {
                let json = serde_json::to_string(identity).map_err(|e| StorageError::Serialize(e.to_string()))?;
                self.inner.storage.write(key, &json)?;
            }
            None => self.inner.storage.delete(key)?,
        }

        if self.inner.hydrating.get() {
            self.inner.set_during_hydration.set(true);
        }
        *self.inner.identity.borrow_mut() = identity;
        self.emit();
        Ok(())
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionGate) + 'static) -> u64 {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.inner.listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
    }

    /// Drops every listener. The persisted record is left untouched.
    pub fn dispose(&self) {
        self.inner.listeners.borrow_mut().clear();
    }

    fn emit(&self) {
        let gate = self.gate();
        let listeners: Vec<SessionListener> =
            self.inner.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(&gate);
        }
    }
}
