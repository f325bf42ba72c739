use super::{QueryKey, QueryState, QueryStatus};
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::logging::{LogComponent, get_logger, get_time_provider};
use crate::domain::runtime::Spawner;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

type Erased = Rc<dyn Any>;
type ErasedFetcher = Rc<dyn Fn() -> LocalBoxFuture<'static, FetchResult<Erased>>>;
type Listener = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl QueryOptions {
    pub fn enabled(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

struct Entry {
    status: QueryStatus,
    data: Option<Erased>,
    error: Option<FetchError>,
    fetched_at: Option<u64>,
    /// Generation of the most recently started fetch; only its result applies.
    generation: u64,
    fetcher: Option<ErasedFetcher>,
    subscribers: usize,
    enabled_subscribers: usize,
    listeners: Vec<(u64, Listener)>,
}

impl Entry {
    fn new() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
            generation: 0,
            fetcher: None,
            subscribers: 0,
            enabled_subscribers: 0,
            listeners: Vec::new(),
        }
    }

    fn needs_fetch(&self) -> bool {
        matches!(self.status, QueryStatus::Idle | QueryStatus::Error)
    }
}

struct CacheInner {
    entries: HashMap<QueryKey, Entry>,
    // shared by all entries so a re-created key never reuses a live generation
    next_generation: u64,
    next_listener: u64,
    fetches_started: u64,
}

/// Keyed, de-duplicated asynchronous data cache.
///
/// Entries live exactly as long as at least one [`QueryObserver`] holds
/// their key. Fetches run on the injected [`Spawner`]; no method blocks.
#[derive(Clone)]
pub struct QueryCache {
    inner: Rc<RefCell<CacheInner>>,
    spawner: Rc<dyn Spawner>,
}

impl QueryCache {
    pub fn new(spawner: Rc<dyn Spawner>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                entries: HashMap::new(),
                next_generation: 0,
                next_listener: 0,
                fetches_started: 0,
            })),
            spawner,
        }
    }

    /// Subscribes to `key`, fetching it when enabled and nothing fresh is
    /// cached. An in-flight fetch for the same key is shared, not repeated.
    pub fn observe<T, F, Fut>(&self, key: QueryKey, fetch: F, options: QueryOptions) -> QueryObserver<T>
    where
        T: 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = FetchResult<T>> + 'static,
    {
        let fetcher: ErasedFetcher = Rc::new(move || {
            fetch()
                .map(|result| result.map(|value| Rc::new(value) as Erased))
                .boxed_local()
        });

        {
            let mut inner = self.inner.borrow_mut();
            let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.subscribers += 1;
            if options.enabled {
                entry.enabled_subscribers += 1;
            }
            entry.fetcher = Some(fetcher);
        }

        let observer = QueryObserver {
            cache: self.clone(),
            key,
            enabled: Cell::new(options.enabled),
            listener_ids: RefCell::new(Vec::new()),
            _marker: PhantomData,
        };
        if options.enabled {
            self.activate(&observer.key);
        }
        observer
    }

    /// Refetches entries under `prefix` that someone is actively observing;
    /// disabled ones drop back to idle. Returns the number of entries touched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let (refetch, reset) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let mut refetch = Vec::new();
            let mut reset = Vec::new();
            for (key, entry) in inner.entries.iter_mut() {
                if !key.starts_with(prefix) {
                    continue;
                }
                if entry.enabled_subscribers > 0 {
                    refetch.push(key.clone());
                } else {
                    inner.next_generation += 1;
                    entry.generation = inner.next_generation;
                    entry.status = QueryStatus::Idle;
                    reset.push(key.clone());
                }
            }
            (refetch, reset)
        };

        get_logger().debug(
            LogComponent::Domain("QueryCache"),
            &format!("♻️ Invalidate {prefix}: {} refetch, {} reset", refetch.len(), reset.len()),
        );

        for key in &reset {
            self.emit(key);
        }
        for key in &refetch {
            self.start_fetch(key);
        }
        refetch.len() + reset.len()
    }

    pub fn status(&self, key: &QueryKey) -> Option<QueryStatus> {
        self.inner.borrow().entries.get(key).map(|e| e.status)
    }

    /// Typed snapshot of an entry without subscribing to it.
    ///
    /// A key fixes the type of its data. Asking for another type yields an
    /// `Error` state carrying [`FetchError::TypeMismatch`].
    pub fn peek<T: 'static>(&self, key: &QueryKey) -> Option<QueryState<T>> {
        let inner = self.inner.borrow();
        let entry = inner.entries.get(key)?;
        let data = match &entry.data {
            Some(erased) => match erased.clone().downcast::<T>() {
                Ok(data) => Some(data),
                Err(_) => {
                    get_logger().warn(
                        LogComponent::Domain("QueryCache"),
                        &format!("Entry {key} holds a different type than requested"),
                    );
                    return Some(QueryState {
                        status: QueryStatus::Error,
                        data: None,
                        error: Some(FetchError::TypeMismatch(key.to_string())),
                        fetched_at: entry.fetched_at,
                    });
                }
            },
            None => None,
        };
        Some(QueryState {
            status: entry.status,
            data,
            error: entry.error.clone(),
            fetched_at: entry.fetched_at,
        })
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Total fetches started over the cache lifetime.
    pub fn fetches_started(&self) -> u64 {
        self.inner.borrow().fetches_started
    }

    /// Drops every entry; results still in flight are discarded on arrival.
    pub fn dispose(&self) {
        let dropped = {
            let mut inner = self.inner.borrow_mut();
            let count = inner.entries.len();
            inner.entries.clear();
            count
        };
        get_logger().debug(
            LogComponent::Domain("QueryCache"),
            &format!("🧹 Disposed query cache ({dropped} entries)"),
        );
    }

    fn activate(&self, key: &QueryKey) {
        let needs_fetch = self
            .inner
            .borrow()
            .entries
            .get(key)
            .is_some_and(Entry::needs_fetch);
        if needs_fetch {
            self.start_fetch(key);
        }
    }

    /// Starts a fetch unless one is already pending for `key`. Only
    /// [`QueryCache::invalidate`] supersedes a pending fetch.
    fn refetch(&self, key: &QueryKey) {
        let pending = self.status(key) == Some(QueryStatus::Pending);
        if pending {
            crate::log_trace!(LogComponent::Domain("QueryCache"), "🔗 Joining pending fetch of {}", key);
            return;
        }
        self.start_fetch(key);
    }

    fn start_fetch(&self, key: &QueryKey) {
        let (generation, fetcher) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let Some(entry) = inner.entries.get_mut(key) else {
                return;
            };
            let Some(fetcher) = entry.fetcher.clone() else {
                return;
            };
            inner.next_generation += 1;
            inner.fetches_started += 1;
            entry.generation = inner.next_generation;
            entry.status = QueryStatus::Pending;
            entry.error = None;
            (entry.generation, fetcher)
        };

        crate::log_debug!(
            LogComponent::Domain("QueryCache"),
            "⏳ Fetching {} (generation {})",
            key,
            generation
        );
        self.emit(key);

        let future = fetcher();
        let cache = Rc::downgrade(&self.inner);
        let key = key.clone();
        self.spawner.spawn(
            async move {
                let result = future.await;
                if let Some(inner) = cache.upgrade() {
                    settle(&inner, &key, generation, result);
                }
            }
            .boxed_local(),
        );
    }

    fn add_listener(&self, key: &QueryKey, listener: Listener) -> Option<u64> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let entry = inner.entries.get_mut(key)?;
        let id = inner.next_listener;
        inner.next_listener += 1;
        entry.listeners.push((id, listener));
        Some(id)
    }

    fn release(&self, key: &QueryKey, was_enabled: bool, listener_ids: &[u64]) {
        let mut inner = self.inner.borrow_mut();
        let Some(entry) = inner.entries.get_mut(key) else {
            return;
        };
        entry.listeners.retain(|(id, _)| !listener_ids.contains(id));
        entry.subscribers = entry.subscribers.saturating_sub(1);
        if was_enabled {
            entry.enabled_subscribers = entry.enabled_subscribers.saturating_sub(1);
        }
        if entry.subscribers == 0 {
            inner.entries.remove(key);
            crate::log_trace!(LogComponent::Domain("QueryCache"), "🗑️ Collected {}", key);
        }
    }

    fn set_enabled(&self, key: &QueryKey, enabled: bool) {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(entry) = inner.entries.get_mut(key) else {
                return;
            };
            if enabled {
                entry.enabled_subscribers += 1;
            } else {
                entry.enabled_subscribers = entry.enabled_subscribers.saturating_sub(1);
            }
        }
        if enabled {
            self.activate(key);
        }
    }

    fn emit(&self, key: &QueryKey) {
        emit(&self.inner, key);
    }
}

fn settle(inner: &Rc<RefCell<CacheInner>>, key: &QueryKey, generation: u64, result: FetchResult<Erased>) {
    let applied = {
        let mut guard = inner.borrow_mut();
        match guard.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                match result {
                    Ok(data) => {
                        entry.status = QueryStatus::Success;
                        entry.data = Some(data);
                        entry.error = None;
                        entry.fetched_at = Some(get_time_provider().current_timestamp());
                    }
                    Err(error) => {
                        get_logger().warn(
                            LogComponent::Domain("QueryCache"),
                            &format!("❌ Fetch for {key} failed: {error}"),
                        );
                        entry.status = QueryStatus::Error;
                        entry.error = Some(error);
                    }
                }
                true
            }
            Some(entry) => {
                crate::log_debug!(
                    LogComponent::Domain("QueryCache"),
                    "Discarding superseded result for {} (generation {} < {})",
                    key,
                    generation,
                    entry.generation
                );
                false
            }
            None => false,
        }
    };
    if applied {
        emit(inner, key);
    }
}

fn emit(inner: &Rc<RefCell<CacheInner>>, key: &QueryKey) {
    let listeners: Vec<Listener> = match inner.borrow().entries.get(key) {
        Some(entry) => entry.listeners.iter().map(|(_, l)| l.clone()).collect(),
        None => Vec::new(),
    };
    for listener in listeners {
        listener();
    }
}

/// A subscription to one cache key, typed by the data it expects.
///
/// Dropping the last observer of a key collects its entry.
pub struct QueryObserver<T> {
    cache: QueryCache,
    key: QueryKey,
    enabled: Cell<bool>,
    listener_ids: RefCell<Vec<u64>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> QueryObserver<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn state(&self) -> QueryState<T> {
        self.cache.peek(&self.key).unwrap_or_default()
    }

    /// Flipping false→true fetches unless a fresh result is cached.
    pub fn set_enabled(&self, enabled: bool) {
        if self.enabled.replace(enabled) == enabled {
            return;
        }
        self.cache.set_enabled(&self.key, enabled);
    }

    /// Explicit retry. Ignored while disabled; joins a fetch already in flight.
    pub fn refetch(&self) -> bool {
        if !self.enabled.get() {
            return false;
        }
        self.cache.refetch(&self.key);
        true
    }

    /// Called after every status change of the entry, including changes
    /// caused by other observers of the same key.
    pub fn on_change(&self, listener: impl Fn() + 'static) {
        if let Some(id) = self.cache.add_listener(&self.key, Rc::new(listener)) {
            self.listener_ids.borrow_mut().push(id);
        }
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        let ids = self.listener_ids.take();
        self.cache.release(&self.key, self.enabled.get(), &ids);
    }
}

impl<T> std::fmt::Debug for QueryObserver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryObserver")
            .field("key", &self.key)
            .field("enabled", &self.enabled.get())
            .finish()
    }
}
