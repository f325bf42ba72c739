use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::FutureExt;
use portfolio_sync::domain::errors::{FetchError, FetchResult};
use portfolio_sync::domain::query::{QueryCache, QueryOptions, QueryStatus};
use portfolio_sync::query_key;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

fn cache(pool: &LocalPool) -> QueryCache {
    QueryCache::new(Rc::new(pool.spawner()))
}

/// Fetch function whose calls are answered by hand, in any order.
#[derive(Clone, Default)]
struct Manual {
    calls: Rc<Cell<usize>>,
    senders: Rc<RefCell<VecDeque<oneshot::Sender<FetchResult<String>>>>>,
}

impl Manual {
    fn fetcher(&self) -> impl Fn() -> futures::future::LocalBoxFuture<'static, FetchResult<String>> + 'static {
        let manual = self.clone();
        move || {
            manual.calls.set(manual.calls.get() + 1);
            let (tx, rx) = oneshot::channel();
            manual.senders.borrow_mut().push_back(tx);
            rx.map(|r| r.unwrap_or_else(|_| Err(FetchError::Transport("dropped".into()))))
                .boxed_local()
        }
    }

    fn take(&self) -> oneshot::Sender<FetchResult<String>> {
        self.senders.borrow_mut().pop_front().expect("a pending fetch")
    }
}

#[test]
fn identical_keys_share_one_fetch() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();

    let a = cache.observe(query_key!["stockDetail", "IBM"], manual.fetcher(), QueryOptions::default());
    let b = cache.observe(query_key!["stockDetail", "IBM"], manual.fetcher(), QueryOptions::default());
    pool.run_until_stalled();
    assert_eq!(manual.calls.get(), 1);
    assert!(a.state().is_pending());

    let _ = manual.take().send(Ok("IBM Corp".to_string()));
    pool.run_until_stalled();
    assert_eq!(a.state().data().map(String::as_str), Some("IBM Corp"));
    assert_eq!(b.state().data().map(String::as_str), Some("IBM Corp"));
    assert_eq!(cache.fetches_started(), 1);
}

#[test]
fn disabled_query_never_fetches_until_enabled() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();

    let observer = cache.observe(query_key!["holding", 1, "IBM"], manual.fetcher(), QueryOptions::disabled());
    pool.run_until_stalled();
    assert_eq!(manual.calls.get(), 0);
    assert_eq!(observer.state().status, QueryStatus::Idle);
    assert!(!observer.refetch());

    observer.set_enabled(true);
    assert_eq!(manual.calls.get(), 1);
    assert!(observer.state().is_pending());

    let _ = manual.take().send(Ok("held".into()));
    pool.run_until_stalled();

    // fresh data: toggling does not fetch again
    observer.set_enabled(false);
    observer.set_enabled(true);
    assert_eq!(manual.calls.get(), 1);
}

#[test]
fn later_fetch_wins_regardless_of_resolution_order() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let key = query_key!["intraday", "IBM"];

    let observer = cache.observe(key.clone(), manual.fetcher(), QueryOptions::default());
    let first = manual.take();
    assert_eq!(cache.invalidate(&key), 1);
    let second = manual.take();

    let _ = second.send(Ok("B".into()));
    pool.run_until_stalled();
    let _ = first.send(Ok("A".into()));
    pool.run_until_stalled();

    assert_eq!(observer.state().data().map(String::as_str), Some("B"));
    assert_eq!(observer.state().status, QueryStatus::Success);
}

#[test]
fn invalidate_keeps_previous_data_while_pending() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let observer = cache.observe(query_key!["holdings", 1], manual.fetcher(), QueryOptions::default());
    let _ = manual.take().send(Ok("v1".into()));
    pool.run_until_stalled();

    cache.invalidate(&query_key!["holdings"]);
    let state = observer.state();
    assert!(state.is_pending());
    assert_eq!(state.data().map(String::as_str), Some("v1"));
}

#[test]
fn invalidate_resets_unobserved_disabled_entries() {
    let pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let observer = cache.observe(query_key!["holding", 1, "IBM"], manual.fetcher(), QueryOptions::disabled());

    assert_eq!(cache.invalidate(&query_key!["holding", 1]), 1);
    assert_eq!(manual.calls.get(), 0);
    assert!(observer.state().is_idle());
}

#[test]
fn errors_stay_until_explicit_retry() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let observer = cache.observe(query_key!["stockDetail", "NOPE"], manual.fetcher(), QueryOptions::default());

    let _ = manual.take().send(Err(FetchError::application(200, "Stock not found")));
    pool.run_until_stalled();
    let state = observer.state();
    assert!(state.is_error());
    assert_eq!(state.error.map(|e| e.message()), Some("Stock not found".to_string()));
    assert_eq!(manual.calls.get(), 1);

    assert!(observer.refetch());
    assert_eq!(manual.calls.get(), 2);
    let _ = manual.take().send(Ok("found".into()));
    pool.run_until_stalled();
    assert!(observer.state().is_success());
}

#[test]
fn entry_is_collected_with_its_last_observer() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let key = query_key!["portfolioValue", 1];

    let observer = cache.observe(key.clone(), manual.fetcher(), QueryOptions::default());
    let late = manual.take();
    drop(observer);
    assert!(!cache.contains(&key));

    let _ = late.send(Ok("late".into()));
    pool.run_until_stalled();
    assert!(cache.is_empty());

    // a new observer starts over
    let again = cache.observe(key, manual.fetcher(), QueryOptions::default());
    assert!(again.state().is_pending());
    assert_eq!(manual.calls.get(), 2);
}

#[test]
fn listeners_follow_status_changes() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let observer = cache.observe(query_key!["intraday", "IBM"], manual.fetcher(), QueryOptions::disabled());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let watcher = cache.clone();
    let key = observer.key().clone();
    observer.on_change(move || log.borrow_mut().push(watcher.status(&key)));

    observer.set_enabled(true);
    let _ = manual.take().send(Ok("x".into()));
    pool.run_until_stalled();
    assert_eq!(
        *seen.borrow(),
        vec![Some(QueryStatus::Pending), Some(QueryStatus::Success)]
    );
}

#[test]
fn refetch_joins_a_fetch_in_flight() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let key = query_key!["portfolioValue", 1];

    let a = cache.observe(key.clone(), manual.fetcher(), QueryOptions::default());
    let b = cache.observe(key, manual.fetcher(), QueryOptions::default());
    assert!(a.refetch());
    assert!(b.refetch());
    assert_eq!(manual.calls.get(), 1);

    let _ = manual.take().send(Ok("1250".into()));
    pool.run_until_stalled();
    assert_eq!(b.state().data().map(String::as_str), Some("1250"));

    // settled: a retry goes to the network again
    assert!(a.refetch());
    assert_eq!(manual.calls.get(), 2);
}

#[test]
fn transport_errors_settle_like_backend_errors() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let manual = Manual::default();
    let observer = cache.observe(query_key!["holdings", 1], manual.fetcher(), QueryOptions::default());

    let _ = manual.take().send(Err(FetchError::Transport("offline".into())));
    pool.run_until_stalled();
    let state = observer.state();
    assert_eq!(state.status, QueryStatus::Error);
    assert_eq!(state.error.map(|e| e.message()), Some("Network error: offline".to_string()));
    assert!(state.data.is_none());
}

#[test]
fn reading_a_key_with_another_type_is_an_error() {
    let mut pool = LocalPool::new();
    let cache = cache(&pool);
    let key = query_key!["portfolioValue", 1];

    let value = cache.observe(key.clone(), || async { Ok::<_, FetchError>(7_u32) }, QueryOptions::default());
    pool.run_until_stalled();
    assert_eq!(value.state().data(), Some(&7));

    let state = cache.peek::<String>(&key).expect("entry exists");
    assert_eq!(state.status, QueryStatus::Error);
    assert!(matches!(state.error, Some(FetchError::TypeMismatch(_))));
    assert_eq!(cache.status(&key), Some(QueryStatus::Success));
}
