#![allow(dead_code)]

use chrono::NaiveDate;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use portfolio_sync::AppConfig;
use portfolio_sync::application::AppContext;
use portfolio_sync::domain::errors::{FetchError, FetchResult, StorageError};
use portfolio_sync::domain::portfolio::{
    ApiFuture, Holding, HoldingDraft, HoldingId, Identity, IntradaySeries, PortfolioApi, PricePoint, SeriesOrder,
    StockDetail, Symbol, UserId,
};
use portfolio_sync::domain::session::DurableStorage;
use portfolio_sync::infrastructure::runtime::ManualScheduler;
use portfolio_sync::infrastructure::storage::MemoryStorage;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Canned backend. Every call is recorded; calls to a `hold`-ed method wait
/// until `release` is called for it.
pub struct StubApi {
    pub calls: RefCell<Vec<&'static str>>,
    held: RefCell<HashSet<&'static str>>,
    waiting: RefCell<Vec<(&'static str, oneshot::Sender<()>)>>,
    pub user: RefCell<FetchResult<Identity>>,
    pub initialize: RefCell<FetchResult<()>>,
    pub detail: RefCell<FetchResult<StockDetail>>,
    pub holding: RefCell<FetchResult<Holding>>,
    pub holdings: RefCell<FetchResult<Vec<Holding>>>,
    pub value: RefCell<FetchResult<f64>>,
    pub intraday: RefCell<FetchResult<IntradaySeries>>,
    pub mutation: RefCell<FetchResult<Holding>>,
}

impl Default for StubApi {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            held: RefCell::new(HashSet::new()),
            waiting: RefCell::new(Vec::new()),
            user: RefCell::new(Ok(alice())),
            initialize: RefCell::new(Ok(())),
            detail: RefCell::new(Ok(detail("IBM"))),
            holding: RefCell::new(Ok(holding(1, "IBM"))),
            holdings: RefCell::new(Ok(vec![holding(1, "IBM")])),
            value: RefCell::new(Ok(1250.0)),
            intraday: RefCell::new(Ok(series("IBM", &[(1, 10.0), (2, 15.0), (3, 5.0)]))),
            mutation: RefCell::new(Ok(holding(2, "AAPL"))),
        }
    }
}

impl StubApi {
    pub fn hold(&self, method: &'static str) {
        self.held.borrow_mut().insert(method);
    }

    /// Lets every waiting call of `method` complete and stops holding it.
    pub fn release(&self, method: &'static str) {
        self.held.borrow_mut().remove(method);
        let mut waiting = self.waiting.borrow_mut();
        let (ready, rest): (Vec<_>, Vec<_>) = waiting.drain(..).partition(|(m, _)| *m == method);
        *waiting = rest;
        for (_, tx) in ready {
            let _ = tx.send(());
        }
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| **m == method).count()
    }

    fn respond<T: 'static>(&self, method: &'static str, value: FetchResult<T>) -> ApiFuture<T> {
        self.calls.borrow_mut().push(method);
        let gate = if self.held.borrow().contains(method) {
            let (tx, rx) = oneshot::channel();
            self.waiting.borrow_mut().push((method, tx));
            Some(rx)
        } else {
            None
        };
        async move {
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            value
        }
        .boxed_local()
    }
}

impl PortfolioApi for StubApi {
    fn fetch_user_by_username(&self, _username: String) -> ApiFuture<Identity> {
        self.respond("fetch_user_by_username", self.user.borrow().clone())
    }

    fn create_user(&self, _username: String) -> ApiFuture<Identity> {
        self.respond("create_user", self.user.borrow().clone())
    }

    fn initialize_portfolio(&self, _username: String) -> ApiFuture<()> {
        self.respond("initialize_portfolio", self.initialize.borrow().clone())
    }

    fn fetch_portfolio_value(&self, _user_id: UserId) -> ApiFuture<f64> {
        self.respond("fetch_portfolio_value", self.value.borrow().clone())
    }

    fn fetch_stock_detail(&self, _symbol: Symbol) -> ApiFuture<StockDetail> {
        self.respond("fetch_stock_detail", self.detail.borrow().clone())
    }

    fn fetch_holding(&self, _user_id: UserId, _symbol: Symbol) -> ApiFuture<Holding> {
        self.respond("fetch_holding", self.holding.borrow().clone())
    }

    fn fetch_holdings(&self, _user_id: UserId) -> ApiFuture<Vec<Holding>> {
        self.respond("fetch_holdings", self.holdings.borrow().clone())
    }

    fn fetch_intraday(&self, _symbol: Symbol) -> ApiFuture<IntradaySeries> {
        self.respond("fetch_intraday", self.intraday.borrow().clone())
    }

    fn add_holding(&self, _user_id: UserId, _draft: HoldingDraft) -> ApiFuture<Holding> {
        self.respond("add_holding", self.mutation.borrow().clone())
    }

    fn update_holding(&self, _id: HoldingId, _draft: HoldingDraft) -> ApiFuture<Holding> {
        self.respond("update_holding", self.mutation.borrow().clone())
    }

    fn delete_holding(&self, _id: HoldingId) -> ApiFuture<()> {
        self.respond("delete_holding", Ok(()))
    }
}

/// Storage whose writes always fail.
pub struct ReadOnlyStorage(pub MemoryStorage);

impl DurableStorage for ReadOnlyStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.read(key)
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write("quota exceeded".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Write("quota exceeded".to_string()))
    }
}

pub struct Harness {
    pub pool: LocalPool,
    pub ctx: AppContext,
    pub api: Rc<StubApi>,
    pub storage: MemoryStorage,
    pub scheduler: ManualScheduler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    pub fn with_storage(storage: MemoryStorage) -> Self {
        let pool = LocalPool::new();
        let api = Rc::new(StubApi::default());
        let scheduler = ManualScheduler::new();
        let ctx = AppContext::new(
            AppConfig::default(),
            Rc::new(storage.clone()),
            api.clone(),
            Rc::new(pool.spawner()),
            Rc::new(scheduler.clone()),
        );
        Self { pool, ctx, api, storage, scheduler }
    }

    /// Context with hydration finished and `alice` signed in.
    pub fn signed_in() -> Self {
        let mut harness = Self::new();
        harness.ctx.init();
        harness.run();
        let _ = harness.ctx.session.set_identity(Some(alice()));
        harness
    }

    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn messages(&self) -> Vec<String> {
        self.ctx.notifications.notifications().into_iter().map(|n| n.message).collect()
    }
}

pub fn alice() -> Identity {
    Identity::new(UserId::new(1), "alice")
}

pub fn detail(symbol: &str) -> StockDetail {
    StockDetail {
        symbol: Symbol::from(symbol),
        name: format!("{symbol} Corp"),
        sector: "TECHNOLOGY".to_string(),
        industry: "COMPUTER".to_string(),
        description: String::new(),
        market_capitalization: "1000".to_string(),
    }
}

pub fn holding(id: i64, ticker: &str) -> Holding {
    Holding {
        id: HoldingId::new(id),
        ticker: Symbol::from(ticker),
        quantity: 3.0,
        buy_price: 100.0,
    }
}

/// `(minute, price)` pairs on 2024-03-01 10:xx, delivered newest-first.
pub fn series(symbol: &str, points: &[(u32, f64)]) -> IntradaySeries {
    let mut points: Vec<PricePoint> = points
        .iter()
        .map(|(minute, price)| PricePoint::new(at(*minute), *price))
        .collect();
    points.reverse();
    IntradaySeries::new(Symbol::from(symbol), points, SeriesOrder::NewestFirst)
}

pub fn at(minute: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(10, minute, 0))
        .expect("valid test timestamp")
}

pub fn fetch_error(message: &str) -> FetchError {
    FetchError::application(404, message)
}
