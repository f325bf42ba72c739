//! Stock page: metadata first, then the user's holding and the intraday
//! series for the symbol the metadata resolved.

use super::error_watch::ErrorWatch;
use crate::application::context::AppContext;
use crate::application::keys;
use crate::domain::errors::StatsError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::portfolio::{Holding, IntradaySeries, StockDetail, Symbol, UserId};
use crate::domain::query::{QueryObserver, QueryOptions, QueryState, QueryStatus};
use crate::domain::stats::Stats;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type ViewListener = Rc<dyn Fn()>;

/// Observers created once the metadata query succeeded.
struct Dependents {
    resolved: Symbol,
    user: Option<UserId>,
    holding: Option<QueryObserver<Holding>>,
    intraday: QueryObserver<IntradaySeries>,
}

struct StockViewInner {
    ctx: AppContext,
    symbol: Symbol,
    detail: QueryObserver<StockDetail>,
    dependents: RefCell<Option<Dependents>>,
    listeners: RefCell<Vec<ViewListener>>,
    detail_errors: ErrorWatch,
    holding_errors: ErrorWatch,
    intraday_errors: ErrorWatch,
}

/// Live view over the three queries behind a stock page.
///
/// The holding and intraday queries never start before the metadata query
/// succeeded; while it is pending or failed they stay idle.
pub struct StockView {
    inner: Rc<StockViewInner>,
    session_listener: u64,
}

impl StockView {
    pub fn open(ctx: &AppContext, symbol: Symbol) -> Self {
        let api = ctx.api.clone();
        let requested = symbol.clone();
        let detail = ctx.queries.observe(
            keys::stock_detail(&symbol),
            move || api.fetch_stock_detail(requested.clone()),
            QueryOptions::default(),
        );

        get_logger().info(LogComponent::Application("StockView"), &format!("📊 Opening {symbol}"));

        let inner = Rc::new(StockViewInner {
            ctx: ctx.clone(),
            symbol,
            detail,
            dependents: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            detail_errors: ErrorWatch::new("StockView"),
            holding_errors: ErrorWatch::new("StockView"),
            intraday_errors: ErrorWatch::new("StockView"),
        });

        let weak = Rc::downgrade(&inner);
        inner.detail.on_change(move || {
            if let Some(inner) = weak.upgrade() {
                inner.detail_errors.check(&inner.detail.state(), &inner.ctx.notifications);
                StockViewInner::sync(&inner);
                inner.emit();
            }
        });

        // a different identity means a different holding key
        let weak = Rc::downgrade(&inner);
        let session_listener = ctx.session.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                StockViewInner::sync(&inner);
                inner.emit();
            }
        });

        StockViewInner::sync(&inner);
        Self { inner, session_listener }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.inner.symbol
    }

    pub fn detail(&self) -> QueryState<StockDetail> {
        self.inner.detail.state()
    }

    /// Idle until the metadata resolved and a user is signed in.
    pub fn holding(&self) -> QueryState<Holding> {
        self.inner
            .dependents
            .borrow()
            .as_ref()
            .and_then(|d| d.holding.as_ref().map(QueryObserver::state))
            .unwrap_or_default()
    }

    pub fn intraday(&self) -> QueryState<IntradaySeries> {
        self.inner
            .dependents
            .borrow()
            .as_ref()
            .map(|d| d.intraday.state())
            .unwrap_or_default()
    }

    /// `None` until an intraday series is available.
    pub fn stats(&self) -> Option<Result<Stats, StatsError>> {
        self.intraday().data().map(IntradaySeries::stats)
    }

    /// Combined status: any error wins, then any pending fetch.
    pub fn status(&self) -> QueryStatus {
        let detail = self.detail().status;
        let dependents = self.inner.dependents.borrow();
        let mut statuses = vec![detail];
        if let Some(d) = dependents.as_ref() {
            statuses.push(d.intraday.state().status);
            if let Some(holding) = &d.holding {
                statuses.push(holding.state().status);
            }
        }

        if statuses.contains(&QueryStatus::Error) {
            QueryStatus::Error
        } else if statuses.contains(&QueryStatus::Pending) {
            QueryStatus::Pending
        } else if detail == QueryStatus::Success && dependents.is_some() && statuses.iter().all(|s| *s == QueryStatus::Success) {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status() == QueryStatus::Pending
    }

    /// Retries every query of the page that ended in error.
    pub fn retry(&self) {
        if self.inner.detail.state().is_error() {
            self.inner.detail.refetch();
        }
        let dependents = self.inner.dependents.borrow();
        if let Some(d) = dependents.as_ref() {
            if d.intraday.state().is_error() {
                d.intraday.refetch();
            }
            if let Some(holding) = d.holding.as_ref().filter(|h| h.state().is_error()) {
                holding.refetch();
            }
        }
    }

    /// Called after any of the underlying queries changed.
    pub fn on_change(&self, listener: impl Fn() + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }
}

impl Drop for StockView {
    fn drop(&mut self) {
        self.inner.ctx.session.unsubscribe(self.session_listener);
        self.inner.dependents.borrow_mut().take();
    }
}

impl StockViewInner {
    /// Creates the dependent observers once the metadata is available, and
    /// re-creates them when the resolved symbol or the signed-in user changes.
    fn sync(this: &Rc<Self>) {
        let state = this.detail.state();
        let Some(detail) = state.data().filter(|_| state.is_success()) else {
            return;
        };
        let resolved = detail.symbol.clone();
        let user = this.ctx.session.identity().map(|identity| identity.id);
        let unchanged = this
            .dependents
            .borrow()
            .as_ref()
            .is_some_and(|d| d.resolved == resolved && d.user == user);
        if unchanged {
            return;
        }

        // new observers first, so shared entries survive the swap
        let dependents = Self::build_dependents(this, resolved, user);
        let stale = this.dependents.borrow_mut().replace(dependents);
        drop(stale);
    }

    fn build_dependents(this: &Rc<Self>, resolved: Symbol, user: Option<UserId>) -> Dependents {
        let ctx = &this.ctx;
        crate::log_debug!(
            LogComponent::Application("StockView"),
            "🔗 {} resolved, starting dependent queries",
            resolved
        );

        let holding = user.map(|user_id| {
            let api = ctx.api.clone();
            let session = ctx.session.clone();
            let symbol = resolved.clone();
            let observer = ctx.queries.observe(
                keys::holding(user_id, &resolved),
                move || {
                    let request = session
                        .require_user(user_id)
                        .map(|user| api.fetch_holding(user, symbol.clone()));
                    async move { request?.await }
                },
                QueryOptions::default(),
            );
            let weak = Rc::downgrade(this);
            observer.on_change(move || {
                Self::with(&weak, |inner| {
                    if let Some(state) = inner.dependent_state(|d| d.holding.as_ref().map(QueryObserver::state)) {
                        inner.holding_errors.check(&state, &inner.ctx.notifications);
                    }
                })
            });
            observer
        });

        let api = ctx.api.clone();
        let symbol = resolved.clone();
        let intraday = ctx.queries.observe(
            keys::intraday(&resolved),
            move || api.fetch_intraday(symbol.clone()),
            QueryOptions::default(),
        );
        let weak = Rc::downgrade(this);
        intraday.on_change(move || {
            Self::with(&weak, |inner| {
                if let Some(state) = inner.dependent_state(|d| Some(d.intraday.state())) {
                    inner.intraday_errors.check(&state, &inner.ctx.notifications);
                }
            })
        });

        Dependents { resolved, user, holding, intraday }
    }

    fn dependent_state<T>(&self, pick: impl Fn(&Dependents) -> Option<QueryState<T>>) -> Option<QueryState<T>> {
        self.dependents.borrow().as_ref().and_then(pick)
    }

    fn with(weak: &Weak<Self>, f: impl FnOnce(&Self)) {
        if let Some(inner) = weak.upgrade() {
            f(&inner);
            inner.emit();
        }
    }

    fn emit(&self) {
        let listeners: Vec<ViewListener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }
}
