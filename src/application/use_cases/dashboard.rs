//! Dashboard: total portfolio value and the list of holdings of the
//! signed-in user.

use super::error_watch::ErrorWatch;
use crate::application::context::AppContext;
use crate::application::keys;
use crate::domain::logging::LogComponent;
use crate::domain::portfolio::{Holding, UserId};
use crate::domain::query::{QueryObserver, QueryOptions, QueryState, QueryStatus};
use crate::domain::session::SessionGate;
use std::cell::RefCell;
use std::rc::Rc;

struct UserQueries {
    user: UserId,
    value: QueryObserver<f64>,
    holdings: QueryObserver<Vec<Holding>>,
}

struct DashboardInner {
    ctx: AppContext,
    queries: RefCell<Option<UserQueries>>,
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
    value_errors: ErrorWatch,
    holdings_errors: ErrorWatch,
}

/// Follows the session: queries exist only while a user is signed in and
/// are swapped when the user changes.
pub struct DashboardView {
    inner: Rc<DashboardInner>,
    session_listener: u64,
}

impl DashboardView {
    pub fn open(ctx: &AppContext) -> Self {
        let inner = Rc::new(DashboardInner {
            ctx: ctx.clone(),
            queries: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            value_errors: ErrorWatch::new("Dashboard"),
            holdings_errors: ErrorWatch::new("Dashboard"),
        });

        let weak = Rc::downgrade(&inner);
        let session_listener = ctx.session.subscribe(move |gate| {
            if let Some(inner) = weak.upgrade() {
                DashboardInner::follow(&inner, gate);
                inner.emit();
            }
        });

        DashboardInner::follow(&inner, &ctx.session.gate());
        Self { inner, session_listener }
    }

    pub fn gate(&self) -> SessionGate {
        self.inner.ctx.session.gate()
    }

    pub fn should_redirect_to_login(&self) -> bool {
        self.gate().should_redirect_to_login()
    }

    pub fn portfolio_value(&self) -> QueryState<f64> {
        self.inner
            .queries
            .borrow()
            .as_ref()
            .map(|q| q.value.state())
            .unwrap_or_default()
    }

    pub fn holdings(&self) -> QueryState<Vec<Holding>> {
        self.inner
            .queries
            .borrow()
            .as_ref()
            .map(|q| q.holdings.state())
            .unwrap_or_default()
    }

    pub fn status(&self) -> QueryStatus {
        let statuses = [self.portfolio_value().status, self.holdings().status];
        if statuses.contains(&QueryStatus::Error) {
            QueryStatus::Error
        } else if statuses.contains(&QueryStatus::Pending) {
            QueryStatus::Pending
        } else if statuses.iter().all(|s| *s == QueryStatus::Success) {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }

    /// Re-reads both queries, keeping the current data on screen meanwhile.
    pub fn refresh(&self) -> bool {
        let queries = self.inner.queries.borrow();
        match queries.as_ref() {
            Some(q) => q.value.refetch() & q.holdings.refetch(),
            None => false,
        }
    }

    pub fn on_change(&self, listener: impl Fn() + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.inner.ctx.session.unsubscribe(self.session_listener);
        self.inner.queries.borrow_mut().take();
    }
}

impl DashboardInner {
    fn follow(this: &Rc<Self>, gate: &SessionGate) {
        let user = gate.identity().map(|identity| identity.id);
        let current = this.queries.borrow().as_ref().map(|q| q.user);
        if current == user {
            return;
        }

        let next = user.map(|user| Self::build(this, user));
        let stale = std::mem::replace(&mut *this.queries.borrow_mut(), next);
        drop(stale);
    }

    fn build(this: &Rc<Self>, user: UserId) -> UserQueries {
        crate::log_debug!(LogComponent::Application("Dashboard"), "📋 Loading dashboard of user {}", user);

        let (api, session) = (this.ctx.api.clone(), this.ctx.session.clone());
        let value = this.ctx.queries.observe(
            keys::portfolio_value(user),
            move || {
                let request = session.require_user(user).map(|user| api.fetch_portfolio_value(user));
                async move { request?.await }
            },
            QueryOptions::default(),
        );
        let (api, session) = (this.ctx.api.clone(), this.ctx.session.clone());
        let holdings = this.ctx.queries.observe(
            keys::holdings(user),
            move || {
                let request = session.require_user(user).map(|user| api.fetch_holdings(user));
                async move { request?.await }
            },
            QueryOptions::default(),
        );

        let weak = Rc::downgrade(this);
        value.on_change(move || {
            if let Some(inner) = weak.upgrade() {
                let state = inner.queries.borrow().as_ref().map(|q| q.value.state());
                if let Some(state) = state {
                    inner.value_errors.check(&state, &inner.ctx.notifications);
                }
                inner.emit();
            }
        });
        let weak = Rc::downgrade(this);
        holdings.on_change(move || {
            if let Some(inner) = weak.upgrade() {
                let state = inner.queries.borrow().as_ref().map(|q| q.holdings.state());
                if let Some(state) = state {
                    inner.holdings_errors.check(&state, &inner.ctx.notifications);
                }
                inner.emit();
            }
        });

        UserQueries { user, value, holdings }
    }

    fn emit(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }
}
