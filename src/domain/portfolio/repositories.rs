use super::{Holding, HoldingDraft, HoldingId, Identity, IntradaySeries, StockDetail, Symbol, UserId};
use crate::domain::errors::FetchResult;
use futures::future::LocalBoxFuture;

pub type ApiFuture<T> = LocalBoxFuture<'static, FetchResult<T>>;

/// Backend operations the client depends on.
///
/// Futures own their inputs so they can be stored as re-runnable query
/// fetchers.
pub trait PortfolioApi {
    fn fetch_user_by_username(&self, username: String) -> ApiFuture<Identity>;
    fn create_user(&self, username: String) -> ApiFuture<Identity>;
    fn initialize_portfolio(&self, username: String) -> ApiFuture<()>;

    fn fetch_portfolio_value(&self, user_id: UserId) -> ApiFuture<f64>;
    fn fetch_stock_detail(&self, symbol: Symbol) -> ApiFuture<StockDetail>;
    fn fetch_holding(&self, user_id: UserId, symbol: Symbol) -> ApiFuture<Holding>;
    fn fetch_holdings(&self, user_id: UserId) -> ApiFuture<Vec<Holding>>;
    fn fetch_intraday(&self, symbol: Symbol) -> ApiFuture<IntradaySeries>;

    fn add_holding(&self, user_id: UserId, draft: HoldingDraft) -> ApiFuture<Holding>;
    fn update_holding(&self, id: HoldingId, draft: HoldingDraft) -> ApiFuture<Holding>;
    fn delete_holding(&self, id: HoldingId) -> ApiFuture<()>;
}
