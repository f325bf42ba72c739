//! Query keys shared by views and the mutations that invalidate them.

use crate::domain::portfolio::{Symbol, UserId};
use crate::domain::query::QueryKey;

pub const STOCK_DETAIL: &str = "stockDetail";
pub const HOLDING: &str = "holding";
pub const HOLDINGS: &str = "holdings";
pub const INTRADAY: &str = "intraday";
pub const PORTFOLIO_VALUE: &str = "portfolioValue";

pub fn stock_detail(symbol: &Symbol) -> QueryKey {
    query_key![STOCK_DETAIL, symbol]
}

pub fn holding(user_id: UserId, symbol: &Symbol) -> QueryKey {
    query_key![HOLDING, user_id, symbol]
}

pub fn intraday(symbol: &Symbol) -> QueryKey {
    query_key![INTRADAY, symbol]
}

pub fn holdings(user_id: UserId) -> QueryKey {
    query_key![HOLDINGS, user_id]
}

pub fn portfolio_value(user_id: UserId) -> QueryKey {
    query_key![PORTFOLIO_VALUE, user_id]
}

/// Every per-symbol holding of one user.
pub fn user_holdings_prefix(user_id: UserId) -> QueryKey {
    query_key![HOLDING, user_id]
}
