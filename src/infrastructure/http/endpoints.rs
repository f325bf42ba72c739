use crate::domain::portfolio::{HoldingId, Symbol, UserId};
use urlencoding::encode;

/// URL builder for the portfolio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn users(&self) -> String {
        format!("{}/api/users", self.base_url)
    }

    pub fn user_by_username(&self, username: &str) -> String {
        format!("{}/api/users/username/{}", self.base_url, encode(username))
    }

    pub fn initialize_portfolio(&self, username: &str) -> String {
        format!("{}/api/portfolio/initialize/{}", self.base_url, encode(username))
    }

    pub fn portfolio_value(&self, user_id: UserId) -> String {
        format!("{}/api/portfolio/value/{}", self.base_url, user_id)
    }

    pub fn stock_detail(&self, symbol: &Symbol) -> String {
        format!("{}/api/stocks/details/{}", self.base_url, encode(symbol.value()))
    }

    pub fn holding(&self, user_id: UserId, symbol: &Symbol) -> String {
        format!("{}/api/stocks/user/{}/{}", self.base_url, user_id, encode(symbol.value()))
    }

    pub fn holdings(&self, user_id: UserId) -> String {
        format!("{}/api/stocks/user/{}", self.base_url, user_id)
    }

    pub fn intraday(&self, symbol: &Symbol) -> String {
        format!("{}/api/stocks/{}/intra-day", self.base_url, encode(symbol.value()))
    }

    /// POST target for a new holding.
    pub fn add_holding(&self, user_id: UserId) -> String {
        format!("{}/api/stocks/{}", self.base_url, user_id)
    }

    /// PUT / DELETE target for an existing holding.
    pub fn holding_by_id(&self, id: HoldingId) -> String {
        format!("{}/api/stocks/{}", self.base_url, id)
    }
}
