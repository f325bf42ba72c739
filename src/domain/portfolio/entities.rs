use super::value_objects::{HoldingId, Symbol, UserId};
use crate::domain::errors::{FormErrors, ValidationError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

/// The signed-in user. Persisted as `{"id":..,"username":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
}

impl Identity {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self { id, username: username.into() }
    }
}

/// Company overview for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDetail {
    pub symbol: Symbol,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub description: String,
    pub market_capitalization: String,
}

/// A position the user holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,
    pub ticker: Symbol,
    pub quantity: f64,
    pub buy_price: f64,
}

impl Holding {
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.buy_price
    }
}

/// Validated holding payload, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingDraft {
    pub ticker: Symbol,
    pub quantity: f64,
    #[serde(rename = "buyPrice")]
    pub buy_price: f64,
}

/// Raw add/update form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingForm {
    pub ticker: String,
    pub quantity: String,
    pub buy_price: String,
}

impl HoldingForm {
    pub fn new(ticker: impl Into<String>, quantity: impl Into<String>, buy_price: impl Into<String>) -> Self {
        Self { ticker: ticker.into(), quantity: quantity.into(), buy_price: buy_price.into() }
    }

    /// Prefill for the update form.
    pub fn from_holding(holding: &Holding) -> Self {
        Self::new(
            holding.ticker.value(),
            holding.quantity.to_string(),
            holding.buy_price.to_string(),
        )
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<HoldingDraft, FormErrors> {
        let mut errors = FormErrors::default();

        let ticker = Symbol::parse(&self.ticker);
        if ticker.is_none() {
            errors.push(ValidationError::EmptyTicker);
        }
        let quantity = positive_number(&self.quantity, "quantity", ValidationError::NonPositiveQuantity)
            .map_err(|e| errors.push(e))
            .ok();
        let buy_price = positive_number(&self.buy_price, "buyPrice", ValidationError::NonPositiveBuyPrice)
            .map_err(|e| errors.push(e))
            .ok();

        match (ticker, quantity, buy_price) {
            (Some(ticker), Some(quantity), Some(buy_price)) if errors.is_empty() => {
                Ok(HoldingDraft { ticker, quantity, buy_price })
            }
            _ => Err(errors),
        }
    }
}

fn positive_number(raw: &str, field: &'static str, non_positive: ValidationError) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(non_positive);
    }
    let value: f64 = raw.parse().map_err(|_| ValidationError::NotANumber { field })?;
    if !value.is_finite() {
        return Err(ValidationError::NotANumber { field });
    }
    if value <= 0.0 {
        return Err(non_positive);
    }
    Ok(value)
}

/// Position of the most recent point in a delivered series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, StrumDisplay, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum SeriesOrder {
    NewestFirst,
    OldestFirst,
}

impl SeriesOrder {
    pub fn is_newest_first(self) -> bool {
        matches!(self, SeriesOrder::NewestFirst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: NaiveDateTime, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Intraday closes for one symbol with the order they were stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradaySeries {
    pub symbol: Symbol,
    pub points: Vec<PricePoint>,
    pub order: SeriesOrder,
}

impl IntradaySeries {
    pub fn new(symbol: Symbol, points: Vec<PricePoint>, order: SeriesOrder) -> Self {
        Self { symbol, points, order }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points oldest-first, sorted by timestamp. Ties keep their delivered
    /// chronological order.
    pub fn chronological(&self) -> Vec<PricePoint> {
        crate::domain::stats::chronological(&self.points, self.order.is_newest_first())
    }

    pub fn stats(&self) -> Result<crate::domain::stats::Stats, crate::domain::errors::StatsError> {
        crate::domain::stats::compute_stats(&self.points, self.order.is_newest_first())
    }
}
