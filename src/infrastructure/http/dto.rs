//! Wire shapes of the portfolio backend and their conversion to domain types.

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::portfolio::{
    Holding, HoldingId, Identity, IntradaySeries, PricePoint, SeriesOrder, StockDetail, Symbol, UserId,
};
use crate::time_utils::parse_series_timestamp;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub const INTRADAY_SERIES_FIELD: &str = "Time Series (5min)";

/// `{ "message": .., "data": .., "success": .. }`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub success: Option<bool>,
}

impl<T> Envelope<T> {
    /// A 2xx body can still report `success: false`.
    pub fn into_data(self, status: u16) -> FetchResult<T> {
        if self.success == Some(false) {
            return Err(FetchError::application(
                status,
                self.message.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        self.data.ok_or_else(|| {
            FetchError::application(
                status,
                self.message.unwrap_or_else(|| "Response did not contain data".to_string()),
            )
        })
    }
}

/// Body of a non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Message for a failed response: the body's `message` or a generic one.
pub fn error_from_body(status: u16, body: &str) -> FetchError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error: {status}"));
    FetchError::application(status, message)
}

pub fn decode<T: DeserializeOwned>(status: u16, body: &str) -> FetchResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| FetchError::application(status, format!("Invalid response: {e}")))?;
    envelope.into_data(status)
}

/// For calls whose payload is irrelevant; only an explicit `success: false` fails.
pub fn decode_ack(status: u16, body: &str) -> FetchResult<()> {
    match serde_json::from_str::<Envelope<serde::de::IgnoredAny>>(body) {
        Ok(envelope) if envelope.success == Some(false) => Err(FetchError::application(
            status,
            envelope.message.unwrap_or_else(|| "Request failed".to_string()),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
}

impl From<UserDto> for Identity {
    fn from(dto: UserDto) -> Self {
        Identity::new(UserId::new(dto.id), dto.username)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StockDetailDto {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub market_capitalization: String,
}

impl From<StockDetailDto> for StockDetail {
    fn from(dto: StockDetailDto) -> Self {
        StockDetail {
            symbol: Symbol::from(dto.symbol),
            name: dto.name,
            sector: dto.sector,
            industry: dto.industry,
            description: dto.description,
            market_capitalization: dto.market_capitalization,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDto {
    pub id: i64,
    pub ticker: String,
    pub quantity: f64,
    pub buy_price: f64,
}

impl From<HoldingDto> for Holding {
    fn from(dto: HoldingDto) -> Self {
        Holding {
            id: HoldingId::new(dto.id),
            ticker: Symbol::from(dto.ticker),
            quantity: dto.quantity,
            buy_price: dto.buy_price,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IntradayBarDto {
    #[serde(rename = "4. close")]
    pub close: String,
}

#[derive(Debug, Deserialize)]
pub struct IntradayDto {
    #[serde(rename = "Time Series (5min)", default)]
    pub time_series: Option<HashMap<String, IntradayBarDto>>,
}

impl IntradayDto {
    /// JSON objects carry no usable order, so points are sorted by their
    /// parsed timestamps and tagged oldest-first.
    pub fn into_series(self, symbol: Symbol, status: u16) -> FetchResult<IntradaySeries> {
        let bars = self.time_series.ok_or_else(|| {
            FetchError::application(status, format!("Response has no \"{INTRADAY_SERIES_FIELD}\" section"))
        })?;

        let mut points = Vec::with_capacity(bars.len());
        for (raw_time, bar) in bars {
            let timestamp = parse_series_timestamp(&raw_time)
                .ok_or_else(|| FetchError::application(status, format!("Invalid timestamp '{raw_time}'")))?;
            let price = bar
                .close
                .trim()
                .parse::<f64>()
                .map_err(|_| FetchError::application(status, format!("Invalid close price '{}'", bar.close)))?;
            points.push(PricePoint::new(timestamp, price));
        }
        points.sort_by_key(|p| p.timestamp);

        Ok(IntradaySeries::new(symbol, points, SeriesOrder::OldestFirst))
    }
}
