//! Summary statistics over an intraday price series.
//!
//! Chronology always comes from the timestamps. The delivered order is only
//! used to break ties between points that share a timestamp.

use crate::domain::errors::StatsError;
use crate::domain::portfolio::PricePoint;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub close: f64,
}

impl Stats {
    pub fn change(&self) -> f64 {
        self.close - self.open
    }

    /// `None` when the series opened at zero.
    pub fn change_percent(&self) -> Option<f64> {
        if self.open == 0.0 {
            None
        } else {
            Some(self.change() / self.open * 100.0)
        }
    }
}

/// Points sorted oldest-first.
pub fn chronological(series: &[PricePoint], newest_first: bool) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = if newest_first {
        series.iter().rev().copied().collect()
    } else {
        series.to_vec()
    };
    // stable: equal timestamps keep the order implied by `newest_first`
    points.sort_by_key(|p| p.timestamp);
    points
}

pub fn compute_stats(series: &[PricePoint], newest_first: bool) -> Result<Stats, StatsError> {
    let points = chronological(series, newest_first);
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(StatsError::EmptySeries),
    };

    let (high, low) = points.iter().fold((f64::NEG_INFINITY, f64::INFINITY), |(high, low), p| {
        (high.max(p.price), low.min(p.price))
    });

    Ok(Stats { high, low, open: first.price, close: last.price })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, minute, 0).unwrap()
    }

    #[test]
    fn tied_timestamps_follow_delivered_order() {
        // newest-first delivery: the first element is the later of the pair
        let series = vec![PricePoint::new(at(5), 2.0), PricePoint::new(at(5), 1.0)];
        let stats = compute_stats(&series, true).unwrap();
        assert_eq!(stats.open, 1.0);
        assert_eq!(stats.close, 2.0);
    }

    #[test]
    fn change_percent_guards_zero_open() {
        let stats = Stats { high: 1.0, low: 0.0, open: 0.0, close: 1.0 };
        assert_eq!(stats.change_percent(), None);
        let stats = Stats { high: 12.0, low: 10.0, open: 10.0, close: 12.0 };
        assert_eq!(stats.change(), 2.0);
        assert_eq!(stats.change_percent(), Some(20.0));
    }
}
