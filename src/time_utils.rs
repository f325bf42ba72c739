use chrono::NaiveDateTime;

/// Timestamp layout used by the intraday endpoint: `2024-03-01 15:55:00`.
pub const SERIES_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_series_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), SERIES_TIMESTAMP_FORMAT).ok()
}

/// Axis / caption label for a series point.
///
/// - `intraday == true` -> `HH:MM`
/// - otherwise -> `DD.MM`
pub fn format_time_label(timestamp: NaiveDateTime, intraday: bool) -> String {
    if intraday {
        timestamp.format("%H:%M").to_string()
    } else {
        timestamp.format("%d.%m").to_string()
    }
}
