use derive_more::{Constructor, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into, Display, Constructor, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Backend id of one holding row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into, Display, Constructor, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldingId(i64);

impl HoldingId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Ticker symbol, always trimmed and upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// `None` when nothing but whitespace was given.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl From<String> for Symbol {
    fn from(raw: String) -> Self {
        Symbol::from(raw.as_str())
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalized() {
        assert_eq!(Symbol::from("  aapl ").value(), "AAPL");
        assert_eq!(Symbol::parse("msft"), Some(Symbol::from("MSFT")));
        assert_eq!(Symbol::parse("   "), None);
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let symbol: Symbol = serde_json::from_str("\"IBM\"").unwrap();
        assert_eq!(symbol.value(), "IBM");
    }
}
