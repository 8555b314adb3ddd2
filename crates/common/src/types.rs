use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One closed kline as returned by the exchange REST API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// True when the candle closed below its open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }
}

/// Direction of an alert. "No signal" is expressed as `Option::<Signal>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Long,
    Short,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Long => write!(f, "LONG"),
            Signal::Short => write!(f, "SHORT"),
        }
    }
}

/// Which market the scanner watches. Selects the quote-asset filter and the
/// leverage printed in alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketMode {
    Futures,
    Spot,
}

impl MarketMode {
    pub fn is_futures(&self) -> bool {
        matches!(self, MarketMode::Futures)
    }
}

impl std::fmt::Display for MarketMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketMode::Futures => write!(f, "futures"),
            MarketMode::Spot => write!(f, "spot"),
        }
    }
}

impl std::str::FromStr for MarketMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "futures" => Ok(MarketMode::Futures),
            "spot" => Ok(MarketMode::Spot),
            other => Err(format!("expected 'futures' or 'spot', got '{other}'")),
        }
    }
}
