use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Exchange API error: {0}")]
    Exchange(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Indicators incomplete on the latest candle")]
    IncompleteIndicators,

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any fetch-side failure as `DataUnavailable` for `symbol`.
    pub fn data_unavailable(symbol: &str, reason: impl std::fmt::Display) -> Self {
        Error::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
