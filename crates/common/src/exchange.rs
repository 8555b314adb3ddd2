use async_trait::async_trait;

use crate::{Candle, Result};

/// Read-only market data source.
///
/// `BinanceClient` in `crates/engine` implements this against the REST API.
/// The scanner only ever pulls through this trait, so tests substitute an
/// in-memory source.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// All tradeable symbols whose name ends with `quote_asset` (e.g. "USDT").
    async fn list_symbols(&self, quote_asset: &str) -> Result<Vec<String>>;

    /// The most recent `limit` candles for `symbol`, oldest first.
    async fn recent_candles(&self, symbol: &str, interval: &str, limit: usize)
        -> Result<Vec<Candle>>;
}
