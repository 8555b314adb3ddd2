use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use common::{Candle, Error, MarketData, Result};

/// REST API client for Binance public market data.
///
/// Only unsigned endpoints are used; the API key is sent as `X-MBX-APIKEY`
/// so requests count against the account's rate limits.
pub struct BinanceClient {
    api_key: String,
    base_url: Url,
    http: Client,
}

impl BinanceClient {
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| Error::Config(format!("invalid base URL: {e}")))?;
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url,
            http,
        })
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| Error::Http(e.to_string()))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let resp = self
            .http
            .get(url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    async fn list_symbols(&self, quote_asset: &str) -> Result<Vec<String>> {
        let body = self.get("/api/v3/ticker/price", &[]).await?;
        parse_symbols(&body, quote_asset)
    }

    async fn recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        debug!(symbol = %symbol, interval = %interval, limit, "Fetching klines");
        let limit = limit.to_string();
        let body = self
            .get(
                "/api/v3/klines",
                &[("symbol", symbol), ("interval", interval), ("limit", &limit)],
            )
            .await?;
        parse_klines(&body)
    }
}

// ─── Response parsing ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PriceTicker {
    symbol: String,
}

fn parse_symbols(body: &str, quote_asset: &str) -> Result<Vec<String>> {
    let tickers: Vec<PriceTicker> = serde_json::from_str(body)?;
    Ok(tickers
        .into_iter()
        .map(|t| t.symbol)
        .filter(|s| s.ends_with(quote_asset))
        .collect())
}

/// Parse the `/api/v3/klines` array-of-arrays payload.
///
/// Row layout: `[open_time_ms, "open", "high", "low", "close", "volume", ...]`.
/// Any malformed row or non-increasing open time rejects the whole window.
fn parse_klines(body: &str) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(body)?;
    let mut candles: Vec<Candle> = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let candle = parse_kline_row(row)
            .ok_or_else(|| Error::Exchange(format!("malformed kline row {i}: {row:?}")))?;
        if let Some(prev) = candles.last() {
            if candle.open_time <= prev.open_time {
                return Err(Error::Exchange(format!(
                    "kline row {i} is out of order ({} after {})",
                    candle.open_time, prev.open_time
                )));
            }
        }
        candles.push(candle);
    }
    Ok(candles)
}

fn parse_kline_row(row: &[serde_json::Value]) -> Option<Candle> {
    if row.len() < 5 {
        return None;
    }
    let open_time: DateTime<Utc> = Utc.timestamp_millis_opt(row[0].as_i64()?).single()?;
    let price = |v: &serde_json::Value| -> Option<f64> {
        let p: f64 = v.as_str()?.parse().ok()?;
        p.is_finite().then_some(p)
    };

    Some(Candle {
        open_time,
        open: price(&row[1])?,
        high: price(&row[2])?,
        low: price(&row[3])?,
        close: price(&row[4])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KLINES: &str = r#"[
        [1700000000000, "100.0", "101.5", "99.5", "101.0", "12.3", 1700000899999, "0", 10, "0", "0", "0"],
        [1700000900000, "101.0", "102.0", "100.5", "100.8", "8.1", 1700001799999, "0", 7, "0", "0", "0"]
    ]"#;

    #[test]
    fn parses_kline_rows() {
        let candles = parse_klines(KLINES).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 101.5);
        assert_eq!(candles[0].low, 99.5);
        assert_eq!(candles[1].close, 100.8);
    }

    #[test]
    fn rejects_unparseable_price() {
        let body = r#"[[1700000000000, "abc", "1", "1", "1", "1"]]"#;
        assert!(matches!(parse_klines(body), Err(Error::Exchange(_))));
    }

    #[test]
    fn rejects_non_finite_price() {
        let body = r#"[[1700000000000, "NaN", "1", "1", "1", "1"]]"#;
        assert!(matches!(parse_klines(body), Err(Error::Exchange(_))));
    }

    #[test]
    fn rejects_short_rows() {
        let body = r#"[[1700000000000, "1", "1"]]"#;
        assert!(matches!(parse_klines(body), Err(Error::Exchange(_))));
    }

    #[test]
    fn rejects_out_of_order_rows() {
        let body = r#"[
            [1700000900000, "1", "1", "1", "1", "1"],
            [1700000000000, "1", "1", "1", "1", "1"]
        ]"#;
        assert!(matches!(parse_klines(body), Err(Error::Exchange(_))));
    }

    #[test]
    fn rejects_error_payload() {
        let body = r#"{"code": -1121, "msg": "Invalid symbol."}"#;
        assert!(matches!(parse_klines(body), Err(Error::Json(_))));
    }

    #[test]
    fn filters_symbols_by_quote_asset() {
        let body = r#"[
            {"symbol": "BTCUSDT", "price": "64000.00"},
            {"symbol": "ETHBTC", "price": "0.05"},
            {"symbol": "ETHUSDT", "price": "3000.00"},
            {"symbol": "BTCUSDC", "price": "64010.00"}
        ]"#;
        assert_eq!(parse_symbols(body, "USDT").unwrap(), vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(parse_symbols(body, "USDC").unwrap(), vec!["BTCUSDC"]);
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let result = BinanceClient::new("key", "not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
