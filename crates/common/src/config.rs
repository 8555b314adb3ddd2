use std::time::Duration;

use crate::{Error, MarketMode, Result};

/// Shortest candle window whose last two rows carry RSI(14), EMA(20) and
/// ATR(14). EMA(20) is first defined on the 20th candle.
pub const MIN_LOOKBACK: usize = 21;

/// All configuration loaded from environment variables at startup.
/// Missing or malformed variables are reported as `Error::Config` so the
/// process can stop before the scan loop begins.
#[derive(Debug, Clone)]
pub struct Config {
    // Exchange credentials
    pub binance_api_key: String,
    pub binance_secret: String,
    pub binance_base_url: String,

    // Telegram
    pub telegram_token: String,
    /// Numeric chat id or a `@channel` username.
    pub telegram_chat_id: String,

    // Market selection
    pub market_mode: MarketMode,
    pub futures_quote_asset: String,
    pub spot_quote_asset: String,
    pub futures_leverage: u32,

    // Scan loop
    pub scan_interval: Duration,
    pub lookback: usize,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let market_mode = match env.optional("MARKET_MODE") {
            Some(raw) => raw
                .parse::<MarketMode>()
                .map_err(|e| Error::Config(format!("MARKET_MODE: {e}")))?,
            None => MarketMode::Futures,
        };

        let lookback: usize = env.parsed("LOOKBACK", 200)?;
        if lookback < MIN_LOOKBACK {
            return Err(Error::Config(format!(
                "LOOKBACK must be at least {MIN_LOOKBACK}, got {lookback}"
            )));
        }
        let scan_interval = env.seconds("SCAN_INTERVAL_SECS", 900)?;
        let fetch_timeout = env.seconds("FETCH_TIMEOUT_SECS", 30)?;

        Ok(Config {
            binance_api_key: env.required("BINANCE_API_KEY")?,
            binance_secret: env.required("BINANCE_API_SECRET")?,
            binance_base_url: env
                .optional("BINANCE_BASE_URL")
                .unwrap_or_else(|| "https://api.binance.com".to_string()),
            telegram_token: env.required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: env.required("TELEGRAM_CHAT_ID")?,
            market_mode,
            futures_quote_asset: env
                .optional("FUTURES_QUOTE_ASSET")
                .unwrap_or_else(|| "USDT".to_string()),
            spot_quote_asset: env
                .optional("SPOT_QUOTE_ASSET")
                .unwrap_or_else(|| "USDC".to_string()),
            futures_leverage: env.parsed("FUTURES_LEVERAGE", 125)?,
            scan_interval,
            lookback,
            fetch_timeout,
        })
    }

    /// Quote asset used to filter the symbol list for the active mode.
    pub fn quote_asset(&self) -> &str {
        match self.market_mode {
            MarketMode::Futures => &self.futures_quote_asset,
            MarketMode::Spot => &self.spot_quote_asset,
        }
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key).ok_or_else(|| {
            Error::Config(format!(
                "Required environment variable '{key}' is not set. Check your .env file."
            ))
        })
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("{key} has invalid value '{raw}': {e}"))),
            None => Ok(default),
        }
    }

    /// Non-zero duration in whole seconds.
    fn seconds(&self, key: &str, default: u64) -> Result<Duration> {
        match self.parsed(key, default)? {
            0 => Err(Error::Config(format!("{key} must be greater than zero"))),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}
