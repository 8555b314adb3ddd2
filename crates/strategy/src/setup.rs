use std::fmt::Write as _;

use serde::Serialize;

use common::{Candle, Error, MarketMode, Result, Signal};

use crate::config::SetupParams;
use crate::indicators::IndicatorSeries;

/// Number of take-profit levels, spaced one ATR apart.
pub const TAKE_PROFIT_LEVELS: usize = 5;

/// Static footer appended to every alert.
pub const CONFIRMATION_NOTE: &str = "RSI and EMA ✅";

/// Significant digits kept for prices below 1.
const SUB_UNIT_DIGITS: i32 = 4;

/// Decimals for every level of an alert, picked from the entry price: two
/// for prices of 1 and above, otherwise enough to keep four significant
/// digits (`0.00001234` stays `0.00001234`).
pub fn price_decimals(price: f64) -> usize {
    let price = price.abs();
    if !price.is_finite() || price == 0.0 || price >= 1.0 {
        return 2;
    }
    let leading_zeros = -price.log10().floor() as i32 - 1;
    (leading_zeros + SUB_UNIT_DIGITS).clamp(2, 12) as usize
}

/// Informational entry / stop / target levels for an alert. Never executed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSetup {
    pub symbol: String,
    pub direction: Signal,
    pub mode: MarketMode,
    pub entry: f64,
    pub atr: f64,
    pub stop_loss: f64,
    pub take_profits: [f64; TAKE_PROFIT_LEVELS],
    pub leverage: u32,
}

impl TradeSetup {
    /// Levels from an entry price and ATR: stop-loss `stop_loss_atr` ATRs
    /// against the trade, take-profits 1..=5 ATRs in favour.
    pub fn new(
        symbol: impl Into<String>,
        direction: Signal,
        entry: f64,
        atr: f64,
        params: &SetupParams,
    ) -> Self {
        let side = match direction {
            Signal::Long => 1.0,
            Signal::Short => -1.0,
        };
        let stop_loss = entry - side * params.stop_loss_atr * atr;
        let take_profits = std::array::from_fn(|i| entry + side * (i + 1) as f64 * atr);

        Self {
            symbol: symbol.into(),
            direction,
            mode: params.mode,
            entry,
            atr,
            stop_loss,
            take_profits,
            leverage: params.leverage,
        }
    }

    /// Setup from the latest close and ATR of an evaluated window.
    pub fn from_window(
        symbol: impl Into<String>,
        candles: &[Candle],
        series: &IndicatorSeries,
        direction: Signal,
        params: &SetupParams,
    ) -> Result<Self> {
        let last = candles.last().ok_or(Error::IncompleteIndicators)?;
        let row = series.latest().ok_or(Error::IncompleteIndicators)?;
        Ok(Self::new(symbol, direction, last.close, row.atr, params))
    }

    /// Render the alert text sent to the notifier (Telegram HTML mode).
    pub fn render(&self) -> String {
        let mode = match self.mode {
            MarketMode::Futures => "FUTURES",
            MarketMode::Spot => "SPOT",
        };
        let direction = match self.direction {
            Signal::Long => "🐂 LONG",
            Signal::Short => "🐻 SHORT",
        };

        let dp = price_decimals(self.entry);
        let mut msg = String::new();
        let _ = writeln!(msg, "📣 New signal ({mode})");
        let _ = writeln!(msg, "🪙 Pair: {}", self.symbol);
        let _ = writeln!(msg, "{direction}");
        let _ = writeln!(msg, "🎯 Entry: {:.dp$}", self.entry);
        let _ = writeln!(msg, "📉 SL: {:.dp$}", self.stop_loss);
        for (i, tp) in self.take_profits.iter().enumerate() {
            let _ = writeln!(msg, "🎯 TP{}: {:.dp$}", i + 1, tp);
        }
        let _ = writeln!(msg, "🧨 Leverage: {}x", self.leverage);
        let _ = write!(msg, "📊 Confirmation: {CONFIRMATION_NOTE}");
        msg
    }
}
