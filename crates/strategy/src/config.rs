use serde::{Deserialize, Serialize};

use common::MarketMode;

/// Lookback periods for the indicator engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_period: 20,
            atr_period: 14,
        }
    }
}

impl IndicatorParams {
    /// Candles needed before both of the last two rows are fully defined.
    /// EMA is seeded on its `period`-th close; RSI and ATR need one more
    /// close for the first change.
    pub fn min_window(&self) -> usize {
        self.ema_period
            .max(self.rsi_period + 1)
            .max(self.atr_period + 1)
            + 1
    }
}

/// Thresholds for the RSI/EMA reversal rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignalParams {
    /// LONG requires RSI strictly below this.
    pub oversold: f64,
    /// SHORT requires RSI strictly above this.
    pub overbought: f64,
    /// Number of trailing candles inspected by the falling-knife veto.
    pub knife_candles: usize,
    /// Veto fires when the last body exceeds this multiple of ATR.
    pub knife_body_atr: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            oversold: 25.0,
            overbought: 75.0,
            knife_candles: 3,
            knife_body_atr: 0.8,
        }
    }
}

/// Inputs for turning a signal into stop-loss / take-profit levels.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SetupParams {
    pub mode: MarketMode,
    /// Leverage printed in the alert. Always 1 on spot.
    pub leverage: u32,
    /// Stop-loss distance from entry in ATRs.
    pub stop_loss_atr: f64,
}

impl SetupParams {
    pub fn for_mode(mode: MarketMode, futures_leverage: u32) -> Self {
        Self {
            mode,
            leverage: if mode.is_futures() { futures_leverage } else { 1 },
            stop_loss_atr: 1.2,
        }
    }
}

impl Default for SetupParams {
    fn default() -> Self {
        Self::for_mode(MarketMode::Futures, 125)
    }
}

/// Full parameter set of the reversal strategy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategyConfig {
    pub indicators: IndicatorParams,
    pub signal: SignalParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_matches_configured_minimum() {
        assert_eq!(IndicatorParams::default().min_window(), common::config::MIN_LOOKBACK);
    }

    #[test]
    fn longer_periods_widen_the_window() {
        let params = IndicatorParams {
            rsi_period: 30,
            ema_period: 20,
            atr_period: 14,
        };
        assert_eq!(params.min_window(), 32);
    }

    #[test]
    fn spot_setup_ignores_futures_leverage() {
        assert_eq!(SetupParams::for_mode(MarketMode::Spot, 50).leverage, 1);
        assert_eq!(SetupParams::for_mode(MarketMode::Futures, 50).leverage, 50);
    }
}
