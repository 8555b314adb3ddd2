use tracing::debug;

use common::{Candle, Error, Result, Signal};

use crate::config::{IndicatorParams, StrategyConfig};
use crate::indicators::{IndicatorRow, IndicatorSeries};
use crate::Strategy;

/// Mean-reversion rules on RSI with an EMA trend filter and a falling-knife veto.
///
/// Rules, first match wins:
/// 1. last N candles all bearish, last body > k·ATR, last low ≥ lowest low → no signal
/// 2. RSI < oversold and close > EMA → LONG
/// 3. RSI > overbought and close < EMA → SHORT
pub struct RsiEmaStrategy {
    name: String,
    cfg: StrategyConfig,
}

impl RsiEmaStrategy {
    pub fn new(cfg: StrategyConfig) -> Self {
        let name = format!(
            "RSI({}) + EMA({}) reversal",
            cfg.indicators.rsi_period, cfg.indicators.ema_period
        );
        Self { name, cfg }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.cfg
    }

    fn is_falling_knife(&self, candles: &[Candle], last: &Candle, row: &IndicatorRow) -> bool {
        let params = &self.cfg.signal;
        let tail = &candles[candles.len().saturating_sub(params.knife_candles)..];

        let red_candles = tail.iter().filter(|c| c.is_bearish()).count();
        let big_body = last.body() > row.atr * params.knife_body_atr;
        let lowest = tail.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let no_wick = last.low >= lowest;

        red_candles >= params.knife_candles && big_body && no_wick
    }
}

impl Default for RsiEmaStrategy {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}

impl Strategy for RsiEmaStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn indicator_params(&self) -> &IndicatorParams {
        &self.cfg.indicators
    }

    fn evaluate(&self, candles: &[Candle], series: &IndicatorSeries) -> Result<Option<Signal>> {
        if candles.len() < 2 || series.len() != candles.len() {
            return Err(Error::IncompleteIndicators);
        }
        let last = &candles[candles.len() - 1];
        // Read but not part of any rule yet.
        let _prev = &candles[candles.len() - 2];
        let row = series.latest().ok_or(Error::IncompleteIndicators)?;

        if self.is_falling_knife(candles, last, &row) {
            debug!(close = last.close, atr = row.atr, rsi = row.rsi, "Falling-knife veto");
            return Ok(None);
        }

        let params = &self.cfg.signal;
        if row.rsi < params.oversold && last.close > row.ema {
            return Ok(Some(Signal::Long));
        }
        if row.rsi > params.overbought && last.close < row.ema {
            return Ok(Some(Signal::Short));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(i: usize, open: f64, close: f64, low: f64) -> Candle {
        Candle {
            open_time: Utc.timestamp_millis_opt(i as i64 * 900_000).unwrap(),
            open,
            high: open.max(close) + 0.1,
            low,
            close,
        }
    }

    /// 20 neutral candles followed by `tail`, with the latest indicator row set
    /// to the given values and every earlier row defined.
    fn setup(tail: Vec<Candle>, rsi: f64, ema: f64, atr: f64) -> (Vec<Candle>, IndicatorSeries) {
        let mut candles: Vec<Candle> = (0..20).map(|i| candle(i, 100.0, 100.5, 99.5)).collect();
        candles.extend(tail);
        let n = candles.len();
        let series = IndicatorSeries {
            rsi: (0..n).map(|i| Some(if i + 1 == n { rsi } else { 50.0 })).collect(),
            ema: vec![Some(ema); n],
            atr: vec![Some(atr); n],
        };
        (candles, series)
    }

    fn bullish_tail() -> Vec<Candle> {
        vec![
            candle(20, 100.0, 101.0, 99.8),
            candle(21, 101.0, 102.0, 100.8),
            candle(22, 102.0, 103.0, 101.8),
        ]
    }

    fn knife_tail() -> Vec<Candle> {
        vec![
            candle(20, 110.0, 108.0, 107.5),
            candle(21, 108.0, 106.0, 105.5),
            candle(22, 106.0, 104.0, 104.0),
        ]
    }

    fn eval(candles: &[Candle], series: &IndicatorSeries) -> Option<Signal> {
        RsiEmaStrategy::default().evaluate(candles, series).unwrap()
    }

    #[test]
    fn oversold_above_ema_is_long() {
        let (candles, series) = setup(bullish_tail(), 24.5, 95.0, 1.0);
        assert_eq!(eval(&candles, &series), Some(Signal::Long));
    }

    #[test]
    fn overbought_below_ema_is_short() {
        let (candles, series) = setup(bullish_tail(), 76.0, 110.0, 1.0);
        assert_eq!(eval(&candles, &series), Some(Signal::Short));
    }

    #[test]
    fn oversold_below_ema_is_no_signal() {
        let (candles, series) = setup(bullish_tail(), 10.0, 110.0, 1.0);
        assert_eq!(eval(&candles, &series), None);
    }

    #[test]
    fn overbought_above_ema_is_no_signal() {
        let (candles, series) = setup(bullish_tail(), 90.0, 95.0, 1.0);
        assert_eq!(eval(&candles, &series), None);
    }

    #[test]
    fn rsi_thresholds_are_strict() {
        let (candles, series) = setup(bullish_tail(), 25.0, 95.0, 1.0);
        assert_eq!(eval(&candles, &series), None);
        let (candles, series) = setup(bullish_tail(), 75.0, 110.0, 1.0);
        assert_eq!(eval(&candles, &series), None);
    }

    #[test]
    fn falling_knife_vetoes_long() {
        // close 104 > EMA 100 and RSI 20 would be LONG, but three red candles
        // with a 2.0 body against ATR 1.0 trip the veto.
        let (candles, series) = setup(knife_tail(), 20.0, 100.0, 1.0);
        assert_eq!(eval(&candles, &series), None);
    }

    #[test]
    fn small_bodies_do_not_trip_the_veto() {
        // Same red candles, but 2.0 body is below 0.8 × ATR 3.0.
        let (candles, series) = setup(knife_tail(), 20.0, 100.0, 3.0);
        assert_eq!(eval(&candles, &series), Some(Signal::Long));
    }

    #[test]
    fn two_red_candles_do_not_trip_the_veto() {
        let mut tail = knife_tail();
        tail[0] = candle(20, 107.0, 108.0, 106.5);
        let (candles, series) = setup(tail, 20.0, 100.0, 1.0);
        assert_eq!(eval(&candles, &series), Some(Signal::Long));
    }

    #[test]
    fn undefined_latest_indicator_is_an_error() {
        let (candles, mut series) = setup(bullish_tail(), 24.5, 95.0, 1.0);
        *series.ema.last_mut().unwrap() = None;
        let err = RsiEmaStrategy::default().evaluate(&candles, &series).unwrap_err();
        assert!(matches!(err, Error::IncompleteIndicators));
    }

    #[test]
    fn mismatched_series_is_an_error() {
        let (candles, series) = setup(bullish_tail(), 24.5, 95.0, 1.0);
        let result = RsiEmaStrategy::default().evaluate(&candles[..10], &series);
        assert!(matches!(result, Err(Error::IncompleteIndicators)));
    }

    #[test]
    fn name_reflects_periods() {
        assert_eq!(RsiEmaStrategy::default().name(), "RSI(14) + EMA(20) reversal");
    }
}
