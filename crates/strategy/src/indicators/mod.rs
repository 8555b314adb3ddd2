pub mod atr;
pub mod ema;
pub mod rsi;

pub use atr::AtrIndicator;
pub use ema::EmaIndicator;
pub use rsi::RsiIndicator;

use common::Candle;

use crate::config::IndicatorParams;

/// Indicator values aligned index-for-index with a candle window.
/// `None` marks warm-up entries that do not have enough history yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub rsi: Vec<Option<f64>>,
    pub ema: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

/// Fully-defined indicator values for a single candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub rsi: f64,
    pub ema: f64,
    pub atr: f64,
}

impl IndicatorSeries {
    /// Compute RSI, EMA and ATR over the whole window in one pass each.
    pub fn compute(candles: &[Candle], params: &IndicatorParams) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        Self {
            rsi: RsiIndicator::new(params.rsi_period).series(&closes),
            ema: EmaIndicator::new(params.ema_period).series(&closes),
            atr: AtrIndicator::new(params.atr_period).series(candles),
        }
    }

    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// Values at `index`, or `None` if any of them is undefined or not finite.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        let rsi = self.rsi.get(index).copied().flatten()?;
        let ema = self.ema.get(index).copied().flatten()?;
        let atr = self.atr.get(index).copied().flatten()?;
        if !(rsi.is_finite() && ema.is_finite() && atr.is_finite()) {
            return None;
        }
        Some(IndicatorRow { rsi, ema, atr })
    }

    /// Values for the most recent candle.
    pub fn latest(&self) -> Option<IndicatorRow> {
        self.row(self.len().checked_sub(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + (i % 5) as f64;
                Candle {
                    open_time: Utc.timestamp_millis_opt(i as i64 * 900_000).unwrap(),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                }
            })
            .collect()
    }

    #[test]
    fn series_are_aligned_with_the_window() {
        let candles = window(200);
        let series = IndicatorSeries::compute(&candles, &IndicatorParams::default());
        assert_eq!(series.len(), 200);
        assert_eq!(series.ema.len(), 200);
        assert_eq!(series.atr.len(), 200);
        assert!(series.latest().is_some());
    }

    #[test]
    fn first_complete_row_is_after_the_longest_warm_up() {
        let candles = window(40);
        let series = IndicatorSeries::compute(&candles, &IndicatorParams::default());
        // EMA(20) is the last to become defined, at index 19
        assert!(series.row(18).is_none());
        assert!(series.row(19).is_some());
    }

    #[test]
    fn minimum_window_defines_the_last_two_rows() {
        let params = IndicatorParams::default();
        let n = params.min_window();
        let series = IndicatorSeries::compute(&window(n), &params);
        assert!(series.row(n - 2).is_some());
        assert!(series.latest().is_some());

        let shorter = IndicatorSeries::compute(&window(n - 1), &params);
        assert!(shorter.row(n - 3).is_none());
    }

    #[test]
    fn short_window_has_no_latest_row() {
        let candles = window(15);
        let series = IndicatorSeries::compute(&candles, &IndicatorParams::default());
        assert!(series.latest().is_none());
        assert!(IndicatorSeries::default().latest().is_none());
    }

    #[test]
    fn non_finite_values_are_unusable() {
        let series = IndicatorSeries {
            rsi: vec![Some(f64::NAN)],
            ema: vec![Some(1.0)],
            atr: vec![Some(1.0)],
        };
        assert!(series.latest().is_none());
    }
}
