pub mod config;
pub mod evaluator;
pub mod indicators;
pub mod setup;

pub use config::{IndicatorParams, SetupParams, SignalParams, StrategyConfig};
pub use evaluator::RsiEmaStrategy;
pub use indicators::{IndicatorRow, IndicatorSeries};
pub use setup::TradeSetup;

use common::{Candle, Result, Signal};

/// All strategy implementations must satisfy this trait.
pub trait Strategy: Send + Sync {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    /// Lookback periods used to build the indicator series.
    fn indicator_params(&self) -> &IndicatorParams;

    /// Derive the indicator series for a candle window (oldest first).
    fn indicators(&self, candles: &[Candle]) -> IndicatorSeries {
        IndicatorSeries::compute(candles, self.indicator_params())
    }

    /// Classify the latest candle of the window.
    ///
    /// Returns `Ok(None)` when no rule fires and `Error::IncompleteIndicators`
    /// when the latest row is still inside the warm-up period.
    fn evaluate(&self, candles: &[Candle], series: &IndicatorSeries) -> Result<Option<Signal>>;
}
