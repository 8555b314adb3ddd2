use common::Candle;

/// ATR (Average True Range) indicator.
///
/// TR = max(high - low, |high - prev_close|, |low - prev_close|), defined from
/// the second candle on. The first ATR is the mean of the first `period` true
/// ranges (index `period`), later values use Wilder's smoothing.
#[derive(Debug, Clone)]
pub struct AtrIndicator {
    pub period: usize,
}

impl AtrIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self { period }
    }

    pub fn true_range(current: &Candle, previous: &Candle) -> f64 {
        let hl = current.high - current.low;
        let hc = (current.high - previous.close).abs();
        let lc = (current.low - previous.close).abs();
        hl.max(hc).max(lc)
    }

    pub fn series(&self, candles: &[Candle]) -> Vec<Option<f64>> {
        let mut out = vec![None; candles.len()];
        if candles.len() < self.period + 1 {
            return out;
        }

        // true_ranges[j] belongs to candle j + 1
        let true_ranges: Vec<f64> = candles
            .windows(2)
            .map(|w| Self::true_range(&w[1], &w[0]))
            .collect();

        let mut atr = true_ranges[..self.period].iter().sum::<f64>() / self.period as f64;
        out[self.period] = Some(atr);

        for (offset, tr) in true_ranges[self.period..].iter().enumerate() {
            atr = (atr * (self.period - 1) as f64 + tr) / self.period as f64;
            out[self.period + 1 + offset] = Some(atr);
        }
        out
    }
}
