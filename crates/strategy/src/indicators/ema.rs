/// Exponential Moving Average over close prices.
///
/// Multiplier `k = 2 / (period + 1)`, seeded with the SMA of the first
/// `period` closes. The first value sits at index `period - 1`.
#[derive(Debug, Clone)]
pub struct EmaIndicator {
    pub period: usize,
}

impl EmaIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self { period }
    }

    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if closes.len() < self.period {
            return out;
        }

        let k = 2.0 / (self.period as f64 + 1.0);
        let mut ema = closes[..self.period].iter().sum::<f64>() / self.period as f64;
        out[self.period - 1] = Some(ema);

        for (i, &price) in closes.iter().enumerate().skip(self.period) {
            ema = price * k + ema * (1.0 - k);
            out[i] = Some(ema);
        }
        out
    }
}
