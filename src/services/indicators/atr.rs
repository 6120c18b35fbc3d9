//! Average True Range (ATR) indicator.

use crate::types::PriceSeries;

/// ATR used when ranges are missing or too short.
pub const DEFAULT_ATR: f64 = 0.02;

/// ATR (Average True Range) indicator.
///
/// True Range = max(high - low, |high - prev_close|, |low - prev_close|).
/// The trailing `period` true ranges are summed, divided by `period` and
/// expressed as a fraction of the latest close.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn calculate(&self, series: &PriceSeries) -> f64 {
        if self.period == 0 || !series.has_ranges() || series.highs.len() < self.period {
            return DEFAULT_ATR;
        }

        let last_close = series.prices[series.len() - 1];
        if last_close == 0.0 {
            return DEFAULT_ATR;
        }

        let true_ranges: Vec<f64> = (1..series.len())
            .map(|i| {
                let high = series.highs[i];
                let low = series.lows[i];
                let prev_close = series.prices[i - 1];
                (high - low)
                    .max((high - prev_close).abs())
                    .max((low - prev_close).abs())
            })
            .collect();

        let start = true_ranges.len().saturating_sub(self.period);
        let atr = true_ranges[start..].iter().sum::<f64>() / self.period as f64;

        atr / last_close
    }
}
