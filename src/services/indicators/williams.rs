//! Williams %R indicator.

use super::ranges;
use crate::types::PriceSeries;

/// Williams %R.
///
/// %R = (Highest High - Close) / (Highest High - Lowest Low) * -100
///
/// Ranges from -100 to 0. Below -80 is oversold, above -20 overbought.
/// Returns -50 for short or flat series.
pub struct WilliamsR {
    period: usize,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl WilliamsR {
    pub fn calculate(&self, series: &PriceSeries) -> f64 {
        if self.period == 0 || series.len() < self.period {
            return -50.0;
        }

        let (highs, lows) = ranges(series);
        let start = series.len() - self.period;
        let highest_high = highs[start..].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest_low = lows[start..].iter().copied().fold(f64::INFINITY, f64::min);

        if highest_high == lowest_low {
            return -50.0;
        }

        let close = series.prices[series.len() - 1];
        (highest_high - close) / (highest_high - lowest_low) * -100.0
    }
}
