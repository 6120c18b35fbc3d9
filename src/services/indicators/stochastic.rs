//! Stochastic Oscillator indicator.

use super::ranges;
use crate::types::{BandSignal, PriceSeries, StochasticOutput};

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(3) of %K
///
/// Signals:
/// - Below 20: Oversold (bullish)
/// - Above 80: Overbought (bearish)
///
/// Closes stand in for highs and lows when the series has no ranges.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    fn min_periods(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    pub fn calculate(&self, series: &PriceSeries) -> StochasticOutput {
        let neutral = StochasticOutput {
            k: 50.0,
            d: 50.0,
            signal: BandSignal::Neutral,
        };
        if self.k_period == 0 || self.d_period == 0 || series.len() < self.min_periods() {
            return neutral;
        }

        let (highs, lows) = ranges(series);
        let closes = &series.prices;

        let k_values: Vec<f64> = ((self.k_period - 1)..closes.len())
            .map(|i| {
                let start = i + 1 - self.k_period;
                let lowest_low = lows[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
                let highest_high = highs[start..=i]
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);

                if highest_high != lowest_low {
                    (closes[i] - lowest_low) / (highest_high - lowest_low) * 100.0
                } else {
                    50.0
                }
            })
            .collect();

        let Some(&k) = k_values.last() else {
            return neutral;
        };
        let d = super::mean(&k_values[k_values.len().saturating_sub(self.d_period)..]);

        let signal = if k < 20.0 {
            BandSignal::Oversold
        } else if k > 80.0 {
            BandSignal::Overbought
        } else {
            BandSignal::Neutral
        };

        StochasticOutput { k, d, signal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_uptrend_series(count: usize) -> PriceSeries {
        let prices: Vec<f64> = (0..count).map(|i| 100.0 + i as f64 * 1.5 + 1.0).collect();
        PriceSeries {
            highs: prices.iter().map(|p| p + 1.0).collect(),
            lows: prices.iter().map(|p| p - 2.0).collect(),
            volume: vec![1000.0; count],
            prices,
        }
    }

    #[test]
    fn test_stochastic_insufficient_data() {
        let output = Stochastic::default().calculate(&create_uptrend_series(10));
        assert_eq!(output.k, 50.0);
        assert_eq!(output.signal, BandSignal::Neutral);
    }

    #[test]
    fn test_stochastic_uptrend_overbought() {
        let output = Stochastic::default().calculate(&create_uptrend_series(40));
        assert!(output.k > 80.0, "got {}", output.k);
        assert_eq!(output.signal, BandSignal::Overbought);
        assert!(output.d <= 100.0);
    }

    #[test]
    fn test_stochastic_close_only_downtrend() {
        let prices: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        let output = Stochastic::default().calculate(&PriceSeries::from_prices(prices));
        assert_eq!(output.k, 0.0);
        assert_eq!(output.signal, BandSignal::Oversold);
    }
}
