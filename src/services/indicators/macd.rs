//! Moving Average Convergence Divergence (MACD) indicator.

use super::Ema;
use crate::types::{MacdCrossover, MacdOutput};

/// MACD (Moving Average Convergence Divergence) indicator.
///
/// MACD Line = EMA(12) - EMA(26)
/// Signal Line = EMA(9) of MACD Line
/// Histogram = MACD Line - Signal Line
///
/// Signals:
/// - MACD above signal line: Bullish
/// - MACD below signal line: Bearish
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    /// MACD line at the last point, the scalar used by the scorers.
    pub fn value(&self, prices: &[f64]) -> f64 {
        Ema::new(self.fast_period).calculate(prices) - Ema::new(self.slow_period).calculate(prices)
    }

    /// Full MACD reading with signal line and histogram.
    pub fn calculate(&self, prices: &[f64]) -> MacdOutput {
        let fast = Ema::new(self.fast_period).series(prices);
        let slow = Ema::new(self.slow_period).series(prices);

        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = Ema::new(self.signal_period).series(&macd_line);

        let macd = macd_line.last().copied().unwrap_or(0.0);
        let signal = signal_line.last().copied().unwrap_or(0.0);

        MacdOutput {
            macd,
            signal,
            histogram: macd - signal,
            crossover: if macd > signal {
                MacdCrossover::Bullish
            } else {
                MacdCrossover::Bearish
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_uptrend_prices(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    #[test]
    fn test_macd_empty_is_zero() {
        let output = Macd::default().calculate(&[]);
        assert_eq!(output.macd, 0.0);
        assert_eq!(output.signal, 0.0);
        assert_eq!(output.crossover, MacdCrossover::Bearish);
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let prices = create_uptrend_prices(60);
        assert!(Macd::default().value(&prices) > 0.0);
    }

    #[test]
    fn test_macd_value_matches_full_line() {
        let prices = create_uptrend_prices(60);
        let macd = Macd::default();
        assert!((macd.value(&prices) - macd.calculate(&prices).macd).abs() < 1e-9);
    }

    #[test]
    fn test_macd_bullish_crossover_in_accelerating_uptrend() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i * i) as f64 * 0.05).collect();
        let output = Macd::default().calculate(&prices);
        assert_eq!(output.crossover, MacdCrossover::Bullish);
        assert!((output.histogram - (output.macd - output.signal)).abs() < 1e-12);
    }
}
