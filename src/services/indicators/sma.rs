//! Simple Moving Average (SMA) indicator.

use super::mean;

/// SMA (Simple Moving Average) indicator.
///
/// Mean of the last `period` prices. A series shorter than the period
/// returns its last price, or 0 when empty.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn calculate(&self, prices: &[f64]) -> f64 {
        if self.period == 0 || prices.len() < self.period {
            return prices.last().copied().unwrap_or(0.0);
        }
        mean(&prices[prices.len() - self.period..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_short_series_returns_last() {
        assert_eq!(Sma::new(20).calculate(&[1.0, 2.0, 3.0]), 3.0);
        assert_eq!(Sma::new(20).calculate(&[]), 0.0);
    }

    #[test]
    fn test_sma_uses_trailing_window() {
        let prices: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        assert_eq!(Sma::new(4).calculate(&prices), 8.5);
    }

    #[test]
    fn test_sma_constant_run_returns_constant() {
        let mut prices: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        prices.extend(std::iter::repeat(7.5).take(20));
        assert_eq!(Sma::new(20).calculate(&prices), 7.5);
    }
}
