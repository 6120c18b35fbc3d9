//! Exponential Moving Average (EMA) indicator.

/// EMA (Exponential Moving Average) indicator.
///
/// Seeded with the first price and run forward over the whole series with
/// multiplier `2 / (period + 1)`. An empty series yields 0.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// EMA at every point of the series.
    pub fn series(&self, prices: &[f64]) -> Vec<f64> {
        let multiplier = self.multiplier();
        let mut result = Vec::with_capacity(prices.len());
        let mut iter = prices.iter();

        if let Some(&first) = iter.next() {
            let mut ema = first;
            result.push(ema);
            for &price in iter {
                ema = (price - ema) * multiplier + ema;
                result.push(ema);
            }
        }

        result
    }

    /// EMA at the last point of the series.
    pub fn calculate(&self, prices: &[f64]) -> f64 {
        self.series(prices).last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_empty_is_zero() {
        assert_eq!(Ema::new(12).calculate(&[]), 0.0);
    }

    #[test]
    fn test_ema_single_price_is_seed() {
        assert_eq!(Ema::new(12).calculate(&[42.0]), 42.0);
    }

    #[test]
    fn test_ema_constant_series() {
        let prices = vec![25.0; 40];
        assert!((Ema::new(12).calculate(&prices) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_converges_to_appended_constant() {
        let mut prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        prices.extend(std::iter::repeat(50.0).take(300));
        assert!((Ema::new(12).calculate(&prices) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_ema_lags_uptrend() {
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let ema = Ema::new(12).calculate(&prices);
        assert!(ema < 149.0 && ema > 100.0);
    }

    #[test]
    fn test_ema_series_length() {
        let prices = vec![1.0, 2.0, 3.0];
        assert_eq!(Ema::new(3).series(&prices).len(), 3);
    }
}
