//! Least-squares price trend.

/// Slope of the ordinary least-squares fit of price against index.
/// Positive = uptrend, negative = downtrend. Fewer than two prices yield 0.
#[derive(Default)]
pub struct Trend;

impl Trend {
    pub fn calculate(&self, prices: &[f64]) -> f64 {
        let n = prices.len();
        if n < 2 {
            return 0.0;
        }

        let n_f = n as f64;
        let sum_x: f64 = (0..n).map(|i| i as f64).sum();
        let sum_y: f64 = prices.iter().sum();
        let sum_xy: f64 = prices.iter().enumerate().map(|(i, p)| i as f64 * p).sum();
        let sum_x2: f64 = (0..n).map(|i| (i * i) as f64).sum();

        (n_f * sum_xy - sum_x * sum_y) / (n_f * sum_x2 - sum_x * sum_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_linear_slope() {
        let prices: Vec<f64> = (0..10).map(|i| 5.0 + 2.5 * i as f64).collect();
        assert!((Trend.calculate(&prices) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_trend_flat_and_short() {
        assert_eq!(Trend.calculate(&[3.0; 8]), 0.0);
        assert_eq!(Trend.calculate(&[3.0]), 0.0);
    }

    #[test]
    fn test_trend_downtrend_negative() {
        let prices: Vec<f64> = (0..10).map(|i| 50.0 - i as f64).collect();
        assert!(Trend.calculate(&prices) < 0.0);
    }
}
