//! Rate-of-change momentum.

/// `(last - prices[len - period]) / prices[len - period]`.
///
/// Returns 0 when the series is shorter than the period or the reference
/// price is zero.
pub struct Momentum {
    period: usize,
}

impl Default for Momentum {
    fn default() -> Self {
        Self { period: 10 }
    }
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn calculate(&self, prices: &[f64]) -> f64 {
        if self.period == 0 || prices.len() < self.period {
            return 0.0;
        }
        let current = prices[prices.len() - 1];
        let past = prices[prices.len() - self.period];
        if past == 0.0 {
            return 0.0;
        }
        (current - past) / past
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentum_reference_point() {
        // period 10 compares against the tenth-from-last price
        let prices: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert!((Momentum::default().calculate(&prices) - (20.0 - 11.0) / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_short_series() {
        assert_eq!(Momentum::default().calculate(&[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_momentum_negative_when_falling() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        assert!(Momentum::new(5).calculate(&prices) < 0.0);
    }
}
