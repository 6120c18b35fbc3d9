//! Annualised return volatility.

/// Trading days used to annualise.
const TRADING_DAYS: f64 = 252.0;

/// Population standard deviation of period-over-period returns, scaled by
/// `sqrt(252)`. Fewer than two prices yield 0; a zero previous price
/// contributes a zero return.
#[derive(Default)]
pub struct Volatility;

impl Volatility {
    pub fn calculate(&self, prices: &[f64]) -> f64 {
        if prices.len() < 2 {
            return 0.0;
        }

        let returns: Vec<f64> = prices
            .windows(2)
            .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
            .collect();

        let avg = super::mean(&returns);
        let variance =
            returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / returns.len() as f64;

        (variance * TRADING_DAYS).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatility_short_series() {
        assert_eq!(Volatility.calculate(&[]), 0.0);
        assert_eq!(Volatility.calculate(&[100.0]), 0.0);
    }

    #[test]
    fn test_volatility_constant_growth_is_zero() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        assert!(Volatility.calculate(&prices) < 1e-9);
    }

    #[test]
    fn test_volatility_alternating_returns() {
        // Returns alternate +10% / -9.0909%, deviation ~0.0955 each
        let prices: Vec<f64> = (0..21)
            .map(|i| if i % 2 == 0 { 100.0 } else { 110.0 })
            .collect();
        let vol = Volatility.calculate(&prices);
        assert!(vol > 1.4 && vol < 1.6, "got {}", vol);
    }

    #[test]
    fn test_volatility_zero_price_is_finite() {
        assert!(Volatility.calculate(&[0.0, 1.0, 2.0]).is_finite());
    }
}
