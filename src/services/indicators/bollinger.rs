//! Bollinger Bands indicator.

use crate::types::{BandSignal, BollingerBands};

/// Bollinger Bands.
///
/// Middle band = SMA(20) of the trailing window.
/// Upper/lower band = middle +/- 2 population standard deviations.
///
/// Signals:
/// - Price at or below the lower band: Oversold
/// - Price at or above the upper band: Overbought
pub struct Bollinger {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for Bollinger {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl Bollinger {
    /// Mean and standard deviation of the trailing window.
    fn window_stats(&self, prices: &[f64]) -> Option<(f64, f64)> {
        if prices.is_empty() || self.period == 0 {
            return None;
        }
        let window = &prices[prices.len().saturating_sub(self.period)..];
        Some((super::mean(window), super::std_dev(window)))
    }

    /// `(price - SMA) / (2 * stddev)`, roughly in [-1, 1]; 0 when flat.
    pub fn position(&self, prices: &[f64]) -> f64 {
        let Some((sma, std)) = self.window_stats(prices) else {
            return 0.0;
        };
        let current = prices[prices.len() - 1];
        if std == 0.0 {
            return 0.0;
        }
        (current - sma) / (std * self.std_dev_multiplier)
    }

    pub fn calculate(&self, prices: &[f64]) -> BollingerBands {
        let Some((middle, std)) = self.window_stats(prices) else {
            return BollingerBands {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
                position: 50.0,
                signal: BandSignal::Neutral,
            };
        };

        let current = prices[prices.len() - 1];
        let upper = middle + std * self.std_dev_multiplier;
        let lower = middle - std * self.std_dev_multiplier;
        let width = upper - lower;

        let (position, signal) = if width > 0.0 {
            let position = (current - lower) / width * 100.0;
            let signal = if current <= lower {
                BandSignal::Oversold
            } else if current >= upper {
                BandSignal::Overbought
            } else {
                BandSignal::Neutral
            };
            (position, signal)
        } else {
            (50.0, BandSignal::Neutral)
        };

        BollingerBands {
            upper,
            middle,
            lower,
            position,
            signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_flat_series() {
        let prices = vec![10.0; 30];
        let bands = Bollinger::default().calculate(&prices);
        assert_eq!(bands.upper, 10.0);
        assert_eq!(bands.lower, 10.0);
        assert_eq!(bands.position, 50.0);
        assert_eq!(Bollinger::default().position(&prices), 0.0);
    }

    #[test]
    fn test_bollinger_empty() {
        assert_eq!(Bollinger::default().position(&[]), 0.0);
        assert_eq!(
            Bollinger::default().calculate(&[]).signal,
            BandSignal::Neutral
        );
    }

    #[test]
    fn test_bollinger_spike_is_overbought() {
        let mut prices = vec![100.0; 19];
        prices.push(200.0);
        let bands = Bollinger::default().calculate(&prices);
        // One outlier in twenty sits 4.36 std above the mean
        assert_eq!(bands.signal, BandSignal::Overbought);
        assert!(bands.position > 100.0);
        assert!(Bollinger::default().position(&prices) > 1.0);
    }

    #[test]
    fn test_bollinger_bands_ordered() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bands = Bollinger::default().calculate(&prices);
        assert!(bands.lower < bands.middle && bands.middle < bands.upper);
    }
}
