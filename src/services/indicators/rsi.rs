//! Relative Strength Index (RSI) indicator.

use serde::{Deserialize, Serialize};

/// Which samples the gain/loss averages are taken over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiMode {
    /// Diffs at indices `1..period` from the start of the series.
    #[default]
    FixedStart,
    /// The trailing `period` diffs; needs `period + 1` samples.
    SlidingWindow,
}

impl std::str::FromStr for RsiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed_start" | "fixed" => Ok(RsiMode::FixedStart),
            "sliding_window" | "sliding" => Ok(RsiMode::SlidingWindow),
            other => Err(format!("unknown RSI mode: {}", other)),
        }
    }
}

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of gains to losses.
/// Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// Returns 50 when the series is shorter than the period, or in sliding
/// mode when it holds fewer than `period` diffs. Fixed-start sums only
/// `period - 1` diffs but still divides by `period`. A zero average loss is
/// treated as 1.
pub struct Rsi {
    period: usize,
    mode: RsiMode,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: 14,
            mode: RsiMode::FixedStart,
        }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: RsiMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn calculate(&self, prices: &[f64]) -> f64 {
        let required = match self.mode {
            RsiMode::FixedStart => self.period,
            RsiMode::SlidingWindow => self.period + 1,
        };
        if self.period == 0 || prices.len() < required {
            return 50.0;
        }

        let range = match self.mode {
            RsiMode::FixedStart => 1..self.period,
            RsiMode::SlidingWindow => (prices.len() - self.period)..prices.len(),
        };

        let mut gains = 0.0;
        let mut losses = 0.0;
        for i in range {
            let diff = prices[i] - prices[i - 1];
            if diff > 0.0 {
                gains += diff;
            } else {
                losses -= diff;
            }
        }

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;
        let rs = avg_gain / if avg_loss == 0.0 { 1.0 } else { avg_loss };

        100.0 - (100.0 / (1.0 + rs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_uptrend_prices(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    fn create_downtrend_prices(count: usize) -> Vec<f64> {
        (0..count).map(|i| 200.0 - i as f64 * 1.5).collect()
    }

    #[test]
    fn test_rsi_insufficient_data_is_neutral() {
        let rsi = Rsi::default();
        assert_eq!(rsi.calculate(&create_uptrend_prices(13)), 50.0);
        assert_eq!(rsi.calculate(&[]), 50.0);
    }

    #[test]
    fn test_rsi_uptrend_high_value() {
        let value = Rsi::default().calculate(&create_uptrend_prices(50));
        // 13 gains of 1.5 over 14 => avg gain 1.392857, loss treated as 1
        assert!((value - 58.2089).abs() < 1e-3, "got {}", value);
    }

    #[test]
    fn test_rsi_downtrend_low_value() {
        let value = Rsi::default().calculate(&create_downtrend_prices(50));
        assert!(value < 50.0, "RSI in downtrend should be < 50, got {}", value);
    }

    #[test]
    fn test_rsi_fixed_start_ignores_tail() {
        let mut prices = create_uptrend_prices(20);
        let fixed = Rsi::default().calculate(&prices);
        prices.extend(create_downtrend_prices(30));
        assert_eq!(Rsi::default().calculate(&prices), fixed);
    }

    #[test]
    fn test_rsi_sliding_window_follows_tail() {
        let mut prices = create_uptrend_prices(20);
        prices.extend((0..20).map(|i| 128.5 - i as f64 * 2.0));
        let sliding = Rsi::default()
            .with_mode(RsiMode::SlidingWindow)
            .calculate(&prices);
        let fixed = Rsi::default().calculate(&prices);
        assert!(sliding < 50.0);
        assert!(fixed > 50.0);
    }

    #[test]
    fn test_rsi_sliding_window_needs_full_window() {
        let sliding = Rsi::default().with_mode(RsiMode::SlidingWindow);
        assert_eq!(sliding.calculate(&create_uptrend_prices(14)), 50.0);

        // 14 gains of 1.5 over 14 => avg gain 1.5, loss treated as 1
        let value = sliding.calculate(&create_uptrend_prices(15));
        assert!((value - 60.0).abs() < 1e-9, "got {}", value);
    }

    #[test]
    fn test_rsi_value_range() {
        let spiky: Vec<f64> = (0..60)
            .map(|i| if i % 2 == 0 { 10.0 } else { 1000.0 })
            .collect();
        for mode in [RsiMode::FixedStart, RsiMode::SlidingWindow] {
            let value = Rsi::default().with_mode(mode).calculate(&spiky);
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_mode_from_str() {
        assert_eq!("sliding_window".parse::<RsiMode>(), Ok(RsiMode::SlidingWindow));
        assert_eq!("FIXED_START".parse::<RsiMode>(), Ok(RsiMode::FixedStart));
        assert!("trailing".parse::<RsiMode>().is_err());
    }
}
