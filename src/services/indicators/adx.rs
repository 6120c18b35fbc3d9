//! Average Directional Index (ADX) indicator.

use super::ranges;
use crate::types::{AdxOutput, PriceSeries, TrendStrength};

/// ADX (Average Directional Index) indicator.
///
/// Measures trend strength regardless of direction:
/// - ADX > 25: Strong trend, direction from +DI vs -DI
/// - Otherwise: Weak trend or ranging market
///
/// Uses Wilder smoothing. Closes stand in for highs and lows when the
/// series has no ranges.
pub struct Adx {
    period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    fn wilders_smooth(values: &[f64], period: usize) -> Vec<f64> {
        if values.len() < period {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(values.len() - period + 1);
        let mut smoothed = values.iter().take(period).sum::<f64>() / period as f64;
        result.push(smoothed);

        for value in values.iter().skip(period) {
            smoothed = (smoothed * (period - 1) as f64 + value) / period as f64;
            result.push(smoothed);
        }

        result
    }

    fn weak() -> AdxOutput {
        AdxOutput {
            adx: 0.0,
            plus_di: 0.0,
            minus_di: 0.0,
            trend: TrendStrength::WeakTrend,
        }
    }

    pub fn calculate(&self, series: &PriceSeries) -> AdxOutput {
        if self.period == 0 || series.len() < self.period * 2 + 1 {
            return Self::weak();
        }

        let (highs, lows) = ranges(series);
        let closes = &series.prices;

        let mut plus_dm = Vec::with_capacity(closes.len());
        let mut minus_dm = Vec::with_capacity(closes.len());
        let mut tr = Vec::with_capacity(closes.len());

        for i in 1..closes.len() {
            let up_move = highs[i] - highs[i - 1];
            let down_move = lows[i - 1] - lows[i];

            plus_dm.push(if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            });
            minus_dm.push(if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            });

            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            tr.push(hl.max(hc).max(lc));
        }

        let smoothed_plus_dm = Self::wilders_smooth(&plus_dm, self.period);
        let smoothed_minus_dm = Self::wilders_smooth(&minus_dm, self.period);
        let smoothed_tr = Self::wilders_smooth(&tr, self.period);

        let directional = |i: usize| -> (f64, f64) {
            let atr = smoothed_tr[i];
            if atr == 0.0 {
                (0.0, 0.0)
            } else {
                (
                    smoothed_plus_dm[i] / atr * 100.0,
                    smoothed_minus_dm[i] / atr * 100.0,
                )
            }
        };

        let dx_values: Vec<f64> = (0..smoothed_tr.len())
            .map(|i| {
                let (plus_di, minus_di) = directional(i);
                let di_sum = plus_di + minus_di;
                if di_sum > 0.0 {
                    (plus_di - minus_di).abs() / di_sum * 100.0
                } else {
                    0.0
                }
            })
            .collect();

        let Some(&adx) = Self::wilders_smooth(&dx_values, self.period).last() else {
            return Self::weak();
        };
        let (plus_di, minus_di) = directional(smoothed_tr.len() - 1);

        let trend = if adx > 25.0 && plus_di > minus_di {
            TrendStrength::StrongUptrend
        } else if adx > 25.0 && minus_di > plus_di {
            TrendStrength::StrongDowntrend
        } else {
            TrendStrength::WeakTrend
        };

        AdxOutput {
            adx,
            plus_di,
            minus_di,
            trend,
        }
    }
}
