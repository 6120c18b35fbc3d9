//! On-Balance Volume (OBV) indicator.

use crate::types::PriceSeries;

/// OBV (On-Balance Volume) indicator.
///
/// Cumulative volume indicator:
/// - If close > previous close: OBV += volume
/// - If close < previous close: OBV -= volume
///
/// A series without volume yields 0.
#[derive(Default)]
pub struct Obv;

impl Obv {
    pub fn calculate(&self, series: &PriceSeries) -> f64 {
        if !series.has_volume() {
            return 0.0;
        }

        series
            .prices
            .windows(2)
            .zip(series.volume.iter().skip(1))
            .fold(0.0, |obv, (w, volume)| {
                if w[1] > w[0] {
                    obv + volume
                } else if w[1] < w[0] {
                    obv - volume
                } else {
                    obv
                }
            })
    }
}
