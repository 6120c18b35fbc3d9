//! Volume Weighted Average Price (VWAP) indicator.

use crate::types::PriceSeries;

/// VWAP (Volume Weighted Average Price) indicator.
///
/// VWAP = Sum(Typical Price * Volume) / Sum(Volume)
/// Typical Price = (High + Low + Close) / 3, or the close without ranges.
///
/// Falls back to the last close when no volume was traded.
#[derive(Default)]
pub struct Vwap;

impl Vwap {
    pub fn calculate(&self, series: &PriceSeries) -> f64 {
        let last = series.last_price().unwrap_or(0.0);
        if !series.has_volume() {
            return last;
        }

        let with_ranges = series.has_ranges();
        let (pv, volume) = (0..series.len()).fold((0.0, 0.0), |(pv, vol), i| {
            let typical = if with_ranges {
                (series.highs[i] + series.lows[i] + series.prices[i]) / 3.0
            } else {
                series.prices[i]
            };
            (pv + typical * series.volume[i], vol + series.volume[i])
        });

        if volume > 0.0 {
            pv / volume
        } else {
            last
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vwap_weights_by_volume() {
        let series = PriceSeries {
            prices: vec![10.0, 20.0],
            highs: vec![],
            lows: vec![],
            volume: vec![300.0, 100.0],
        };
        assert_eq!(Vwap.calculate(&series), 12.5);
    }

    #[test]
    fn test_vwap_typical_price() {
        let series = PriceSeries {
            prices: vec![10.0],
            highs: vec![13.0],
            lows: vec![7.0],
            volume: vec![5.0],
        };
        assert_eq!(Vwap.calculate(&series), 10.0);
    }

    #[test]
    fn test_vwap_without_volume_is_last_price() {
        let series = PriceSeries::from_prices(vec![4.0, 5.0]);
        assert_eq!(Vwap.calculate(&series), 5.0);
        assert_eq!(Vwap.calculate(&PriceSeries::default()), 0.0);
    }
}
