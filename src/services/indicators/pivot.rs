//! Classic pivot points.

use crate::types::PivotPoints;

/// Floor-trader pivots from one session's high, low and close.
///
/// P = (H + L + C) / 3, R1 = 2P - L, S1 = 2P - H, R2 = P + (H - L), S2 = P - (H - L)
#[derive(Default)]
pub struct Pivot;

impl Pivot {
    pub fn calculate(&self, high: f64, low: f64, close: f64) -> PivotPoints {
        let pivot = (high + low + close) / 3.0;
        let range = high - low;
        PivotPoints {
            pivot,
            r1: 2.0 * pivot - low,
            r2: pivot + range,
            s1: 2.0 * pivot - high,
            s2: pivot - range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_levels() {
        let p = Pivot.calculate(110.0, 90.0, 100.0);
        assert_eq!(p.pivot, 100.0);
        assert_eq!(p.r1, 110.0);
        assert_eq!(p.s1, 90.0);
        assert_eq!(p.r2, 120.0);
        assert_eq!(p.s2, 80.0);
    }

    #[test]
    fn test_pivot_levels_ordered() {
        let p = Pivot.calculate(152.0, 147.0, 150.0);
        assert!(p.s2 < p.s1 && p.s1 < p.pivot && p.pivot < p.r1 && p.r1 < p.r2);
    }
}
