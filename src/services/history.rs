//! Per-symbol price history.
//!
//! Bars are kept newest-last in a bounded deque per symbol; the oldest bars
//! are dropped once a symbol exceeds the store capacity. Symbols with fewer
//! than two bars get a synthetic random-walk history instead.

use std::collections::VecDeque;

use dashmap::DashMap;
use rand::Rng;
use tracing::debug;

use crate::types::{OhlcBar, PriceSeries};

/// Minimum stored bars before real history is used.
pub const MIN_BARS: usize = 2;

/// Random walk of `days` closes starting from `price`, +-1% per step.
pub fn synthetic_history<R: Rng>(price: f64, days: usize, rng: &mut R) -> PriceSeries {
    let mut current = price;
    let prices = (0..days)
        .map(|_| {
            current *= 1.0 + (rng.gen::<f64>() - 0.5) * 0.02;
            current
        })
        .collect();
    PriceSeries::from_prices(prices)
}

/// Concurrent bounded OHLCV history keyed by symbol.
pub struct PriceHistoryStore {
    bars: DashMap<String, VecDeque<OhlcBar>>,
    capacity: usize,
    synthetic_length: usize,
}

impl PriceHistoryStore {
    pub fn new(capacity: usize, synthetic_length: usize) -> Self {
        Self {
            bars: DashMap::new(),
            capacity: capacity.max(MIN_BARS),
            synthetic_length,
        }
    }

    fn key(symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    /// Append one bar.
    pub fn push(&self, symbol: &str, bar: OhlcBar) {
        self.extend(symbol, std::iter::once(bar));
    }

    /// Append bars in order, trimming the oldest beyond capacity.
    pub fn extend(&self, symbol: &str, bars: impl IntoIterator<Item = OhlcBar>) -> usize {
        let mut entry = self.bars.entry(Self::key(symbol)).or_default();
        entry.extend(bars);
        while entry.len() > self.capacity {
            entry.pop_front();
        }
        entry.len()
    }

    /// Stored bars for `symbol`, oldest first.
    pub fn bars(&self, symbol: &str) -> Vec<OhlcBar> {
        self.bars
            .get(&Self::key(symbol))
            .map(|bars| bars.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Stored history, if at least two bars are present.
    pub fn series(&self, symbol: &str) -> Option<PriceSeries> {
        let bars = self.bars.get(&Self::key(symbol))?;
        if bars.len() < MIN_BARS {
            return None;
        }
        let (front, back) = bars.as_slices();
        let ordered: Vec<OhlcBar> = front.iter().chain(back).copied().collect();
        Some(PriceSeries::from_bars(&ordered))
    }

    /// Stored history, or a synthetic walk around `price`.
    pub fn series_or_synthetic(&self, symbol: &str, price: f64) -> PriceSeries {
        self.series(symbol).unwrap_or_else(|| {
            debug!(
                "No stored history for {}, generating {} synthetic closes",
                symbol, self.synthetic_length
            );
            synthetic_history(price, self.synthetic_length, &mut rand::thread_rng())
        })
    }

    pub fn len(&self, symbol: &str) -> usize {
        self.bars.get(&Self::key(symbol)).map(|b| b.len()).unwrap_or(0)
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.bars.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn clear(&self, symbol: &str) {
        self.bars.remove(&Self::key(symbol));
    }
}

impl Default for PriceHistoryStore {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bar(time: i64, close: f64) -> OhlcBar {
        OhlcBar {
            time,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn test_synthetic_history_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let series = synthetic_history(100.0, 50, &mut rng);
        assert_eq!(series.len(), 50);
        let mut prev = 100.0;
        for price in &series.prices {
            assert!((price / prev - 1.0).abs() <= 0.01 + 1e-12);
            prev = *price;
        }
        assert!(!series.has_ranges());
    }

    #[test]
    fn test_capacity_trims_oldest() {
        let store = PriceHistoryStore::new(3, 50);
        store.extend("spy", (0..5).map(|i| bar(i, 100.0 + i as f64)));
        assert_eq!(store.len("SPY"), 3);
        let series = store.series("SPY").unwrap();
        assert_eq!(series.prices, vec![102.0, 103.0, 104.0]);
        assert_eq!(series.highs, vec![103.0, 104.0, 105.0]);
    }

    #[test]
    fn test_single_bar_falls_back_to_synthetic() {
        let store = PriceHistoryStore::new(10, 30);
        store.push("AAPL", bar(0, 150.0));
        assert!(store.series("AAPL").is_none());
        assert_eq!(store.series_or_synthetic("AAPL", 150.0).len(), 30);

        store.push("AAPL", bar(1, 151.0));
        assert_eq!(store.series_or_synthetic("AAPL", 151.0).len(), 2);
    }

    #[test]
    fn test_clear_and_symbols() {
        let store = PriceHistoryStore::default();
        store.push("qqq", bar(0, 400.0));
        store.push("AAPL", bar(0, 150.0));
        assert_eq!(store.symbols(), vec!["AAPL".to_string(), "QQQ".to_string()]);
        store.clear("QQQ");
        assert_eq!(store.len("QQQ"), 0);
    }
}
