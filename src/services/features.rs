//! Feature extraction from market snapshots.
//!
//! This is the single validation point of the engine: malformed snapshots
//! or series are rejected here with `EngineError::InvalidInput`, and every
//! non-finite feature is coerced to 0 before it leaves.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::indicators::{Bollinger, Macd, Momentum, Rsi, RsiMode, Trend, Volatility};
use crate::error::Result;
use crate::types::{MarketSnapshot, PriceSeries};

/// Ten-feature vector consumed by the rule-based scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleFeatures {
    pub price: f64,
    /// Session volume in millions.
    pub volume: f64,
    /// Percent change on the session.
    pub change: f64,
    pub rsi: f64,
    pub macd: f64,
    pub volatility: f64,
    /// +1 when the session is up, -1 otherwise.
    pub trend: f64,
    /// |change| / 10.
    pub momentum: f64,
    /// Session low.
    pub support: f64,
    /// Session high.
    pub resistance: f64,
}

impl SimpleFeatures {
    pub const LEN: usize = 10;

    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.price,
            self.volume,
            self.change,
            self.rsi,
            self.macd,
            self.volatility,
            self.trend,
            self.momentum,
            self.support,
            self.resistance,
        ]
    }

    fn sanitized(self) -> Self {
        Self {
            price: finite_or_zero(self.price),
            volume: finite_or_zero(self.volume),
            change: finite_or_zero(self.change),
            rsi: finite_or_zero(self.rsi),
            macd: finite_or_zero(self.macd),
            volatility: finite_or_zero(self.volatility),
            trend: finite_or_zero(self.trend),
            momentum: finite_or_zero(self.momentum),
            support: finite_or_zero(self.support),
            resistance: finite_or_zero(self.resistance),
        }
    }
}

/// Fifteen-feature vector consumed by the network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedFeatures {
    pub rsi: f64,
    pub macd: f64,
    pub bollinger_position: f64,
    pub vwap: f64,
    /// Volume / 10M, capped at 2.
    pub volume: f64,
    pub volatility: f64,
    /// OLS slope of the history.
    pub trend: f64,
    /// 10-period rate of change.
    pub momentum: f64,
    pub call_put_ratio: f64,
    pub unusual_activity: f64,
    pub social_sentiment: f64,
    pub news_sentiment: f64,
    pub market_cap: f64,
    pub sector_strength: f64,
    #[serde(rename = "correlationSPY")]
    pub correlation_spy: f64,
}

impl ExtendedFeatures {
    pub const LEN: usize = 15;

    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.rsi,
            self.macd,
            self.bollinger_position,
            self.vwap,
            self.volume,
            self.volatility,
            self.trend,
            self.momentum,
            self.call_put_ratio,
            self.unusual_activity,
            self.social_sentiment,
            self.news_sentiment,
            self.market_cap,
            self.sector_strength,
            self.correlation_spy,
        ]
    }

    pub fn from_array(values: [f64; Self::LEN]) -> Self {
        let v = values.map(finite_or_zero);
        Self {
            rsi: v[0],
            macd: v[1],
            bollinger_position: v[2],
            vwap: v[3],
            volume: v[4],
            volatility: v[5],
            trend: v[6],
            momentum: v[7],
            call_put_ratio: v[8],
            unusual_activity: v[9],
            social_sentiment: v[10],
            news_sentiment: v[11],
            market_cap: v[12],
            sector_strength: v[13],
            correlation_spy: v[14],
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Reject snapshots and series the engine cannot interpret.
pub fn validate_input(snapshot: &MarketSnapshot, history: &PriceSeries) -> Result<()> {
    if let Err(e) = snapshot.validate().and_then(|_| history.validate()) {
        warn!("Rejected input for {}: {}", snapshot.symbol, e);
        return Err(e);
    }
    Ok(())
}

/// Maps a snapshot and its history onto the two feature layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    rsi_mode: RsiMode,
}

impl FeatureExtractor {
    pub fn new(rsi_mode: RsiMode) -> Self {
        Self { rsi_mode }
    }

    pub fn rsi_mode(&self) -> RsiMode {
        self.rsi_mode
    }

    pub fn simple(&self, snapshot: &MarketSnapshot, history: &PriceSeries) -> Result<SimpleFeatures> {
        validate_input(snapshot, history)?;
        let prices = &history.prices;

        Ok(SimpleFeatures {
            price: snapshot.price,
            volume: snapshot.volume / 1_000_000.0,
            change: snapshot.change_percent,
            rsi: Rsi::default().with_mode(self.rsi_mode).calculate(prices),
            macd: Macd::default().value(prices),
            volatility: Volatility.calculate(prices),
            trend: if snapshot.change_percent > 0.0 { 1.0 } else { -1.0 },
            momentum: snapshot.change_percent.abs() / 10.0,
            support: snapshot.low,
            resistance: snapshot.high,
        }
        .sanitized())
    }

    pub fn extended(
        &self,
        snapshot: &MarketSnapshot,
        history: &PriceSeries,
    ) -> Result<ExtendedFeatures> {
        validate_input(snapshot, history)?;
        let prices = &history.prices;

        let put_volume = snapshot.put_volume.filter(|v| *v != 0.0).unwrap_or(1.0);
        let call_put_ratio = snapshot.call_volume.map(|c| c / put_volume).unwrap_or(0.0);

        Ok(ExtendedFeatures::from_array([
            Rsi::default().with_mode(self.rsi_mode).calculate(prices),
            Macd::default().value(prices),
            Bollinger::default().position(prices),
            snapshot.vwap.unwrap_or(0.0),
            (snapshot.volume / 10_000_000.0).min(2.0),
            Volatility.calculate(prices),
            Trend.calculate(prices),
            Momentum::default().calculate(prices),
            call_put_ratio,
            if snapshot.unusual_activity.unwrap_or(false) {
                1.0
            } else {
                0.0
            },
            snapshot.social_sentiment.unwrap_or(0.0),
            snapshot.news_sentiment.unwrap_or(0.0),
            snapshot.market_cap.unwrap_or(0.0),
            snapshot.sector_strength.unwrap_or(0.0),
            snapshot.correlation_spy.unwrap_or(0.0),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn example_snapshot() -> MarketSnapshot {
        MarketSnapshot {
            open: 148.0,
            high: 152.0,
            low: 147.0,
            volume: 6_000_000.0,
            change_percent: 4.2,
            ..MarketSnapshot::new("AAPL", 150.0)
        }
    }

    fn uptrend_history() -> PriceSeries {
        PriceSeries::from_prices((0..50).map(|i| 76.5 + i as f64 * 1.5).collect())
    }

    #[test]
    fn test_simple_features_layout() {
        let features = FeatureExtractor::default()
            .simple(&example_snapshot(), &uptrend_history())
            .unwrap();
        assert_eq!(features.price, 150.0);
        assert_eq!(features.volume, 6.0);
        assert_eq!(features.trend, 1.0);
        assert!((features.momentum - 0.42).abs() < 1e-12);
        assert_eq!(features.support, 147.0);
        assert_eq!(features.resistance, 152.0);
        assert!(features.rsi > 50.0 && features.rsi < 70.0);
        assert!(features.macd > 0.0);
        assert_eq!(features.to_array().len(), SimpleFeatures::LEN);
    }

    #[test]
    fn test_extended_features_defaults() {
        let features = FeatureExtractor::default()
            .extended(&example_snapshot(), &uptrend_history())
            .unwrap();
        assert_eq!(features.vwap, 0.0);
        assert_eq!(features.volume, 0.6);
        assert_eq!(features.call_put_ratio, 0.0);
        assert_eq!(features.unusual_activity, 0.0);
        assert!(features.trend > 0.0);
        assert!(features.to_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_extended_call_put_ratio() {
        let mut snapshot = example_snapshot();
        snapshot.call_volume = Some(300.0);
        snapshot.put_volume = Some(0.0);
        snapshot.unusual_activity = Some(true);
        let features = FeatureExtractor::default()
            .extended(&snapshot, &uptrend_history())
            .unwrap();
        assert_eq!(features.call_put_ratio, 300.0);
        assert_eq!(features.unusual_activity, 1.0);
    }

    #[test]
    fn test_volume_feature_capped() {
        let mut snapshot = example_snapshot();
        snapshot.volume = 90_000_000.0;
        let features = FeatureExtractor::default()
            .extended(&snapshot, &uptrend_history())
            .unwrap();
        assert_eq!(features.volume, 2.0);
    }

    #[test]
    fn test_non_finite_coerced_to_zero() {
        let mut values = [1.0; ExtendedFeatures::LEN];
        values[3] = f64::NAN;
        values[12] = f64::INFINITY;
        let features = ExtendedFeatures::from_array(values);
        assert_eq!(features.vwap, 0.0);
        assert_eq!(features.market_cap, 0.0);
    }

    #[test]
    fn test_invalid_price_rejected() {
        let mut snapshot = example_snapshot();
        snapshot.price = -1.0;
        let err = FeatureExtractor::default()
            .simple(&snapshot, &uptrend_history())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_mismatched_series_rejected() {
        let mut history = uptrend_history();
        history.volume = vec![1.0; 3];
        let err = FeatureExtractor::default()
            .extended(&example_snapshot(), &history)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
