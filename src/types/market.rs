use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Ordered price history for one symbol.
///
/// Insertion order is chronological. `highs`, `lows` and `volume` are
/// optional parallel series: empty means absent, otherwise they must match
/// `prices` in length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSeries {
    /// Closing prices.
    pub prices: Vec<f64>,
    /// Period highs.
    #[serde(default)]
    pub highs: Vec<f64>,
    /// Period lows.
    #[serde(default)]
    pub lows: Vec<f64>,
    /// Period volume.
    #[serde(default)]
    pub volume: Vec<f64>,
}

impl PriceSeries {
    /// Create a close-only series.
    pub fn from_prices(prices: Vec<f64>) -> Self {
        Self {
            prices,
            ..Default::default()
        }
    }

    /// Create a series from OHLCV bars.
    pub fn from_bars(bars: &[OhlcBar]) -> Self {
        Self {
            prices: bars.iter().map(|b| b.close).collect(),
            highs: bars.iter().map(|b| b.high).collect(),
            lows: bars.iter().map(|b| b.low).collect(),
            volume: bars.iter().map(|b| b.volume).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Latest closing price.
    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Whether high/low ranges are present for every close.
    pub fn has_ranges(&self) -> bool {
        !self.highs.is_empty()
            && self.highs.len() == self.prices.len()
            && self.lows.len() == self.prices.len()
    }

    /// Whether volume is present for every close.
    pub fn has_volume(&self) -> bool {
        !self.volume.is_empty() && self.volume.len() == self.prices.len()
    }

    /// Check the parallel-length invariant.
    pub fn validate(&self) -> Result<()> {
        let n = self.prices.len();
        for (name, series) in [
            ("highs", &self.highs),
            ("lows", &self.lows),
            ("volume", &self.volume),
        ] {
            if !series.is_empty() && series.len() != n {
                return Err(EngineError::InvalidInput(format!(
                    "{} has {} entries but prices has {}",
                    name,
                    series.len(),
                    n
                )));
            }
        }
        Ok(())
    }
}

/// OHLCV bar used by the history store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OhlcBar {
    /// Unix timestamp (milliseconds).
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Current state of one symbol.
///
/// Read-only to the engine. Optional fields default to zero/absent when a
/// data source does not provide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Last traded price.
    pub price: f64,
    /// Session open.
    pub open: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Session volume (shares).
    pub volume: f64,
    /// Percent change on the session.
    pub change_percent: f64,
    /// Volume weighted average price, if the source provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
    /// Average daily volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_volume: Option<f64>,
    /// Social sentiment score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_sentiment: Option<f64>,
    /// News sentiment score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_sentiment: Option<f64>,
    /// Option call volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_volume: Option<f64>,
    /// Option put volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_volume: Option<f64>,
    /// Unusual options activity flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unusual_activity: Option<bool>,
    /// Market capitalisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    /// Relative sector strength.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_strength: Option<f64>,
    /// Correlation with SPY.
    #[serde(
        default,
        rename = "correlationSPY",
        alias = "correlationSpy",
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_spy: Option<f64>,
}

impl MarketSnapshot {
    /// Create a flat snapshot at `price` with no volume or change.
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            open: price,
            high: price,
            low: price,
            volume: 0.0,
            change_percent: 0.0,
            vwap: None,
            avg_volume: None,
            social_sentiment: None,
            news_sentiment: None,
            call_volume: None,
            put_volume: None,
            unusual_activity: None,
            market_cap: None,
            sector_strength: None,
            correlation_spy: None,
        }
    }

    /// Check that the required fields carry usable numbers.
    pub fn validate(&self) -> Result<()> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "{}: price must be a positive number, got {}",
                self.display_symbol(),
                self.price
            )));
        }
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("volume", self.volume),
            ("changePercent", self.change_percent),
        ] {
            if !value.is_finite() {
                return Err(EngineError::InvalidInput(format!(
                    "{}: {} is not a finite number",
                    self.display_symbol(),
                    name
                )));
            }
        }
        Ok(())
    }

    fn display_symbol(&self) -> &str {
        if self.symbol.is_empty() {
            "snapshot"
        } else {
            &self.symbol
        }
    }
}
