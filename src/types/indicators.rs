use serde::{Deserialize, Serialize};

use super::{PatternKind, SignalDirection};

/// Oscillator reading relative to its extreme bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandSignal {
    Oversold,
    Neutral,
    Overbought,
}

/// Direction of the MACD line relative to its signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MacdCrossover {
    Bullish,
    Bearish,
}

/// ADX trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendStrength {
    StrongUptrend,
    StrongDowntrend,
    WeakTrend,
}

/// Full MACD reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdOutput {
    /// EMA(12) - EMA(26).
    pub macd: f64,
    /// EMA(9) of the MACD series.
    pub signal: f64,
    /// MACD - signal.
    pub histogram: f64,
    pub crossover: MacdCrossover,
}

/// Bollinger band reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Price position inside the bands, 0 = lower band, 100 = upper band.
    pub position: f64,
    pub signal: BandSignal,
}

/// Stochastic oscillator reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StochasticOutput {
    pub k: f64,
    pub d: f64,
    pub signal: BandSignal,
}

/// Average Directional Index reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdxOutput {
    pub adx: f64,
    #[serde(rename = "plusDI")]
    pub plus_di: f64,
    #[serde(rename = "minusDI")]
    pub minus_di: f64,
    pub trend: TrendStrength,
}

/// Classic floor-trader pivot levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

/// Aggregate vote of the technical indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSignal {
    pub signal: SignalDirection,
    /// Composite score from -100 (strong sell) to +100 (strong buy).
    pub score: i8,
    /// Share of voting indicators that agree with the signal (0-100).
    pub confidence: f64,
}

/// Every indicator computed for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub symbol: String,
    pub price: f64,
    /// RSI(14) over the first samples of the series.
    pub rsi: f64,
    /// RSI(14) over the trailing samples of the series.
    pub rsi_sliding: f64,
    pub macd: MacdOutput,
    pub sma20: f64,
    pub sma50: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub bollinger_bands: BollingerBands,
    /// (price - SMA20) / (2 * stddev).
    pub bollinger_position: f64,
    /// ATR(14) as a fraction of the latest close.
    pub atr: f64,
    pub vwap: f64,
    pub obv: f64,
    pub stochastic: StochasticOutput,
    pub williams_r: f64,
    pub adx: AdxOutput,
    pub pivot_points: PivotPoints,
    /// Annualised volatility of returns.
    pub volatility: f64,
    /// OLS slope of price against index.
    pub trend: f64,
    /// 10-period rate of change.
    pub momentum: f64,
    /// Chart patterns matched by the series.
    pub chart_patterns: Vec<PatternKind>,
    pub overall_signal: TechnicalSignal,
    /// Unix timestamp (milliseconds) when calculated.
    pub timestamp: i64,
}
