//! Technical indicator implementations.
//!
//! Every indicator is total: a short, empty or flat series yields a neutral
//! default instead of an error.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod momentum;
pub mod obv;
pub mod pivot;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod trend;
pub mod volatility;
pub mod vwap;
pub mod williams;

pub use adx::Adx;
pub use atr::{Atr, DEFAULT_ATR};
pub use bollinger::Bollinger;
pub use ema::Ema;
pub use macd::Macd;
pub use momentum::Momentum;
pub use obv::Obv;
pub use pivot::Pivot;
pub use rsi::{Rsi, RsiMode};
pub use sma::Sma;
pub use stochastic::Stochastic;
pub use trend::Trend;
pub use volatility::Volatility;
pub use vwap::Vwap;
pub use williams::WilliamsR;

use tracing::debug;

use crate::services::patterns;
use crate::types::{
    BandSignal, IndicatorSet, MacdCrossover, MarketSnapshot, PriceSeries, SignalDirection,
    TechnicalSignal, TrendStrength,
};

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    (values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Clamp a value to i8 score range.
pub fn clamp_score(value: f64) -> i8 {
    value.clamp(-100.0, 100.0) as i8
}

/// Highs and lows of the series, or the closes twice when ranges are absent.
pub(crate) fn ranges(series: &PriceSeries) -> (&[f64], &[f64]) {
    if series.has_ranges() {
        (&series.highs, &series.lows)
    } else {
        (&series.prices, &series.prices)
    }
}

/// Compute the full indicator set for one snapshot and its price history.
pub fn compute_indicators(snapshot: &MarketSnapshot, history: &PriceSeries) -> IndicatorSet {
    let prices = &history.prices;

    let rsi = Rsi::default().calculate(prices);
    let rsi_sliding = Rsi::default()
        .with_mode(RsiMode::SlidingWindow)
        .calculate(prices);
    let macd = Macd::default().calculate(prices);
    let sma20 = Sma::new(20).calculate(prices);
    let sma50 = Sma::new(50).calculate(prices);
    let ema12 = Ema::new(12).calculate(prices);
    let ema26 = Ema::new(26).calculate(prices);
    let bollinger_bands = Bollinger::default().calculate(prices);
    let bollinger_position = Bollinger::default().position(prices);
    let atr = Atr::default().calculate(history);
    let vwap = snapshot
        .vwap
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or_else(|| Vwap.calculate(history));
    let obv = Obv.calculate(history);
    let stochastic = Stochastic::default().calculate(history);
    let williams_r = WilliamsR::default().calculate(history);
    let adx = Adx::default().calculate(history);
    let pivot_points = Pivot.calculate(snapshot.high, snapshot.low, snapshot.price);
    let volatility = Volatility.calculate(prices);
    let trend = Trend.calculate(prices);
    let momentum = Momentum::default().calculate(prices);
    let chart_patterns = patterns::identify_chart_patterns(prices).patterns;

    let mut set = IndicatorSet {
        symbol: snapshot.symbol.clone(),
        price: snapshot.price,
        rsi,
        rsi_sliding,
        macd,
        sma20,
        sma50,
        ema12,
        ema26,
        bollinger_bands,
        bollinger_position,
        atr,
        vwap,
        obv,
        stochastic,
        williams_r,
        adx,
        pivot_points,
        volatility,
        trend,
        momentum,
        chart_patterns,
        overall_signal: TechnicalSignal {
            signal: SignalDirection::Neutral,
            score: 0,
            confidence: 0.0,
        },
        timestamp: chrono::Utc::now().timestamp_millis(),
    };
    set.overall_signal = overall_signal(&set);

    debug!(
        "{}: rsi={:.1} macd={:.3} atr={:.4} signal={:?}",
        set.symbol, set.rsi, set.macd.macd, set.atr, set.overall_signal.signal
    );

    set
}

/// Combine indicator votes into one five-level signal.
///
/// Each voting indicator contributes +1 (bullish), -1 (bearish) or 0.
/// Score = net votes / voters * 100; confidence = share of voters agreeing
/// with the sign of the score.
pub fn overall_signal(set: &IndicatorSet) -> TechnicalSignal {
    let band_vote = |signal: BandSignal| match signal {
        BandSignal::Oversold => 1,
        BandSignal::Overbought => -1,
        BandSignal::Neutral => 0,
    };
    let side = |a: f64, b: f64| {
        if a > b {
            1
        } else if a < b {
            -1
        } else {
            0
        }
    };

    let votes: [i32; 8] = [
        if set.rsi < 30.0 {
            1
        } else if set.rsi > 70.0 {
            -1
        } else {
            0
        },
        match set.macd.crossover {
            MacdCrossover::Bullish => 1,
            MacdCrossover::Bearish => -1,
        },
        band_vote(set.bollinger_bands.signal),
        band_vote(set.stochastic.signal),
        if set.williams_r < -80.0 {
            1
        } else if set.williams_r > -20.0 {
            -1
        } else {
            0
        },
        match set.adx.trend {
            TrendStrength::StrongUptrend => 1,
            TrendStrength::StrongDowntrend => -1,
            TrendStrength::WeakTrend => 0,
        },
        side(set.price, set.sma20),
        side(set.ema12, set.ema26),
    ];

    let net: i32 = votes.iter().sum();
    let total = votes.len() as f64;
    let score = clamp_score(net as f64 / total * 100.0);

    let agreeing = votes
        .iter()
        .filter(|v| **v != 0 && v.signum() == net.signum())
        .count();
    let confidence = if net == 0 {
        0.0
    } else {
        agreeing as f64 / total * 100.0
    };

    TechnicalSignal {
        signal: SignalDirection::from_score(score),
        score,
        confidence,
    }
}
