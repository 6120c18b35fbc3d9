//! Chart pattern and snapshot setup detection.
//!
//! Chart patterns are boolean predicates over a closing-price series.
//! Setups classify a single snapshot from its simple feature vector.
//! Any predicate that needs more samples than are available is false.

use super::features::SimpleFeatures;
use super::indicators::{Sma, Trend, Volatility};
use crate::types::{ChartPatternSet, Pattern, PatternKind};

/// Evaluate every chart predicate, bullish first, then bearish, then neutral.
pub fn identify_chart_patterns(prices: &[f64]) -> ChartPatternSet {
    let checks: [(PatternKind, fn(&[f64]) -> bool); 8] = [
        (PatternKind::GoldenCross, is_golden_cross),
        (PatternKind::BullFlag, is_bull_flag),
        (PatternKind::CupHandle, is_cup_and_handle),
        (PatternKind::DeathCross, is_death_cross),
        (PatternKind::BearFlag, is_bear_flag),
        (PatternKind::HeadShoulders, is_head_and_shoulders),
        (PatternKind::Triangle, is_triangle),
        (PatternKind::RangeBound, is_range),
    ];

    let matches = checks
        .iter()
        .filter(|(_, check)| check(prices))
        .map(|(kind, _)| *kind)
        .collect();

    ChartPatternSet::from_matches(matches)
}

/// Strongest chart pattern of the series, or `no_pattern`.
pub fn detect_pattern(prices: &[f64]) -> Pattern {
    identify_chart_patterns(prices).strongest()
}

/// SMA(50) and SMA(200) now and one sample earlier.
fn cross_averages(prices: &[f64]) -> Option<((f64, f64), (f64, f64))> {
    if prices.len() <= 200 {
        return None;
    }
    let prev = &prices[..prices.len() - 1];
    Some((
        (Sma::new(50).calculate(prev), Sma::new(200).calculate(prev)),
        (Sma::new(50).calculate(prices), Sma::new(200).calculate(prices)),
    ))
}

pub fn is_golden_cross(prices: &[f64]) -> bool {
    cross_averages(prices)
        .map(|((prev50, prev200), (sma50, sma200))| prev50 <= prev200 && sma50 > sma200)
        .unwrap_or(false)
}

pub fn is_death_cross(prices: &[f64]) -> bool {
    cross_averages(prices)
        .map(|((prev50, prev200), (sma50, sma200))| prev50 >= prev200 && sma50 < sma200)
        .unwrap_or(false)
}

/// Trend of the last 20 samples and volatility of the last 5.
fn flag_shape(prices: &[f64]) -> Option<(f64, f64)> {
    if prices.len() < 20 {
        return None;
    }
    let recent = &prices[prices.len() - 20..];
    Some((
        Trend.calculate(recent),
        Volatility.calculate(&recent[recent.len() - 5..]),
    ))
}

pub fn is_bull_flag(prices: &[f64]) -> bool {
    flag_shape(prices)
        .map(|(trend, consolidation)| trend > 0.02 && consolidation < 0.1)
        .unwrap_or(false)
}

pub fn is_bear_flag(prices: &[f64]) -> bool {
    flag_shape(prices)
        .map(|(trend, consolidation)| trend < -0.02 && consolidation < 0.1)
        .unwrap_or(false)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn is_cup_and_handle(prices: &[f64]) -> bool {
    if prices.len() < 50 {
        return false;
    }

    let window = &prices[prices.len() - 50..];
    let mid = window.len() / 2;
    let left_high = max_of(&window[..mid]);
    let bottom = min_of(&window[mid - 10..mid + 10]);
    let right_high = max_of(&window[mid..]);

    if left_high <= 0.0 {
        return false;
    }

    (left_high - right_high).abs() / left_high < 0.05 && (left_high - bottom) / left_high > 0.1
}

pub fn is_head_and_shoulders(prices: &[f64]) -> bool {
    if prices.len() < 30 {
        return false;
    }

    let window = &prices[prices.len() - 30..];
    let third = window.len() / 3;
    let left_shoulder = max_of(&window[..third]);
    let head = max_of(&window[third..third * 2]);
    let right_shoulder = max_of(&window[third * 2..]);

    if left_shoulder <= 0.0 {
        return false;
    }

    head > left_shoulder
        && head > right_shoulder
        && (left_shoulder - right_shoulder).abs() / left_shoulder < 0.05
}

/// Flat highs with rising lows over consecutive 5-sample blocks.
pub fn is_triangle(prices: &[f64]) -> bool {
    const BLOCK: usize = 5;
    if prices.len() <= BLOCK * 2 {
        return false;
    }

    let (highs, lows): (Vec<f64>, Vec<f64>) = (0..prices.len() - BLOCK)
        .step_by(BLOCK)
        .map(|i| {
            let block = &prices[i..i + BLOCK];
            (max_of(block), min_of(block))
        })
        .unzip();

    Trend.calculate(&highs).abs() < 0.01 && Trend.calculate(&lows) > 0.01
}

pub fn is_range(prices: &[f64]) -> bool {
    if prices.len() < 2 {
        return false;
    }
    Volatility.calculate(prices) < 0.15 && Trend.calculate(prices).abs() < 0.001
}

/// Classify a snapshot setup from its simple features; the strongest wins.
pub fn detect_setup(features: &SimpleFeatures) -> Pattern {
    let mut matches = Vec::new();

    if features.volatility > 0.3 && features.momentum > 0.6 {
        matches.push(PatternKind::BullishBreakout);
    }
    if (features.rsi > 75.0 || features.rsi < 25.0) && features.volume > 2.0 {
        matches.push(if features.rsi > 75.0 {
            PatternKind::BearishReversal
        } else {
            PatternKind::BullishReversal
        });
    }
    if features.momentum > 0.8 && features.macd > 0.0 {
        matches.push(PatternKind::MomentumSurge);
    }
    if features.change.abs() > 5.0 && features.rsi != 50.0 {
        matches.push(PatternKind::MeanReversion);
    }
    if features.volatility < 0.15 && features.change.abs() < 2.0 {
        matches.push(PatternKind::Consolidation);
    }

    ChartPatternSet::from_matches(matches).strongest()
}
