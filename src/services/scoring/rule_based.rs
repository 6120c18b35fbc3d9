//! Rule-based heuristic scorer.
//!
//! Accumulates a signed score from fixed feature thresholds and a
//! price-action sub-score, then maps it to BUY/SELL/HOLD at +-0.15.
//!
//! # Confidence
//! `min(|score| * 80 + 50, 95)`, then:
//! - x0.90 when the session moved more than 8%
//! - x1.05 when volume exceeds 1M shares
//! - x0.95 outside 9:00-16:59 local time
//!
//! clamped to [50, 95] and rounded to one decimal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Scorer, ScorerKind, ScoringInput};
use crate::error::Result;
use crate::services::features::{FeatureExtractor, SimpleFeatures};
use crate::services::indicators::RsiMode;
use crate::services::learning::LearningRegistry;
use crate::services::patterns::detect_setup;
use crate::types::{Action, MarketSnapshot, Pattern, ScoreOutcome, SignalDirection, StrategyKind};

/// Score above which the action is BUY (and below whose negation, SELL).
pub const ACTION_THRESHOLD: f64 = 0.15;

const CONFIDENCE_SCALE: f64 = 80.0;
const MIN_CONFIDENCE: f64 = 50.0;
const MAX_CONFIDENCE: f64 = 95.0;

/// Direction and factors of the session's market sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentiment {
    /// In [-1, 1].
    pub score: f64,
    pub factors: Vec<String>,
    pub label: String,
}

/// Score contribution of gaps, range width and close position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAction {
    pub score: f64,
    pub factors: Vec<String>,
}

/// Where the price sits inside the session range, if the range is non-empty.
fn range_position(snapshot: &MarketSnapshot) -> Option<f64> {
    let width = snapshot.high - snapshot.low;
    if width > 0.0 {
        Some((snapshot.price - snapshot.low) / width)
    } else {
        None
    }
}

/// Session sentiment from the daily change and the close position.
pub fn market_sentiment(snapshot: &MarketSnapshot) -> Sentiment {
    let mut score = 0.0;
    let mut factors = Vec::new();

    if snapshot.change_percent > 3.0 {
        score += 0.3;
        factors.push("Strong positive momentum".to_string());
    } else if snapshot.change_percent < -3.0 {
        score -= 0.3;
        factors.push("Strong negative momentum".to_string());
    }

    match range_position(snapshot) {
        Some(p) if p > 0.8 => {
            score += 0.15;
            factors.push("Trading near highs".to_string());
        }
        Some(p) if p < 0.2 => {
            score -= 0.15;
            factors.push("Trading near lows".to_string());
        }
        _ => {}
    }

    let label = if score > 0.2 {
        "Bullish"
    } else if score < -0.2 {
        "Bearish"
    } else {
        "Neutral"
    };

    Sentiment {
        score: f64::clamp(score, -1.0, 1.0),
        factors,
        label: label.to_string(),
    }
}

pub fn price_action(snapshot: &MarketSnapshot) -> PriceAction {
    let mut score = 0.0;
    let mut factors = Vec::new();

    if snapshot.open > 0.0 {
        let gap = (snapshot.price - snapshot.open) / snapshot.open * 100.0;
        if gap.abs() > 2.0 {
            score += if gap > 0.0 { 0.1 } else { -0.1 };
            factors.push(format!(
                "{} gap of {:.1}%",
                if gap > 0.0 { "Positive" } else { "Negative" },
                gap.abs()
            ));
        }

        let range = (snapshot.high - snapshot.low) / snapshot.open * 100.0;
        if range > 4.0 {
            score += 0.05;
            factors.push(format!("Wide trading range ({:.1}%)", range));
        }
    }

    match range_position(snapshot) {
        Some(p) if p > 0.8 => {
            score += 0.1;
            factors.push("Closing near session highs".to_string());
        }
        Some(p) if p < 0.2 => {
            score -= 0.1;
            factors.push("Closing near session lows".to_string());
        }
        _ => {}
    }

    PriceAction { score, factors }
}

/// Raw signed score from feature thresholds plus price action.
pub fn technical_score(features: &SimpleFeatures, snapshot: &MarketSnapshot) -> f64 {
    let mut score = 0.0;

    if features.rsi < 30.0 {
        score += 0.4;
    } else if features.rsi > 70.0 {
        score -= 0.4;
    } else if (40.0..=60.0).contains(&features.rsi) {
        score += 0.1;
    }

    if features.momentum > 0.3 {
        if features.macd > 0.0 {
            score += 0.3;
        } else if features.macd < 0.0 {
            score -= 0.3;
        }
    }

    if features.volume > 3.0 {
        score += 0.2;
    } else if features.volume < 1.0 {
        score -= 0.1;
    }

    if features.volatility > 0.4 {
        score += 0.15;
    } else if features.volatility < 0.1 {
        score -= 0.05;
    }

    if features.momentum > 0.5 {
        if features.trend > 0.0 {
            score += 0.35;
        } else if features.trend < 0.0 {
            score -= 0.35;
        }
    }

    score + price_action(snapshot).score
}

pub fn action_for(score: f64) -> Action {
    if score > ACTION_THRESHOLD {
        Action::Buy
    } else if score < -ACTION_THRESHOLD {
        Action::Sell
    } else {
        Action::Hold
    }
}

/// Apply the market-condition multipliers to a base confidence.
pub fn adjust_confidence(base: f64, snapshot: &MarketSnapshot, hour: u32) -> f64 {
    let mut confidence = base;
    if snapshot.change_percent.abs() > 8.0 {
        confidence *= 0.9;
    }
    if snapshot.volume > 1_000_000.0 {
        confidence *= 1.05;
    }
    if !(9..=16).contains(&hour) {
        confidence *= 0.95;
    }
    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Fixed decision tree over momentum, RSI and volatility.
///
/// Falls through to the registry's best performer, or swing when the
/// registry is empty.
pub fn select_strategy(features: &SimpleFeatures, score: f64, registry: &LearningRegistry) -> String {
    let kind = if features.momentum > 0.7 && score.abs() > 0.3 {
        Some(StrategyKind::Momentum)
    } else if features.rsi > 70.0 || features.rsi < 30.0 {
        Some(StrategyKind::MeanReversion)
    } else if features.volatility > 0.35 && score.abs() > 0.25 {
        Some(StrategyKind::Breakout)
    } else if features.volatility < 0.2 {
        Some(StrategyKind::Swing)
    } else {
        None
    };

    match kind {
        Some(kind) => kind.as_str().to_string(),
        None => registry
            .best_strategy()
            .unwrap_or_else(|| StrategyKind::Swing.as_str().to_string()),
    }
}

/// How many indicators are giving a clear reading, in [0, 1].
pub fn technical_strength(features: &SimpleFeatures) -> f64 {
    let mut strength = 0.0;
    if (45.0..=55.0).contains(&features.rsi) {
        strength += 0.2;
    } else if features.rsi < 30.0 || features.rsi > 70.0 {
        strength += 0.3;
    }
    if features.macd.abs() > 0.5 {
        strength += 0.2;
    }
    if features.momentum > 0.6 {
        strength += 0.3;
    }
    if features.volume > 2.0 {
        strength += 0.2;
    }
    if features.volatility > 0.25 {
        strength += 0.1;
    }
    f64::min(strength, 1.0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Volatility-scaled take-profit, two decimals.
pub fn calculate_target(price: f64, action: Action, volatility: f64) -> f64 {
    let direction = if action == Action::Buy { 1.0 } else { -1.0 };
    let factor = volatility.clamp(0.02, 0.08);
    round_to(price * (1.0 + direction * factor * 2.0), 2)
}

/// Volatility-scaled stop, two decimals.
pub fn calculate_stop_loss(price: f64, action: Action, volatility: f64) -> f64 {
    let direction = if action == Action::Buy { -1.0 } else { 1.0 };
    let factor = volatility.clamp(0.015, 0.05);
    round_to(price * (1.0 + direction * factor * 1.5), 2)
}

/// Reward-to-risk formatted as `1:x.x`.
pub fn risk_reward(volatility: f64, confidence: f64) -> String {
    let risk = (volatility * 5.0).clamp(0.5, 3.0);
    let reward = (confidence / 20.0).clamp(1.0, 5.0);
    format!("1:{:.1}", reward / risk)
}

pub fn select_timeframe(volatility: f64, momentum: f64) -> &'static str {
    if volatility > 0.4 && momentum > 0.7 {
        "1-2 days"
    } else if volatility > 0.25 {
        "2-5 days"
    } else if momentum < 0.3 {
        "1-3 weeks"
    } else {
        "3-7 days"
    }
}

/// Ranking weight in [0, 1].
pub fn priority(
    confidence: f64,
    pattern_strength: f64,
    sentiment_score: f64,
    strategy_performance: f64,
) -> f64 {
    let value = confidence / 100.0
        + pattern_strength * 0.3
        + sentiment_score.abs() * 0.2
        + strategy_performance * 0.3;
    value.clamp(0.0, 1.0)
}

fn reasoning(action: Action, pattern: &Pattern, sentiment: &Sentiment, snapshot: &MarketSnapshot) -> String {
    let mut reasons: Vec<String> = Vec::new();

    match action {
        Action::Buy => reasons.push("Technical indicators suggest bullish momentum".to_string()),
        Action::Sell => reasons.push("Technical indicators suggest bearish pressure".to_string()),
        Action::Hold => {}
    }
    if pattern.strength > 0.6 {
        reasons.push(format!("Strong {} pattern detected", pattern.name.display_name()));
    }
    if sentiment.score > 0.2 {
        reasons.push("Market sentiment is bullish".to_string());
    } else if sentiment.score < -0.2 {
        reasons.push("Market sentiment is bearish".to_string());
    }
    if snapshot.volume > 2_000_000.0 {
        reasons.push("High volume supports the move".to_string());
    }
    if snapshot.change_percent.abs() > 3.0 {
        reasons.push(format!(
            "Strong {} price movement",
            if snapshot.change_percent > 0.0 { "upward" } else { "downward" }
        ));
    }

    format!("{}.", reasons.join(". "))
}

/// Strong signals need |score| above 0.6 on top of the action threshold.
fn signal_for(action: Action, score: f64) -> SignalDirection {
    match action {
        Action::Buy if score > 0.6 => SignalDirection::StrongBuy,
        Action::Buy => SignalDirection::Buy,
        Action::Sell if score < -0.6 => SignalDirection::StrongSell,
        Action::Sell => SignalDirection::Sell,
        Action::Hold => SignalDirection::Neutral,
    }
}

/// Heuristic scorer over [`SimpleFeatures`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedScorer {
    extractor: FeatureExtractor,
}

impl RuleBasedScorer {
    pub fn new(rsi_mode: RsiMode) -> Self {
        Self {
            extractor: FeatureExtractor::new(rsi_mode),
        }
    }

    /// Score already-extracted features.
    pub fn evaluate(
        &self,
        features: &SimpleFeatures,
        snapshot: &MarketSnapshot,
        hour: u32,
        registry: &LearningRegistry,
    ) -> ScoreOutcome {
        let score = technical_score(features, snapshot);
        let action = action_for(score);

        let base = f64::min(score.abs() * CONFIDENCE_SCALE + MIN_CONFIDENCE, MAX_CONFIDENCE);
        let confidence = round_to(adjust_confidence(base, snapshot, hour), 1);

        let strategy = select_strategy(features, score, registry);
        let pattern = detect_setup(features);
        let pattern_key = pattern.name.as_str().to_string();
        let pattern_success = registry.pattern_success_rate(&pattern_key);
        let sentiment = market_sentiment(snapshot);

        let signal = signal_for(action, score);

        debug!(
            "{}: rule score {:.3} -> {} ({:.1}%), strategy {}, pattern {}",
            snapshot.symbol,
            score,
            action.as_str(),
            confidence,
            strategy,
            pattern_key
        );

        ScoreOutcome {
            action,
            signal,
            confidence,
            score,
            strategy,
            reasoning: reasoning(action, &pattern, &sentiment, snapshot),
            volatility: features.volatility,
            momentum: features.momentum,
            technical_strength: technical_strength(features),
            pattern,
            pattern_key,
            pattern_success,
            probabilities: None,
        }
    }
}

impl Scorer for RuleBasedScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::RuleBased
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreOutcome> {
        let features = self.extractor.simple(input.snapshot, input.history)?;
        Ok(self.evaluate(&features, input.snapshot, input.hour(), input.registry))
    }
}
