//! Recommendation composition.
//!
//! Scores every requested symbol, attaches targets, stops, risk and
//! pattern statistics, folds in an optional options-flow signal, then
//! ranks and truncates. Two profiles exist, one per scorer:
//!
//! | | rule based | network |
//! |---|---|---|
//! | targets | volatility scaled | 2x / 3x ATR |
//! | ranking | priority x confidence | confidence x expected return |
//! | min confidence | 65 | 60 |
//! | default limit | 8 | 5 |

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::indicators::Atr;
use super::learning::{encode_outcome, LearningRegistry};
use super::history::PriceHistoryStore;
use super::scoring::rule_based::{
    calculate_stop_loss, calculate_target, market_sentiment, priority, risk_reward,
    select_timeframe,
};
use super::scoring::{Scorer, ScorerKind, ScoringInput};
use crate::error::Result;
use crate::types::{
    Action, ClosedTrade, FlowSignal, LearningUpdate, MarketSnapshot, PriceSeries, Recommendation,
    RecommendationOptions, ScoreOutcome, TrainingSample,
};

/// Capital assumed for position sizing when the caller gives none.
pub const DEFAULT_CAPITAL: f64 = 10_000.0;

/// Largest fraction of capital risked per trade.
const MAX_RISK_PER_TRADE: f64 = 0.02;

/// Largest fraction of capital in one position.
const MAX_POSITION_FRACTION: f64 = 0.25;

/// `min(capital * 2% / risk, capital * 25%)`; the cap alone when risk is not positive.
pub fn position_size(capital: f64, risk: f64) -> f64 {
    let cap = capital * MAX_POSITION_FRACTION;
    if risk > 0.0 {
        f64::min(capital * MAX_RISK_PER_TRADE / risk, cap)
    } else {
        cap
    }
}

/// ATR-scaled stop (2x) and target (3x); both equal the price for HOLD.
pub fn atr_levels(price: f64, action: Action, atr: f64) -> (f64, f64) {
    match action {
        Action::Buy => (price * (1.0 - atr * 2.0), price * (1.0 + atr * 3.0)),
        Action::Sell => (price * (1.0 + atr * 2.0), price * (1.0 - atr * 3.0)),
        Action::Hold => (price, price),
    }
}

fn append_reason(reasoning: &mut String, line: &str) {
    if reasoning.is_empty() || reasoning == "." {
        *reasoning = format!("{}.", line);
    } else if reasoning.ends_with('.') {
        reasoning.push_str(&format!(" {}.", line));
    } else {
        reasoning.push_str(&format!(". {}", line));
    }
}

/// Composes ranked recommendations from market snapshots.
pub struct RecommendationEngine {
    scorer: Arc<dyn Scorer>,
    registry: Arc<LearningRegistry>,
    history: Arc<PriceHistoryStore>,
    default_limit: Option<usize>,
    min_confidence: Option<f64>,
}

struct Candidate {
    rank: f64,
    recommendation: Recommendation,
}

impl RecommendationEngine {
    pub fn new(
        scorer: Arc<dyn Scorer>,
        registry: Arc<LearningRegistry>,
        history: Arc<PriceHistoryStore>,
    ) -> Self {
        Self {
            scorer,
            registry,
            history,
            default_limit: None,
            min_confidence: None,
        }
    }

    /// Override the scorer's default limit.
    pub fn with_default_limit(mut self, limit: Option<usize>) -> Self {
        self.default_limit = limit;
        self
    }

    /// Override the scorer's minimum confidence.
    pub fn with_min_confidence(mut self, min_confidence: Option<f64>) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn kind(&self) -> ScorerKind {
        self.scorer.kind()
    }

    pub fn registry(&self) -> &Arc<LearningRegistry> {
        &self.registry
    }

    pub fn history(&self) -> &Arc<PriceHistoryStore> {
        &self.history
    }

    /// Stored history for the snapshot's symbol, or a synthetic one.
    pub fn history_for(&self, snapshot: &MarketSnapshot) -> PriceSeries {
        self.history
            .series_or_synthetic(&snapshot.symbol, snapshot.price)
    }

    /// Score one snapshot, against `history` when given.
    pub fn score_snapshot(
        &self,
        snapshot: &MarketSnapshot,
        history: Option<&PriceSeries>,
    ) -> Result<ScoreOutcome> {
        let owned;
        let history = match history {
            Some(history) => history,
            None => {
                owned = self.history_for(snapshot);
                &owned
            }
        };
        self.scorer
            .score(&ScoringInput::new(snapshot, history, &self.registry))
    }

    /// Ranked recommendations for the requested symbols.
    ///
    /// Symbols without a snapshot and snapshots that fail validation are
    /// skipped. The result never exceeds the limit and is sorted by the
    /// profile's ranking key, highest first.
    pub fn generate(
        &self,
        snapshots: &BTreeMap<String, MarketSnapshot>,
        options: &RecommendationOptions,
    ) -> Vec<Recommendation> {
        let kind = self.scorer.kind();
        let limit = options
            .limit
            .or(self.default_limit)
            .unwrap_or_else(|| kind.default_limit());
        let min_confidence = options
            .min_confidence
            .or(self.min_confidence)
            .unwrap_or_else(|| kind.default_min_confidence());

        let symbols: Vec<String> = match &options.symbols {
            Some(symbols) => symbols.clone(),
            None => snapshots.keys().cloned().collect(),
        };

        let mut candidates: Vec<Candidate> = Vec::new();
        for symbol in &symbols {
            let Some(snapshot) = snapshots.get(symbol) else {
                debug!("No snapshot for {}", symbol);
                continue;
            };
            let mut snapshot = snapshot.clone();
            if snapshot.symbol.is_empty() {
                snapshot.symbol = symbol.clone();
            }

            let history = self.history_for(&snapshot);
            let outcome = match self
                .scorer
                .score(&ScoringInput::new(&snapshot, &history, &self.registry))
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Skipping {}: {}", symbol, e);
                    continue;
                }
            };

            let candidate = self.compose(&snapshot, &history, outcome, options);
            if candidate.recommendation.confidence <= min_confidence {
                continue;
            }
            if candidate.recommendation.action == Action::Hold && !options.include_hold {
                continue;
            }
            candidates.push(candidate);
        }

        candidates.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        candidates.truncate(limit);

        info!(
            "Generated {} {} recommendations from {} symbols",
            candidates.len(),
            kind,
            symbols.len()
        );

        candidates.into_iter().map(|c| c.recommendation).collect()
    }

    fn compose(
        &self,
        snapshot: &MarketSnapshot,
        history: &PriceSeries,
        outcome: ScoreOutcome,
        options: &RecommendationOptions,
    ) -> Candidate {
        let price = snapshot.price;
        let action = outcome.action;
        let sentiment = market_sentiment(snapshot);
        let mut confidence = outcome.confidence;
        let mut reasoning = outcome.reasoning;

        let (stop_loss, target_price, risk, expected_return, timeframe) = match self.scorer.kind() {
            ScorerKind::RuleBased => {
                let target = calculate_target(price, action, outcome.volatility);
                let stop = calculate_stop_loss(price, action, outcome.volatility);
                (
                    stop,
                    target,
                    (price - stop).abs() / price,
                    (target - price) / price * 100.0,
                    select_timeframe(outcome.volatility, outcome.momentum).to_string(),
                )
            }
            ScorerKind::Network => {
                let atr = Atr::default().calculate(history);
                let (stop, target) = atr_levels(price, action, atr);
                (
                    stop,
                    target,
                    f64::min(outcome.volatility * atr, 1.0),
                    outcome.score,
                    "1D".to_string(),
                )
            }
        };

        let mut priority = priority(
            confidence,
            outcome.pattern.strength,
            sentiment.score,
            self.registry.strategy_performance(&outcome.strategy),
        );

        let flow_label = options.flow_signal.as_ref().map(|flow| {
            apply_flow_signal(flow, action, &mut confidence, &mut priority, &mut reasoning);
            flow.signal
        });

        let risk_reward = match self.scorer.kind() {
            ScorerKind::RuleBased => risk_reward(outcome.volatility, confidence),
            ScorerKind::Network => {
                let risk_distance = (price - stop_loss).abs();
                let reward = if risk_distance > 0.0 {
                    (target_price - price).abs() / risk_distance
                } else {
                    0.0
                };
                format!("1:{:.1}", reward)
            }
        };

        let position_size = match (self.scorer.kind(), options.capital) {
            (_, Some(capital)) => Some(position_size(capital, risk)),
            (ScorerKind::Network, None) => Some(position_size(DEFAULT_CAPITAL, risk)),
            (ScorerKind::RuleBased, None) => None,
        };

        let rank = match self.scorer.kind() {
            ScorerKind::RuleBased => priority * confidence,
            ScorerKind::Network => confidence * expected_return,
        };

        Candidate {
            rank,
            recommendation: Recommendation {
                id: Uuid::new_v4(),
                symbol: snapshot.symbol.clone(),
                action,
                signal: outcome.signal,
                confidence,
                strategy: outcome.strategy,
                entry_price: price,
                target_price,
                stop_loss,
                reasoning,
                risk_reward_ratio: risk_reward,
                timeframe: options.timeframe.clone().unwrap_or(timeframe),
                pattern: outcome.pattern_key,
                pattern_success: outcome.pattern_success,
                sentiment: sentiment.score,
                priority,
                expected_return,
                risk,
                position_size,
                flow_signal: flow_label,
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        }
    }

    /// Learn from a closed trade and feed its sample to the scorer.
    pub fn record_closed_trade(&self, trade: &ClosedTrade) -> Result<LearningUpdate> {
        let update = self.registry.record_closed_trade(trade)?;
        if let Some(features) = &trade.entry_features {
            self.scorer.learn(&TrainingSample {
                features: features.clone(),
                outcome: encode_outcome(if trade.percent_return.is_finite() {
                    trade.percent_return
                } else {
                    0.0
                }),
                symbol: trade.symbol.clone(),
                strategy: update.strategy.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            });
        }
        Ok(update)
    }
}

/// Raise confidence and priority when the flow agrees with the action,
/// lower them when it disagrees. Neutral flow and HOLD leave them alone.
fn apply_flow_signal(
    flow: &FlowSignal,
    action: Action,
    confidence: &mut f64,
    priority: &mut f64,
    reasoning: &mut String,
) {
    let direction = flow.signal.direction();
    let side = action.sign() as i8;
    if direction == 0 || side == 0 {
        return;
    }

    let label = flow.signal.as_str();

    if direction == side {
        *confidence = (*confidence * 1.05).min(100.0);
        *priority = (*priority + 0.1).min(1.0);
        append_reason(reasoning, &format!("Options flow ({}) confirms the signal", label));
    } else {
        *confidence *= 0.95;
        *priority = (*priority - 0.1).max(0.0);
        append_reason(reasoning, &format!("Options flow ({}) contradicts the signal", label));
    }
}
