//! Strategy and pattern learning registry.
//!
//! Keeps per-strategy and per-pattern outcome statistics, the closed-trade
//! log and a capped training log. All state sits behind a single lock so a
//! read-modify-write of one trade is atomic with respect to other callers.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::types::{
    Action, ClosedTrade, LearningUpdate, ModelState, NamedPatternStats, NamedStrategyStats,
    PatternStats, PerformanceMetrics, ProfitLoss, RegistrySnapshot, StrategyStats, TradeRecord,
    TrainingSample,
};

/// Maximum samples kept in the training log.
pub const TRAINING_LOG_CAPACITY: usize = 10_000;

/// Success rate assumed for a pattern never seen before.
pub const DEFAULT_PATTERN_SUCCESS: f64 = 0.5;

/// Annual risk-free rate subtracted in Sharpe ratios.
const RISK_FREE_RATE: f64 = 0.02;

/// One-hot outcome label for a percent return.
pub fn encode_outcome(percent_return: f64) -> [f64; 5] {
    if percent_return > 10.0 {
        [1.0, 0.0, 0.0, 0.0, 0.0]
    } else if percent_return > 3.0 {
        [0.0, 1.0, 0.0, 0.0, 0.0]
    } else if percent_return > -3.0 {
        [0.0, 0.0, 1.0, 0.0, 0.0]
    } else if percent_return > -10.0 {
        [0.0, 0.0, 0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 0.0, 0.0, 1.0]
    }
}

/// Profit and percent return of a round trip.
///
/// A sell profits when the exit is below the entry. Hold is flat.
pub fn profit_loss(action: Action, entry: f64, exit: f64, quantity: f64) -> ProfitLoss {
    let sign = action.sign();
    let percent_return = if entry == 0.0 {
        0.0
    } else {
        (exit - entry) / entry * 100.0 * sign
    };
    ProfitLoss {
        profit: (exit - entry) * quantity * sign,
        percent_return,
    }
}

/// Sharpe ratio of percent returns, 0 with fewer than two samples or no spread.
fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let avg = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / returns.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        0.0
    } else {
        (avg - RISK_FREE_RATE) / std_dev
    }
}

/// Process-wide learning state shared by recommendation generation.
#[derive(Debug, Default)]
pub struct LearningRegistry {
    state: RwLock<RegistrySnapshot>,
    /// Held across snapshot and write so saves land in order.
    save_lock: Mutex<()>,
}

impl LearningRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with prior strategy and setup statistics.
    pub fn with_priors() -> Self {
        let strategy = |performance: f64, weight: f64, trades: u64| StrategyStats {
            trades,
            performance,
            weight,
            ..Default::default()
        };
        let pattern = |success_rate: f64, occurrences: u64| PatternStats {
            occurrences,
            success_rate,
            total_return: 0.0,
        };

        let strategies = BTreeMap::from([
            ("momentum".to_string(), strategy(0.72, 0.25, 156)),
            ("meanReversion".to_string(), strategy(0.64, 0.20, 98)),
            ("breakout".to_string(), strategy(0.78, 0.30, 134)),
            ("swing".to_string(), strategy(0.61, 0.15, 87)),
            ("scalping".to_string(), strategy(0.55, 0.10, 234)),
        ]);
        let patterns = BTreeMap::from([
            ("bullish_breakout".to_string(), pattern(0.78, 145)),
            ("bearish_reversal".to_string(), pattern(0.65, 89)),
            ("consolidation".to_string(), pattern(0.52, 203)),
            ("momentum_surge".to_string(), pattern(0.81, 67)),
            ("mean_reversion".to_string(), pattern(0.69, 124)),
        ]);

        Self::from_snapshot(RegistrySnapshot {
            model: ModelState {
                accuracy: 0.73,
                epochs: 0,
            },
            strategies,
            patterns,
            trades: Vec::new(),
            training_log: Vec::new(),
        })
    }

    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            save_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistrySnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistrySnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serializes saves of this registry.
    pub fn save_guard(&self) -> MutexGuard<'_, ()> {
        self.save_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold one closed trade into the statistics.
    ///
    /// Rejects trades without a strategy or profit.
    pub fn record_closed_trade(&self, trade: &ClosedTrade) -> Result<LearningUpdate> {
        let strategy = trade
            .strategy
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(EngineError::IncompleteTradeRecord("strategy"))?
            .to_string();
        let profit = trade
            .profit
            .filter(|p| p.is_finite())
            .ok_or(EngineError::IncompleteTradeRecord("profit"))?;
        let percent_return = if trade.percent_return.is_finite() {
            trade.percent_return
        } else {
            0.0
        };
        let is_win = profit > 0.0;
        let now = chrono::Utc::now().timestamp_millis();

        let mut state = self.write();

        state.trades.push(TradeRecord {
            symbol: trade.symbol.clone(),
            strategy: strategy.clone(),
            pattern: trade.pattern.clone(),
            profit,
            percent_return,
            timestamp: now,
        });

        let strategy_returns: Vec<f64> = state
            .trades
            .iter()
            .filter(|t| t.strategy == strategy)
            .map(|t| t.percent_return)
            .collect();

        let stats = state.strategies.entry(strategy.clone()).or_default();
        stats.trades += 1;
        if is_win {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
        stats.total_return += percent_return;
        stats.avg_return = stats.total_return / stats.trades as f64;
        stats.win_rate = stats.wins as f64 / stats.trades as f64;
        stats.sharpe_ratio = sharpe_ratio(&strategy_returns);
        stats.performance = stats.performance * 0.9 + if is_win { 0.1 } else { 0.0 };
        if stats.performance > 0.6 {
            stats.weight = (stats.weight * 1.1).min(0.4);
        } else if stats.performance < 0.4 {
            stats.weight = (stats.weight * 0.9).max(0.05);
        }
        let (strategy_performance, strategy_weight) = (stats.performance, stats.weight);

        let pattern_success_rate = trade
            .pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|pattern| {
                let stats = state.patterns.entry(pattern.to_string()).or_default();
                stats.occurrences += 1;
                let n = stats.occurrences as f64;
                stats.success_rate =
                    (stats.success_rate * (n - 1.0) + if is_win { 1.0 } else { 0.0 }) / n;
                stats.total_return += percent_return;
                stats.success_rate
            });

        if let Some(features) = &trade.entry_features {
            state.training_log.push(TrainingSample {
                features: features.clone(),
                outcome: encode_outcome(percent_return),
                symbol: trade.symbol.clone(),
                strategy: strategy.clone(),
                timestamp: now,
            });
            let overflow = state.training_log.len().saturating_sub(TRAINING_LOG_CAPACITY);
            if overflow > 0 {
                state.training_log.drain(..overflow);
            }
        }

        state.model.epochs += 1;
        state.model.accuracy = state.model.accuracy * 0.99 + if is_win { 0.01 } else { 0.0 };

        info!(
            "Learned from {} trade (profit {:.2}): performance {:.3}, weight {:.3}, accuracy {:.1}%",
            strategy,
            profit,
            strategy_performance,
            strategy_weight,
            state.model.accuracy * 100.0
        );

        Ok(LearningUpdate {
            strategy,
            strategy_performance,
            strategy_weight,
            pattern_success_rate,
            model_accuracy: state.model.accuracy,
            epochs: state.model.epochs,
            training_samples: state.training_log.len(),
        })
    }

    pub fn strategy_stats(&self) -> BTreeMap<String, StrategyStats> {
        self.read().strategies.clone()
    }

    pub fn pattern_stats(&self) -> BTreeMap<String, PatternStats> {
        self.read().patterns.clone()
    }

    pub fn strategy(&self, name: &str) -> Option<StrategyStats> {
        self.read().strategies.get(name).cloned()
    }

    pub fn pattern(&self, name: &str) -> Option<PatternStats> {
        self.read().patterns.get(name).cloned()
    }

    /// Historical success rate of a pattern, 0.5 when unseen.
    pub fn pattern_success_rate(&self, name: &str) -> f64 {
        self.read()
            .patterns
            .get(name)
            .map(|p| p.success_rate)
            .unwrap_or(DEFAULT_PATTERN_SUCCESS)
    }

    /// Performance of a strategy, 0.5 when unseen.
    pub fn strategy_performance(&self, name: &str) -> f64 {
        self.read()
            .strategies
            .get(name)
            .map(|s| s.performance)
            .unwrap_or(0.5)
    }

    /// Strategy with the highest performance; ties keep name order.
    pub fn best_strategy(&self) -> Option<String> {
        let state = self.read();
        let mut best: Option<(&String, f64)> = None;
        for (name, stats) in &state.strategies {
            if best.map_or(true, |(_, perf)| stats.performance > perf) {
                best = Some((name, stats.performance));
            }
        }
        best.map(|(name, _)| name.clone())
    }

    pub fn model(&self) -> ModelState {
        self.read().model.clone()
    }

    pub fn training_samples(&self) -> usize {
        self.read().training_log.len()
    }

    /// Aggregate metrics over every recorded trade.
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        let state = self.read();
        let trades = &state.trades;
        let total = trades.len();

        let wins = trades.iter().filter(|t| t.profit > 0.0).count();
        let returns: Vec<f64> = trades.iter().map(|t| t.percent_return).collect();
        let (win_rate, avg_return) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                wins as f64 / total as f64,
                returns.iter().sum::<f64>() / total as f64,
            )
        };

        let mut peak = 0.0_f64;
        let mut running = 0.0_f64;
        let mut max_drawdown = 0.0_f64;
        for trade in trades {
            running += trade.profit;
            peak = peak.max(running);
            if peak > 0.0 {
                max_drawdown = max_drawdown.max((peak - running) / peak);
            }
        }

        let gross_profit: f64 = trades.iter().filter(|t| t.profit > 0.0).map(|t| t.profit).sum();
        let gross_loss: f64 = trades
            .iter()
            .filter(|t| t.profit < 0.0)
            .map(|t| t.profit)
            .sum::<f64>()
            .abs();
        let profit_factor = if gross_loss == 0.0 {
            gross_profit
        } else {
            gross_profit / gross_loss
        };

        let strategies = state
            .strategies
            .iter()
            .map(|(name, stats)| NamedStrategyStats {
                name: name.clone(),
                stats: stats.clone(),
            })
            .collect();

        let mut patterns: Vec<NamedPatternStats> = state
            .patterns
            .iter()
            .map(|(name, stats)| NamedPatternStats {
                name: name.clone(),
                stats: stats.clone(),
            })
            .collect();
        patterns.sort_by(|a, b| b.stats.success_rate.total_cmp(&a.stats.success_rate));
        patterns.truncate(10);

        PerformanceMetrics {
            model_accuracy: state.model.accuracy,
            epochs: state.model.epochs,
            total_trades: total,
            win_rate,
            avg_return,
            sharpe_ratio: sharpe_ratio(&returns),
            max_drawdown,
            profit_factor,
            strategies,
            patterns,
            recent_trades: trades[total.saturating_sub(10)..].to_vec(),
        }
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.read().clone()
    }

    /// Replace the full state.
    pub fn restore(&self, snapshot: RegistrySnapshot) {
        debug!(
            "Restoring registry: {} strategies, {} patterns, {} trades",
            snapshot.strategies.len(),
            snapshot.patterns.len(),
            snapshot.trades.len()
        );
        *self.write() = snapshot;
    }
}
