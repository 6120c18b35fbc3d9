use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Performance aggregate for one named strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyStats {
    pub trades: u64,
    pub wins: u64,
    pub losses: u64,
    /// Sum of percent returns.
    pub total_return: f64,
    pub avg_return: f64,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
    /// EMA of win/loss outcomes in [0, 1].
    pub performance: f64,
    /// Allocation weight in [0.05, 0.4].
    pub weight: f64,
}

impl Default for StrategyStats {
    fn default() -> Self {
        Self {
            trades: 0,
            wins: 0,
            losses: 0,
            total_return: 0.0,
            avg_return: 0.0,
            win_rate: 0.0,
            sharpe_ratio: 0.0,
            performance: 0.5,
            weight: 0.1,
        }
    }
}

/// Outcome aggregate for one named pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternStats {
    pub occurrences: u64,
    /// Running share of profitable occurrences.
    pub success_rate: f64,
    /// Sum of percent returns.
    pub total_return: f64,
}

/// A trade the caller has closed.
///
/// `strategy` and `profit` are required for learning; they are optional here
/// so that a missing value is reported as a typed error instead of a
/// deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClosedTrade {
    pub symbol: Option<String>,
    pub strategy: Option<String>,
    pub pattern: Option<String>,
    pub profit: Option<f64>,
    pub percent_return: f64,
    /// Feature vector captured at entry, used for the training log.
    pub entry_features: Option<Vec<f64>>,
}

impl ClosedTrade {
    pub fn new(strategy: impl Into<String>, profit: f64, percent_return: f64) -> Self {
        Self {
            strategy: Some(strategy.into()),
            profit: Some(profit),
            percent_return,
            ..Default::default()
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_features(mut self, features: Vec<f64>) -> Self {
        self.entry_features = Some(features);
        self
    }
}

/// A validated closed trade as kept in the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    pub strategy: String,
    #[serde(default)]
    pub pattern: Option<String>,
    pub profit: f64,
    pub percent_return: f64,
    /// Unix timestamp (milliseconds).
    pub timestamp: i64,
}

/// One labelled sample in the training log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSample {
    pub features: Vec<f64>,
    /// One-hot outcome in strong-buy..strong-sell order.
    pub outcome: [f64; 5],
    #[serde(default)]
    pub symbol: Option<String>,
    pub strategy: String,
    pub timestamp: i64,
}

/// Running model quality counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelState {
    /// EMA of trade wins.
    pub accuracy: f64,
    /// Closed trades learned from.
    pub epochs: u64,
}

impl Default for ModelState {
    fn default() -> Self {
        Self {
            accuracy: 0.65,
            epochs: 0,
        }
    }
}

/// Summary returned after a closed trade was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningUpdate {
    pub strategy: String,
    pub strategy_performance: f64,
    pub strategy_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_success_rate: Option<f64>,
    pub model_accuracy: f64,
    pub epochs: u64,
    pub training_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedStrategyStats {
    pub name: String,
    #[serde(flatten)]
    pub stats: StrategyStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedPatternStats {
    pub name: String,
    #[serde(flatten)]
    pub stats: PatternStats,
}

/// Aggregate performance over every recorded trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub model_accuracy: f64,
    pub epochs: u64,
    pub total_trades: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub profit_factor: f64,
    pub strategies: Vec<NamedStrategyStats>,
    /// Top ten patterns by success rate.
    pub patterns: Vec<NamedPatternStats>,
    /// Last ten trades.
    pub recent_trades: Vec<TradeRecord>,
}

/// Serializable copy of a learning registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrySnapshot {
    pub model: ModelState,
    pub strategies: BTreeMap<String, StrategyStats>,
    pub patterns: BTreeMap<String, PatternStats>,
    pub trades: Vec<TradeRecord>,
    pub training_log: Vec<TrainingSample>,
}

/// Realised result of a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLoss {
    pub profit: f64,
    pub percent_return: f64,
}
