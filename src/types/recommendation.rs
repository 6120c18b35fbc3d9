use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Action, FlowSignal, FlowSignalLabel, Pattern, SignalDirection};

/// Trading strategy styles the rule scorer chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    Momentum,
    MeanReversion,
    Breakout,
    Swing,
    Scalping,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Momentum,
        StrategyKind::MeanReversion,
        StrategyKind::Breakout,
        StrategyKind::Swing,
        StrategyKind::Scalping,
    ];

    /// Registry key for this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Momentum => "momentum",
            StrategyKind::MeanReversion => "meanReversion",
            StrategyKind::Breakout => "breakout",
            StrategyKind::Swing => "swing",
            StrategyKind::Scalping => "scalping",
        }
    }
}

/// Softmax output of the network, one probability per direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalProbabilities {
    pub buy_strong: f64,
    pub buy: f64,
    pub hold: f64,
    pub sell: f64,
    pub sell_strong: f64,
}

impl SignalProbabilities {
    pub fn from_array(values: [f64; 5]) -> Self {
        Self {
            buy_strong: values[0],
            buy: values[1],
            hold: values[2],
            sell: values[3],
            sell_strong: values[4],
        }
    }

    /// Values in `SignalDirection::ALL` order.
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.buy_strong,
            self.buy,
            self.hold,
            self.sell,
            self.sell_strong,
        ]
    }

    /// Most probable direction; ties resolve to the earlier direction.
    pub fn arg_max(&self) -> SignalDirection {
        let values = self.to_array();
        let mut best = 0;
        for (i, v) in values.iter().enumerate() {
            if *v > values[best] {
                best = i;
            }
        }
        SignalDirection::ALL[best]
    }

    pub fn max(&self) -> f64 {
        self.to_array().into_iter().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Result of scoring one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub action: Action,
    /// Five-level direction behind the action.
    pub signal: SignalDirection,
    /// 0-100.
    pub confidence: f64,
    /// Raw signed score of the rule path, or the expected-return proxy of the network.
    pub score: f64,
    pub strategy: String,
    pub reasoning: String,
    pub volatility: f64,
    pub momentum: f64,
    /// 0-1, rule path only.
    pub technical_strength: f64,
    /// Strongest matched pattern.
    pub pattern: Pattern,
    /// Registry key of the matched pattern set.
    pub pattern_key: String,
    /// Historical success rate of `pattern_key`.
    pub pattern_success: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<SignalProbabilities>,
}

/// Caller options for recommendation generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationOptions {
    /// Restrict to these symbols, in this order.
    pub symbols: Option<Vec<String>>,
    /// Maximum number of recommendations returned.
    pub limit: Option<usize>,
    /// Timeframe label overriding the computed one.
    pub timeframe: Option<String>,
    /// Keep HOLD recommendations.
    pub include_hold: bool,
    /// Account size used for position sizing.
    pub capital: Option<f64>,
    /// Minimum confidence (exclusive) for a candidate to be kept.
    pub min_confidence: Option<f64>,
    /// Options-flow signal to fold into every candidate.
    pub flow_signal: Option<FlowSignal>,
}

/// A ranked trade idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    pub symbol: String,
    pub action: Action,
    pub signal: SignalDirection,
    /// 0-100.
    pub confidence: f64,
    pub strategy: String,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub reasoning: String,
    /// Formatted as `1:x.x`.
    pub risk_reward_ratio: String,
    pub timeframe: String,
    pub pattern: String,
    /// Historical success rate of the pattern, 0.5 when unseen.
    pub pattern_success: f64,
    /// Market sentiment in [-1, 1].
    pub sentiment: f64,
    /// 0-1 ranking weight.
    pub priority: f64,
    /// Expected percent return.
    pub expected_return: f64,
    pub risk: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_signal: Option<FlowSignalLabel>,
    /// Unix timestamp (milliseconds).
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_kind_keys() {
        assert_eq!(StrategyKind::MeanReversion.as_str(), "meanReversion");
        assert_eq!(
            serde_json::to_string(&StrategyKind::MeanReversion).unwrap(),
            "\"meanReversion\""
        );
    }

    #[test]
    fn test_probabilities_arg_max() {
        let p = SignalProbabilities::from_array([0.1, 0.5, 0.2, 0.1, 0.1]);
        assert_eq!(p.arg_max(), SignalDirection::Buy);
        assert_eq!(p.max(), 0.5);
    }

    #[test]
    fn test_probabilities_tie_keeps_first() {
        let p = SignalProbabilities::from_array([0.2; 5]);
        assert_eq!(p.arg_max(), SignalDirection::StrongBuy);
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: RecommendationOptions =
            serde_json::from_str(r#"{"limit": 3, "includeHold": true}"#).unwrap();
        assert_eq!(options.limit, Some(3));
        assert!(options.include_hold);
        assert!(options.symbols.is_none());
    }
}
