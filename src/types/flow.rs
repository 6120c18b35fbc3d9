use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// One option trade as reported by a flow feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsFlowRecord {
    pub symbol: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    /// Expiration date, `YYYY-MM-DD`.
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default)]
    pub premium: f64,
    #[serde(default)]
    pub volume: f64,
    /// Unix timestamp (milliseconds).
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

impl OptionsFlowRecord {
    pub fn is_call(&self) -> bool {
        self.option_type == OptionType::Call
    }

    pub fn is_put(&self) -> bool {
        self.option_type == OptionType::Put
    }
}

/// Large trades by premium or contract count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleActivity {
    pub total_whale_flows: usize,
    pub total_whale_premium: f64,
    pub whale_call_premium: f64,
    pub whale_put_premium: f64,
    /// Call premium / put premium; 999 when only calls, 0 when neither.
    pub whale_call_put_ratio: f64,
    pub average_whale_premium: f64,
    pub largest_flow: f64,
    /// First ten whale records in input order.
    pub whale_flows: Vec<OptionsFlowRecord>,
}

/// Five-level sentiment label derived from the sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowSentiment {
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    VeryBearish,
}

impl FlowSentiment {
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            FlowSentiment::VeryBullish
        } else if score > 60.0 {
            FlowSentiment::Bullish
        } else if score > 40.0 {
            FlowSentiment::Neutral
        } else if score > 30.0 {
            FlowSentiment::Bearish
        } else {
            FlowSentiment::VeryBearish
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAnalysis {
    pub call_count: usize,
    pub put_count: usize,
    pub call_volume: f64,
    pub put_volume: f64,
    pub call_premium: f64,
    pub put_premium: f64,
    pub call_put_ratio: f64,
    pub premium_ratio: f64,
    /// 0-100, 50 is neutral.
    pub sentiment_score: f64,
    pub sentiment: FlowSentiment,
}

impl Default for SentimentAnalysis {
    fn default() -> Self {
        Self {
            call_count: 0,
            put_count: 0,
            call_volume: 0.0,
            put_volume: 0.0,
            call_premium: 0.0,
            put_premium: 0.0,
            call_put_ratio: 1.0,
            premium_ratio: 1.0,
            sentiment_score: 50.0,
            sentiment: FlowSentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAnalysis {
    pub total_volume: f64,
    pub total_contracts: usize,
    pub avg_volume_per_contract: f64,
    pub max_volume_strike: f64,
    pub max_volume_amount: f64,
    /// Number of distinct strikes traded.
    pub strike_distribution: usize,
    /// Share of total volume at the busiest strike.
    pub volume_concentration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumFlow {
    pub total_premium: f64,
    pub avg_premium_per_flow: f64,
    pub largest_premium_flow: Option<OptionsFlowRecord>,
    /// Premium summed per strike, keyed by the strike formatted as text.
    pub premium_distribution: BTreeMap<String, f64>,
    pub high_premium_flows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAnalysis {
    pub total_flows: usize,
    pub recent_flows: usize,
    /// Share of flows in the last hour.
    pub recent_activity: f64,
    pub expiration_distribution: BTreeMap<String, usize>,
    pub most_popular_expiration: String,
    /// Distinct expirations at most seven days out.
    pub short_term_flows: usize,
}

impl Default for TimeAnalysis {
    fn default() -> Self {
        Self {
            total_flows: 0,
            recent_flows: 0,
            recent_activity: 0.0,
            expiration_distribution: BTreeMap::new(),
            most_popular_expiration: "unknown".to_string(),
            short_term_flows: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnusualKind {
    LargeTrades,
    StrikeConcentration,
    TimeConcentration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Significance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusualFinding {
    #[serde(rename = "type")]
    pub kind: UnusualKind,
    pub count: usize,
    pub description: String,
    pub significance: Significance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GammaImplication {
    PositiveGamma,
    NegativeGamma,
    NeutralGamma,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaExposure {
    pub call_gamma: f64,
    pub put_gamma: f64,
    pub net_gamma: f64,
    pub gamma_implication: GammaImplication,
    pub volatility_impact: Significance,
}

impl Default for GammaExposure {
    fn default() -> Self {
        Self {
            call_gamma: 0.0,
            put_gamma: 0.0,
            net_gamma: 0.0,
            gamma_implication: GammaImplication::NeutralGamma,
            volatility_impact: Significance::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyImplication {
    VolatilityPlay,
    DirectionalBet,
}

/// Multi-leg or aggressive structure inferred from one symbol's flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStrategy {
    #[serde(rename_all = "camelCase")]
    LongStraddle {
        symbol: String,
        strikes: Vec<f64>,
        confidence: f64,
        implication: StrategyImplication,
    },
    #[serde(rename_all = "camelCase")]
    Strangle {
        symbol: String,
        call_strikes: Vec<f64>,
        put_strikes: Vec<f64>,
        confidence: f64,
        implication: StrategyImplication,
    },
    #[serde(rename_all = "camelCase")]
    Sweep {
        symbol: String,
        strike: f64,
        volume: f64,
        premium: f64,
        confidence: f64,
        implication: StrategyImplication,
    },
}

impl FlowStrategy {
    pub fn symbol(&self) -> &str {
        match self {
            FlowStrategy::LongStraddle { symbol, .. }
            | FlowStrategy::Strangle { symbol, .. }
            | FlowStrategy::Sweep { symbol, .. } => symbol,
        }
    }
}

/// Directional label of the combined flow signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowSignalLabel {
    Bullish,
    SlightlyBullish,
    Neutral,
    SlightlyBearish,
    Bearish,
    NoData,
}

impl FlowSignalLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.3 {
            FlowSignalLabel::Bullish
        } else if score > 0.1 {
            FlowSignalLabel::SlightlyBullish
        } else if score < -0.3 {
            FlowSignalLabel::Bearish
        } else if score < -0.1 {
            FlowSignalLabel::SlightlyBearish
        } else {
            FlowSignalLabel::Neutral
        }
    }

    /// Wire name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowSignalLabel::Bullish => "BULLISH",
            FlowSignalLabel::SlightlyBullish => "SLIGHTLY_BULLISH",
            FlowSignalLabel::Neutral => "NEUTRAL",
            FlowSignalLabel::SlightlyBearish => "SLIGHTLY_BEARISH",
            FlowSignalLabel::Bearish => "BEARISH",
            FlowSignalLabel::NoData => "NO_DATA",
        }
    }

    /// +1 for bullish labels, -1 for bearish, 0 otherwise.
    pub fn direction(&self) -> i8 {
        match self {
            FlowSignalLabel::Bullish | FlowSignalLabel::SlightlyBullish => 1,
            FlowSignalLabel::Bearish | FlowSignalLabel::SlightlyBearish => -1,
            FlowSignalLabel::Neutral | FlowSignalLabel::NoData => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalComponents {
    pub sentiment_contribution: f64,
    pub whale_contribution: f64,
    pub volume_contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSignal {
    pub signal: FlowSignalLabel,
    /// 0-95.
    pub confidence: f64,
    /// Signed score in roughly [-1, 1].
    pub score: f64,
    pub components: SignalComponents,
}

impl FlowSignal {
    pub fn no_data() -> Self {
        Self {
            signal: FlowSignalLabel::NoData,
            confidence: 0.0,
            score: 0.0,
            components: SignalComponents::default(),
        }
    }
}

/// Complete options-flow analysis, recomputed from the full input list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowAnalysisResult {
    pub whale_activity: WhaleActivity,
    pub sentiment_analysis: SentimentAnalysis,
    pub volume_analysis: VolumeAnalysis,
    pub premium_flow: PremiumFlow,
    pub time_analysis: TimeAnalysis,
    pub unusual_activity: Vec<UnusualFinding>,
    pub gamma_exposure: GammaExposure,
    pub strategies: Vec<FlowStrategy>,
    pub overall_signal: FlowSignal,
}

impl FlowAnalysisResult {
    /// Neutral result for an empty input list.
    pub fn empty() -> Self {
        Self {
            whale_activity: WhaleActivity::default(),
            sentiment_analysis: SentimentAnalysis::default(),
            volume_analysis: VolumeAnalysis::default(),
            premium_flow: PremiumFlow::default(),
            time_analysis: TimeAnalysis::default(),
            unusual_activity: Vec::new(),
            gamma_exposure: GammaExposure::default(),
            strategies: Vec::new(),
            overall_signal: FlowSignal::no_data(),
        }
    }
}
