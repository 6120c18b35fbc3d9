use serde::{Deserialize, Serialize};

/// Named chart or setup pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    // Chart patterns
    GoldenCross,
    DeathCross,
    BullFlag,
    BearFlag,
    CupHandle,
    HeadShoulders,
    Triangle,
    RangeBound,
    // Snapshot setups
    BullishBreakout,
    BearishReversal,
    BullishReversal,
    MomentumSurge,
    MeanReversion,
    Consolidation,
    NoPattern,
}

impl PatternKind {
    /// Stable snake_case name, also the learning registry key.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::GoldenCross => "golden_cross",
            PatternKind::DeathCross => "death_cross",
            PatternKind::BullFlag => "bull_flag",
            PatternKind::BearFlag => "bear_flag",
            PatternKind::CupHandle => "cup_handle",
            PatternKind::HeadShoulders => "head_shoulders",
            PatternKind::Triangle => "triangle",
            PatternKind::RangeBound => "range_bound",
            PatternKind::BullishBreakout => "bullish_breakout",
            PatternKind::BearishReversal => "bearish_reversal",
            PatternKind::BullishReversal => "bullish_reversal",
            PatternKind::MomentumSurge => "momentum_surge",
            PatternKind::MeanReversion => "mean_reversion",
            PatternKind::Consolidation => "consolidation",
            PatternKind::NoPattern => "no_pattern",
        }
    }

    /// Fixed strength assigned to a match of this pattern.
    pub fn strength(&self) -> f64 {
        match self {
            PatternKind::GoldenCross | PatternKind::DeathCross => 0.8,
            PatternKind::CupHandle | PatternKind::HeadShoulders => 0.75,
            PatternKind::BullFlag | PatternKind::BearFlag => 0.7,
            PatternKind::Triangle => 0.6,
            PatternKind::RangeBound => 0.5,
            PatternKind::BullishBreakout => 0.8,
            PatternKind::BearishReversal | PatternKind::BullishReversal => 0.7,
            PatternKind::MomentumSurge => 0.75,
            PatternKind::MeanReversion => 0.6,
            PatternKind::Consolidation => 0.5,
            PatternKind::NoPattern => 0.1,
        }
    }

    /// Human-readable name with spaces.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// A matched pattern with its strength in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub name: PatternKind,
    pub strength: f64,
}

impl Pattern {
    pub fn new(name: PatternKind) -> Self {
        Self {
            name,
            strength: name.strength(),
        }
    }

    pub fn none() -> Self {
        Self::new(PatternKind::NoPattern)
    }
}

/// Every chart pattern a series matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPatternSet {
    /// Matched names joined with `_`, or `unknown` when nothing matched.
    #[serde(rename = "type")]
    pub key: String,
    /// Matched patterns in detection order (bullish, bearish, neutral).
    pub patterns: Vec<PatternKind>,
}

impl ChartPatternSet {
    pub fn from_matches(patterns: Vec<PatternKind>) -> Self {
        let key = if patterns.is_empty() {
            "unknown".to_string()
        } else {
            patterns
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join("_")
        };
        Self { key, patterns }
    }

    /// Strongest match; ties keep detection order.
    pub fn strongest(&self) -> Pattern {
        self.patterns
            .iter()
            .copied()
            .map(Pattern::new)
            .fold(None::<Pattern>, |best, p| match best {
                Some(b) if b.strength >= p.strength => Some(b),
                _ => Some(p),
            })
            .unwrap_or_else(Pattern::none)
    }

    pub fn contains(&self, kind: PatternKind) -> bool {
        self.patterns.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_is_unknown() {
        let set = ChartPatternSet::from_matches(vec![]);
        assert_eq!(set.key, "unknown");
        assert_eq!(set.strongest().name, PatternKind::NoPattern);
    }

    #[test]
    fn test_key_joins_matches() {
        let set = ChartPatternSet::from_matches(vec![PatternKind::BullFlag, PatternKind::Triangle]);
        assert_eq!(set.key, "bull_flag_triangle");
        assert_eq!(set.strongest().name, PatternKind::BullFlag);
    }

    #[test]
    fn test_strongest_keeps_first_on_tie() {
        let set =
            ChartPatternSet::from_matches(vec![PatternKind::GoldenCross, PatternKind::DeathCross]);
        assert_eq!(set.strongest().name, PatternKind::GoldenCross);
    }

    #[test]
    fn test_pattern_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&PatternKind::HeadShoulders).unwrap(),
            "\"head_shoulders\""
        );
        assert_eq!(PatternKind::CupHandle.display_name(), "cup handle");
    }
}
