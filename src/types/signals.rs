use serde::{Deserialize, Serialize};

/// Five-level direction of a signal.
///
/// Used for the network's output classes and the overall technical signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl SignalDirection {
    /// All directions in network output order.
    pub const ALL: [SignalDirection; 5] = [
        SignalDirection::StrongBuy,
        SignalDirection::Buy,
        SignalDirection::Neutral,
        SignalDirection::Sell,
        SignalDirection::StrongSell,
    ];

    /// Create direction from a score (-100 to +100).
    pub fn from_score(score: i8) -> Self {
        match score {
            s if s >= 60 => SignalDirection::StrongBuy,
            s if s >= 20 => SignalDirection::Buy,
            s if s > -20 => SignalDirection::Neutral,
            s if s > -60 => SignalDirection::Sell,
            _ => SignalDirection::StrongSell,
        }
    }

    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            SignalDirection::StrongBuy => "Strong Buy",
            SignalDirection::Buy => "Buy",
            SignalDirection::Neutral => "Neutral",
            SignalDirection::Sell => "Sell",
            SignalDirection::StrongSell => "Strong Sell",
        }
    }

    /// Collapse to a three-way trade action.
    pub fn action(&self) -> Action {
        match self {
            SignalDirection::StrongBuy | SignalDirection::Buy => Action::Buy,
            SignalDirection::Neutral => Action::Hold,
            SignalDirection::Sell | SignalDirection::StrongSell => Action::Sell,
        }
    }
}

/// Three-way trade action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// +1 for buy, -1 for sell, 0 for hold.
    pub fn sign(&self) -> f64 {
        match self {
            Action::Buy => 1.0,
            Action::Sell => -1.0,
            Action::Hold => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_score_bands() {
        assert_eq!(SignalDirection::from_score(100), SignalDirection::StrongBuy);
        assert_eq!(SignalDirection::from_score(20), SignalDirection::Buy);
        assert_eq!(SignalDirection::from_score(0), SignalDirection::Neutral);
        assert_eq!(SignalDirection::from_score(-20), SignalDirection::Sell);
        assert_eq!(SignalDirection::from_score(-60), SignalDirection::StrongSell);
    }

    #[test]
    fn test_direction_collapses_to_action() {
        assert_eq!(SignalDirection::StrongBuy.action(), Action::Buy);
        assert_eq!(SignalDirection::Neutral.action(), Action::Hold);
        assert_eq!(SignalDirection::StrongSell.action(), Action::Sell);
    }

    #[test]
    fn test_action_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Action::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::to_string(&SignalDirection::StrongSell).unwrap(),
            "\"strong_sell\""
        );
    }
}
