//! Snapshot scoring.
//!
//! Two interchangeable scorers sit behind the [`Scorer`] trait:
//! a rule-based heuristic over the simple feature vector and a small
//! randomly-initialised feed-forward network over the extended one.
//! The network is a non-predictive placeholder; its output carries no
//! forecasting value.

pub mod network;
pub mod rule_based;

pub use network::ToyNetwork;
pub use rule_based::RuleBasedScorer;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use super::indicators::RsiMode;
use super::learning::LearningRegistry;
use crate::error::Result;
use crate::types::{MarketSnapshot, PriceSeries, ScoreOutcome, TrainingSample};

/// Which scoring path to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    RuleBased,
    Network,
}

impl ScorerKind {
    /// Candidates at or below this confidence are dropped.
    pub fn default_min_confidence(&self) -> f64 {
        match self {
            ScorerKind::RuleBased => 65.0,
            ScorerKind::Network => 60.0,
        }
    }

    /// Number of recommendations returned when the caller sets no limit.
    pub fn default_limit(&self) -> usize {
        match self {
            ScorerKind::RuleBased => 8,
            ScorerKind::Network => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerKind::RuleBased => "rule_based",
            ScorerKind::Network => "network",
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rule_based" | "rule" | "rules" | "heuristic" => Ok(ScorerKind::RuleBased),
            "network" | "toy_network" | "nn" => Ok(ScorerKind::Network),
            other => Err(format!("unknown scorer: {}", other)),
        }
    }
}

/// Everything a scorer may look at for one symbol.
pub struct ScoringInput<'a> {
    pub snapshot: &'a MarketSnapshot,
    pub history: &'a PriceSeries,
    pub registry: &'a LearningRegistry,
    /// Local hour of day; the current hour when absent.
    pub hour: Option<u32>,
}

impl<'a> ScoringInput<'a> {
    pub fn new(
        snapshot: &'a MarketSnapshot,
        history: &'a PriceSeries,
        registry: &'a LearningRegistry,
    ) -> Self {
        Self {
            snapshot,
            history,
            registry,
            hour: None,
        }
    }

    pub fn at_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn hour(&self) -> u32 {
        self.hour.unwrap_or_else(|| chrono::Local::now().hour())
    }
}

/// A scoring strategy for one snapshot.
pub trait Scorer: Send + Sync {
    /// Which path this scorer implements.
    fn kind(&self) -> ScorerKind;

    /// Score one snapshot against its history.
    fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreOutcome>;

    /// Feed back one labelled training sample.
    fn learn(&self, _sample: &TrainingSample) {}
}

/// Build the scorer for `kind`.
pub fn build_scorer(kind: ScorerKind, rsi_mode: RsiMode, seed: Option<u64>) -> Arc<dyn Scorer> {
    match kind {
        ScorerKind::RuleBased => Arc::new(RuleBasedScorer::new(rsi_mode)),
        ScorerKind::Network => Arc::new(ToyNetwork::new(seed).with_rsi_mode(rsi_mode)),
    }
}

/// Registry matching `kind`: seeded priors for the rule path, empty otherwise.
pub fn default_registry(kind: ScorerKind) -> LearningRegistry {
    match kind {
        ScorerKind::RuleBased => LearningRegistry::with_priors(),
        ScorerKind::Network => LearningRegistry::new(),
    }
}
