pub mod features;
pub mod flow;
pub mod history;
pub mod indicators;
pub mod learning;
pub mod patterns;
pub mod persistence;
pub mod recommendations;
pub mod scoring;

pub use features::{ExtendedFeatures, FeatureExtractor, SimpleFeatures};
pub use flow::{analyze_options_flow, FlowAnalyzer};
pub use history::PriceHistoryStore;
pub use indicators::{compute_indicators, RsiMode};
pub use learning::{profit_loss, LearningRegistry};
pub use patterns::{detect_pattern, detect_setup, identify_chart_patterns};
pub use persistence::{persist_registry, restore_registry};
pub use recommendations::RecommendationEngine;
pub use scoring::{build_scorer, default_registry, Scorer, ScorerKind, ScoringInput};
