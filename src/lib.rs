//! Quantum Trade - technical-indicator and heuristic-scoring engine

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

use std::sync::Arc;

use tracing::info;

use config::Config;
use services::{
    build_scorer, default_registry, persist_registry, FeatureExtractor, FlowAnalyzer,
    LearningRegistry, PriceHistoryStore, RecommendationEngine,
};

// Re-export commonly used types
pub use error::{AppError, EngineError, Result};
pub use services::{ScorerKind, Scorer};
pub use types::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<RecommendationEngine>,
    pub flow_analyzer: Arc<FlowAnalyzer>,
    pub extractor: FeatureExtractor,
}

impl AppState {
    /// Wire the scorer, registry and history store selected by `config`.
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(default_registry(config.scorer));
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: Config, registry: Arc<LearningRegistry>) -> Self {
        let scorer = build_scorer(config.scorer, config.rsi_mode, config.network_seed);
        let history = Arc::new(PriceHistoryStore::new(
            config.history_capacity,
            config.history_length,
        ));
        let engine = RecommendationEngine::new(scorer, registry, history)
            .with_default_limit(config.recommendation_limit)
            .with_min_confidence(config.min_confidence);

        info!(
            "Engine ready: scorer={}, rsi={:?}, history capacity {}",
            config.scorer, config.rsi_mode, config.history_capacity
        );

        Self {
            extractor: FeatureExtractor::new(config.rsi_mode),
            config: Arc::new(config),
            engine: Arc::new(engine),
            flow_analyzer: Arc::new(FlowAnalyzer::default()),
        }
    }

    pub fn registry(&self) -> &Arc<LearningRegistry> {
        self.engine.registry()
    }

    pub fn history(&self) -> &Arc<PriceHistoryStore> {
        self.engine.history()
    }

    /// Save the learning registry when a state path is configured.
    pub async fn persist_learning(&self) {
        let Some(path) = self.config.learning_state_path.clone() else {
            return;
        };
        let registry = self.registry().clone();
        if let Err(e) =
            tokio::task::spawn_blocking(move || persist_registry(&registry, &path)).await
        {
            tracing::warn!("Learning state save task failed: {}", e);
        }
    }
}
