use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::services::indicators::RsiMode;
use crate::services::scoring::ScorerKind;

/// Server and engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Scoring path used for recommendations.
    pub scorer: ScorerKind,
    /// Seed for the network weights; OS entropy when absent.
    pub network_seed: Option<u64>,
    /// Points in a synthetic history.
    pub history_length: usize,
    /// Bars kept per symbol in the history store.
    pub history_capacity: usize,
    /// Overrides the scorer's default recommendation limit.
    pub recommendation_limit: Option<usize>,
    /// Overrides the scorer's minimum confidence.
    pub min_confidence: Option<f64>,
    /// Learning registry snapshot file. No persistence when absent.
    pub learning_state_path: Option<PathBuf>,
    pub rsi_mode: RsiMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            scorer: ScorerKind::RuleBased,
            network_seed: None,
            history_length: 50,
            history_capacity: 500,
            recommendation_limit: None,
            min_confidence: None,
            learning_state_path: None,
            rsi_mode: RsiMode::FixedStart,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`. Unparseable values fall back to
    /// their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let scorer = match non_empty("SCORER").map(|s| s.parse::<ScorerKind>()) {
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                warn!("{}, using {}", e, defaults.scorer);
                defaults.scorer
            }
            None => defaults.scorer,
        };

        let rsi_mode = match non_empty("RSI_MODE").map(|s| s.parse::<RsiMode>()) {
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                warn!("{}, using fixed_start", e);
                defaults.rsi_mode
            }
            None => defaults.rsi_mode,
        };

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            scorer,
            network_seed: non_empty("NETWORK_SEED").and_then(|s| s.parse().ok()),
            history_length: non_empty("HISTORY_LENGTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.history_length),
            history_capacity: non_empty("HISTORY_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.history_capacity),
            recommendation_limit: non_empty("RECOMMENDATION_LIMIT").and_then(|s| s.parse().ok()),
            min_confidence: non_empty("MIN_CONFIDENCE")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite()),
            learning_state_path: non_empty("LEARNING_STATE_PATH").map(PathBuf::from),
            rsi_mode,
        }
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
