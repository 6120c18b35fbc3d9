//! Feed-forward placeholder network.
//!
//! 15 -> 30 -> 20 -> 10 -> 5, ReLU on the hidden layers and softmax on the
//! output. Weights are drawn once from U(-0.5, 0.5). "Learning" nudges every
//! weight by `rate * error * U(0, 1)`, which is not a gradient step, so the
//! outputs never converge to anything meaningful. Treat the scores as
//! decoration, never as a forecast.

use std::sync::{Mutex, PoisonError, RwLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Scorer, ScorerKind, ScoringInput};
use crate::error::Result;
use crate::services::features::{ExtendedFeatures, FeatureExtractor};
use crate::services::indicators::{Rsi, RsiMode};
use crate::services::patterns::identify_chart_patterns;
use crate::types::{
    ChartPatternSet, ScoreOutcome, SignalProbabilities, StrategyKind, TrainingSample,
};

/// Neurons per layer, input first.
pub const LAYER_SIZES: [usize; 5] = [ExtendedFeatures::LEN, 30, 20, 10, 5];

const LEARNING_RATE: f64 = 0.01;

/// One weight matrix per layer transition, `rows = outputs`, `cols = inputs`.
type Layers = Vec<Vec<Vec<f64>>>;

fn init_layers(rng: &mut StdRng) -> Layers {
    LAYER_SIZES
        .windows(2)
        .map(|pair| {
            (0..pair[1])
                .map(|_| (0..pair[0]).map(|_| rng.gen_range(-0.5..0.5)).collect())
                .collect()
        })
        .collect()
}

fn multiply(input: &[f64], matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(input).map(|(w, x)| w * x).sum())
        .collect()
}

fn relu(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| v.max(0.0)).collect()
}

fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.iter().map(|v| v / sum).collect()
}

/// Sum of squared differences between prediction and one-hot target.
fn squared_error(prediction: &SignalProbabilities, target: &[f64; 5]) -> f64 {
    prediction
        .to_array()
        .iter()
        .zip(target)
        .map(|(p, t)| (p - t).powi(2))
        .sum()
}

/// Expected percent return from the output distribution and the pattern's
/// historical success rate.
pub fn expected_return(probabilities: &SignalProbabilities, pattern_success: f64) -> f64 {
    probabilities.buy_strong * 15.0 + probabilities.buy * 7.0
        - probabilities.sell * 7.0
        - probabilities.sell_strong * 15.0
        + (pattern_success - 0.5) * 10.0
}

pub struct ToyNetwork {
    layers: RwLock<Layers>,
    rng: Mutex<StdRng>,
    extractor: FeatureExtractor,
}

impl ToyNetwork {
    /// Network with weights from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let layers = init_layers(&mut rng);
        Self {
            layers: RwLock::new(layers),
            rng: Mutex::new(rng),
            extractor: FeatureExtractor::default(),
        }
    }

    pub fn with_rsi_mode(mut self, rsi_mode: RsiMode) -> Self {
        self.extractor = FeatureExtractor::new(rsi_mode);
        self
    }

    /// Forward pass.
    pub fn predict(&self, features: &[f64; ExtendedFeatures::LEN]) -> SignalProbabilities {
        let layers = self.layers.read().unwrap_or_else(PoisonError::into_inner);
        let (output, hidden) = match layers.split_last() {
            Some(split) => split,
            None => return SignalProbabilities::from_array([0.2; 5]),
        };

        let mut current = features.to_vec();
        for matrix in hidden {
            current = relu(multiply(&current, matrix));
        }
        let probs = softmax(&multiply(&current, output));

        let mut values = [0.0; 5];
        for (slot, p) in values.iter_mut().zip(probs) {
            *slot = p;
        }
        SignalProbabilities::from_array(values)
    }

    fn reasoning(
        probabilities: &SignalProbabilities,
        patterns: &ChartPatternSet,
        rsi: f64,
        input: &ScoringInput<'_>,
    ) -> String {
        let mut reasons = Vec::new();

        if probabilities.buy_strong > 0.5 {
            reasons.push("Strong bullish signals detected".to_string());
        } else if probabilities.buy > 0.5 {
            reasons.push("Moderate bullish signals present".to_string());
        } else if probabilities.sell > 0.5 {
            reasons.push("Bearish indicators dominating".to_string());
        }

        if !patterns.patterns.is_empty() {
            let names: Vec<&str> = patterns.patterns.iter().map(|p| p.as_str()).collect();
            reasons.push(format!("Pattern detected: {}", names.join(", ")));
        }

        if rsi < 30.0 {
            reasons.push("RSI indicates oversold conditions".to_string());
        }
        if rsi > 70.0 {
            reasons.push("RSI indicates overbought conditions".to_string());
        }

        if let Some(avg) = input.snapshot.avg_volume.filter(|v| *v > 0.0) {
            if input.snapshot.volume > avg * 1.5 {
                reasons.push("Unusual volume detected".to_string());
            }
        }

        reasons.push(format!("Model confidence: {:.1}%", probabilities.max() * 100.0));
        reasons.join(". ")
    }

    #[cfg(test)]
    fn total_weight(&self) -> f64 {
        let layers = self.layers.read().unwrap_or_else(PoisonError::into_inner);
        layers.iter().flatten().flatten().sum()
    }
}

impl Scorer for ToyNetwork {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Network
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreOutcome> {
        let features = self.extractor.extended(input.snapshot, input.history)?;
        let probabilities = self.predict(&features.to_array());
        let signal = probabilities.arg_max();
        let action = signal.action();

        let patterns = identify_chart_patterns(&input.history.prices);
        let pattern = patterns.strongest();
        let pattern_success = input.registry.pattern_success_rate(&patterns.key);
        let score = expected_return(&probabilities, pattern_success);
        let confidence = probabilities.max() * 100.0;

        let rsi = Rsi::default()
            .with_mode(self.extractor.rsi_mode())
            .calculate(&input.history.prices);

        debug!(
            "{}: network {:?} p={:.3} expected return {:.2}, patterns {}",
            input.snapshot.symbol,
            signal,
            probabilities.max(),
            score,
            patterns.key
        );

        Ok(ScoreOutcome {
            action,
            signal,
            confidence,
            score,
            strategy: input
                .registry
                .best_strategy()
                .unwrap_or_else(|| StrategyKind::Swing.as_str().to_string()),
            reasoning: Self::reasoning(&probabilities, &patterns, rsi, input),
            volatility: features.volatility,
            momentum: features.momentum,
            technical_strength: 0.0,
            pattern,
            pattern_key: patterns.key,
            pattern_success,
            probabilities: Some(probabilities),
        })
    }

    /// Nudge every weight by `rate * error * U(0, 1)`.
    fn learn(&self, sample: &TrainingSample) {
        let features: [f64; ExtendedFeatures::LEN] = match sample.features.as_slice().try_into() {
            Ok(features) => features,
            Err(_) => {
                debug!(
                    "Skipping training sample with {} features (expected {})",
                    sample.features.len(),
                    ExtendedFeatures::LEN
                );
                return;
            }
        };

        let error = squared_error(&self.predict(&features), &sample.outcome);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut layers = self.layers.write().unwrap_or_else(PoisonError::into_inner);
        for weight in layers.iter_mut().flatten().flatten() {
            *weight -= LEARNING_RATE * error * rng.gen::<f64>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::learning::LearningRegistry;
    use crate::types::{Action, MarketSnapshot, PriceSeries};

    fn features() -> [f64; ExtendedFeatures::LEN] {
        [
            55.0, 1.2, 0.4, 150.0, 0.6, 0.2, 0.8, 0.05, 1.3, 1.0, 0.2, 0.1, 0.0, 0.5, 0.9,
        ]
    }

    #[test]
    fn test_layer_shapes() {
        let mut rng = StdRng::seed_from_u64(1);
        let layers = init_layers(&mut rng);
        assert_eq!(layers.len(), 4);
        assert_eq!(layers[0].len(), 30);
        assert_eq!(layers[0][0].len(), 15);
        assert_eq!(layers[3].len(), 5);
        assert_eq!(layers[3][0].len(), 10);
        assert!(layers.iter().flatten().flatten().all(|w| (-0.5..0.5).contains(w)));
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let network = ToyNetwork::new(Some(42));
        let p = network.predict(&features());
        let sum: f64 = p.to_array().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(p.to_array().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_seeded_networks_agree() {
        let a = ToyNetwork::new(Some(7)).predict(&features());
        let b = ToyNetwork::new(Some(7)).predict(&features());
        assert_eq!(a, b);
    }

    #[test]
    fn test_learning_moves_weights_down() {
        let network = ToyNetwork::new(Some(3));
        let before = network.total_weight();
        network.learn(&TrainingSample {
            features: features().to_vec(),
            outcome: [1.0, 0.0, 0.0, 0.0, 0.0],
            symbol: None,
            strategy: "momentum".to_string(),
            timestamp: 0,
        });
        assert!(network.total_weight() < before);
    }

    #[test]
    fn test_wrong_length_sample_ignored() {
        let network = ToyNetwork::new(Some(3));
        let before = network.total_weight();
        network.learn(&TrainingSample {
            features: vec![1.0; 10],
            outcome: [0.0, 0.0, 1.0, 0.0, 0.0],
            symbol: None,
            strategy: "swing".to_string(),
            timestamp: 0,
        });
        assert_eq!(network.total_weight(), before);
    }

    #[test]
    fn test_expected_return() {
        let certain_buy = SignalProbabilities::from_array([1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(expected_return(&certain_buy, 0.5), 15.0);
        let hold = SignalProbabilities::from_array([0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!((expected_return(&hold, 0.8) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_outcome_consistent() {
        let network = ToyNetwork::new(Some(11));
        let snapshot = MarketSnapshot::new("QQQ", 400.0);
        let history = PriceSeries::from_prices((0..60).map(|i| 380.0 + i as f64).collect());
        let registry = LearningRegistry::new();
        let outcome = network
            .score(&ScoringInput::new(&snapshot, &history, &registry))
            .unwrap();

        let probabilities = outcome.probabilities.unwrap();
        assert_eq!(outcome.signal, probabilities.arg_max());
        assert_eq!(outcome.action, outcome.signal.action());
        assert!((outcome.confidence - probabilities.max() * 100.0).abs() < 1e-9);
        assert!(outcome.confidence >= 20.0 && outcome.confidence <= 100.0);
        assert!(outcome.reasoning.contains("Model confidence:"));
        assert_eq!(outcome.pattern_success, 0.5);
        assert!(matches!(outcome.action, Action::Buy | Action::Sell | Action::Hold));
    }
}
