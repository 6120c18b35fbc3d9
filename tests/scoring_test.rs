//! Integration tests for both scoring paths

use quantum_trade::services::scoring::{RuleBasedScorer, ToyNetwork};
use quantum_trade::services::{
    build_scorer, FeatureExtractor, LearningRegistry, RsiMode, Scorer, ScorerKind, ScoringInput,
};
use quantum_trade::types::{Action, MarketSnapshot, PatternKind, PriceSeries};
use quantum_trade::EngineError;

fn example_snapshot() -> MarketSnapshot {
    MarketSnapshot {
        open: 148.0,
        high: 152.0,
        low: 147.0,
        volume: 6_000_000.0,
        change_percent: 4.2,
        ..MarketSnapshot::new("AAPL", 150.0)
    }
}

fn uptrend_history() -> PriceSeries {
    PriceSeries::from_prices((0..50).map(|i| 76.5 + i as f64 * 1.5).collect())
}

#[test]
fn test_example_snapshot_rule_based() {
    let registry = LearningRegistry::with_priors();
    let snapshot = example_snapshot();
    let history = uptrend_history();

    let features = FeatureExtractor::default()
        .simple(&snapshot, &history)
        .unwrap();
    assert!(features.rsi > 50.0 && features.rsi < 70.0);

    let outcome = RuleBasedScorer::default()
        .score(&ScoringInput::new(&snapshot, &history, &registry).at_hour(12))
        .unwrap();
    assert_eq!(outcome.action, Action::Buy);
    assert!(matches!(
        outcome.pattern.name,
        PatternKind::BullishBreakout | PatternKind::MomentumSurge | PatternKind::NoPattern
    ));
    assert!((50.0..=95.0).contains(&outcome.confidence));
    assert!(outcome.probabilities.is_none());
}

#[test]
fn test_non_positive_price_rejected() {
    let registry = LearningRegistry::new();
    let history = uptrend_history();
    for price in [0.0, -5.0, f64::NAN] {
        let snapshot = MarketSnapshot::new("BAD", price);
        for kind in [ScorerKind::RuleBased, ScorerKind::Network] {
            let scorer = build_scorer(kind, RsiMode::FixedStart, Some(1));
            let err = scorer
                .score(&ScoringInput::new(&snapshot, &history, &registry))
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)), "{:?}", err);
        }
    }
}

#[test]
fn test_mismatched_series_rejected() {
    let registry = LearningRegistry::new();
    let mut history = uptrend_history();
    history.highs = vec![200.0; 10];
    let err = RuleBasedScorer::default()
        .score(&ScoringInput::new(&example_snapshot(), &history, &registry))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn test_scorer_kinds() {
    assert_eq!(
        build_scorer(ScorerKind::RuleBased, RsiMode::FixedStart, None).kind(),
        ScorerKind::RuleBased
    );
    assert_eq!(
        build_scorer(ScorerKind::Network, RsiMode::SlidingWindow, Some(5)).kind(),
        ScorerKind::Network
    );
    assert_eq!("nn".parse::<ScorerKind>().unwrap(), ScorerKind::Network);
    assert!("crystal_ball".parse::<ScorerKind>().is_err());
}

#[test]
fn test_network_outcome_is_distribution() {
    let registry = LearningRegistry::new();
    let network = ToyNetwork::new(Some(2024));
    let outcome = network
        .score(&ScoringInput::new(
            &example_snapshot(),
            &uptrend_history(),
            &registry,
        ))
        .unwrap();

    let probabilities = outcome.probabilities.unwrap();
    let total: f64 = probabilities.to_array().iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(outcome.action, outcome.signal.action());
    assert_eq!(outcome.strategy, "swing");
}

#[test]
fn test_network_strategy_follows_registry() {
    let registry = LearningRegistry::with_priors();
    let outcome = ToyNetwork::new(Some(9))
        .score(&ScoringInput::new(
            &example_snapshot(),
            &uptrend_history(),
            &registry,
        ))
        .unwrap();
    assert_eq!(outcome.strategy, registry.best_strategy().unwrap());
}
