//! Property-based integration tests for portfolio health scoring.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use std::collections::HashMap;
use std::sync::Arc;

use driftguard_core::events::NoOpDomainEventSink;
use driftguard_core::health::{
    diversification_score, drawdown_score, HealthConfig, HealthInput, HealthScorer,
};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Generates a non-empty weight vector of up to a dozen assets.
fn arb_weights() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..1.0, 1..12)
}

/// Generates a portfolio value history.
fn arb_history() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(1.0f64..1_000_000.0, 0..60)
}

fn weights_map(weights: &[f64]) -> HashMap<String, f64> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| (format!("A{}", i), *w))
        .collect()
}

fn uniform_matrix(n: usize, correlation: f64) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 1.0 } else { correlation })
                .collect()
        })
        .collect()
}

fn scorer() -> HealthScorer {
    HealthScorer::new(HealthConfig::default(), Arc::new(NoOpDomainEventSink))
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The composite score is an integer in [0, 100] and every breakdown
    /// component lies in [0, 1], for arbitrary finite non-negative inputs.
    #[test]
    fn prop_score_and_breakdown_are_bounded(
        raw_weights in arb_weights(),
        history in arb_history(),
        volatility in 0.0f64..2.0,
        correlation in -1.0f64..1.0,
    ) {
        let weights = weights_map(&raw_weights);
        let matrix = uniform_matrix(raw_weights.len(), correlation);

        let result = scorer().score(&HealthInput {
            asset_weights: &weights,
            value_history: &history,
            volatility,
            correlation_matrix: &matrix,
            active_overlays: &[],
            prior_trend: &[],
        });

        prop_assert!(result.score <= 100);
        prop_assert!((0.0..=1.0).contains(&result.breakdown.diversification));
        prop_assert!((0.0..=1.0).contains(&result.breakdown.drawdown));
        prop_assert!((0.0..=1.0).contains(&result.breakdown.correlation));
        prop_assert!((0.0..=1.0).contains(&result.breakdown.risk));
    }

    /// The trend buffer never exceeds its capacity and always ends with the
    /// score just computed, no matter how long the caller's prior trend is.
    #[test]
    fn prop_trend_never_exceeds_capacity(
        prior in proptest::collection::vec(0u32..=100, 0..80),
    ) {
        let weights = weights_map(&[0.4, 0.3, 0.3]);
        let history = vec![100.0, 105.0];

        let result = scorer().score(&HealthInput {
            asset_weights: &weights,
            value_history: &history,
            volatility: 0.1,
            correlation_matrix: &[],
            active_overlays: &[],
            prior_trend: &prior,
        });

        prop_assert!(result.trend.len() <= 30);
        prop_assert_eq!(*result.trend.last().unwrap(), result.score);
    }

    /// A perfectly uniform allocation has maximum diversification for any
    /// asset count above one.
    #[test]
    fn prop_uniform_allocation_is_fully_diversified(n in 2usize..50) {
        let weights = vec![1.0 / n as f64; n];
        let score = diversification_score(&weights);
        prop_assert!((score - 1.0).abs() < 1e-9);
    }

    /// Extending a monotonically rising history never hurts the drawdown
    /// sub-score; it stays at the no-drawdown maximum.
    #[test]
    fn prop_rising_history_has_no_drawdown(
        start in 1.0f64..1000.0,
        steps in proptest::collection::vec(0.0f64..10.0, 1..40),
    ) {
        let mut history = vec![start];
        for step in steps {
            let next = history.last().unwrap() + step;
            history.push(next);
        }
        prop_assert_eq!(drawdown_score(&history), 1.0);
    }
}
