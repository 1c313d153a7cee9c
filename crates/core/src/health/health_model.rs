//! Portfolio health domain models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::overlays::Overlay;

/// Sub-scores composing the composite health score.
///
/// Each component is normalized to [0, 1] where 1 is best.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBreakdown {
    pub diversification: f64,
    pub drawdown: f64,
    pub correlation: f64,
    pub risk: f64,
}

/// Output of one health evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHealthResult {
    /// Composite score, an integer in [0, 100].
    pub score: u32,
    pub breakdown: HealthBreakdown,
    /// Rolling history of past scores, oldest first, at most
    /// [`HealthConfig::trend_capacity`] entries.
    pub trend: Vec<u32>,
}

/// Tunable weights and thresholds for the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthConfig {
    pub diversification_weight: f64,
    pub drawdown_weight: f64,
    pub correlation_weight: f64,
    pub risk_weight: f64,
    /// Reference ceiling the combined risk figure is measured against.
    pub risk_ceiling: f64,
    /// Scores strictly below this invoke the critical hook.
    pub critical_threshold: u32,
    /// Maximum number of retained trend entries; oldest evicted first.
    pub trend_capacity: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            diversification_weight: 0.30,
            drawdown_weight: 0.30,
            correlation_weight: 0.20,
            risk_weight: 0.20,
            risk_ceiling: 0.5,
            critical_threshold: 40,
            trend_capacity: 30,
        }
    }
}

/// Inputs to one health evaluation.
///
/// `prior_trend` is caller state threaded through each call; the scorer
/// holds nothing between evaluations.
#[derive(Debug, Clone)]
pub struct HealthInput<'a> {
    pub asset_weights: &'a HashMap<String, f64>,
    /// Ordered portfolio value series, oldest first.
    pub value_history: &'a [f64],
    pub volatility: f64,
    /// Square correlation matrix over the asset universe.
    pub correlation_matrix: &'a [Vec<f64>],
    pub active_overlays: &'a [Overlay],
    pub prior_trend: &'a [u32],
}
