//! Composite portfolio health scoring.
//!
//! Four independent sub-metrics — diversification, drawdown, correlation,
//! risk — are each normalized to [0, 1] and combined into a weighted 0–100
//! integer score. Recomputation is reactive: callers re-score whenever any
//! input changes; there is no minimum re-evaluation interval and no state
//! held between calls beyond the trend slice the caller threads through.

use std::sync::Arc;

use log::warn;

use crate::events::{DomainEvent, DomainEventSink};
use crate::overlays::Overlay;

use super::health_model::{HealthBreakdown, HealthConfig, HealthInput, PortfolioHealthResult};

type CriticalHook = Box<dyn Fn() + Send + Sync>;

/// Computes the composite health score and maintains the bounded trend.
///
/// The scorer never rebalances anything itself: when the score falls below
/// the critical threshold it invokes the optional hook (and emits a
/// `HealthDegraded` event) so the owner can request one.
pub struct HealthScorer {
    config: HealthConfig,
    events: Arc<dyn DomainEventSink>,
    critical_hook: Option<CriticalHook>,
}

impl HealthScorer {
    pub fn new(config: HealthConfig, events: Arc<dyn DomainEventSink>) -> Self {
        Self {
            config,
            events,
            critical_hook: None,
        }
    }

    /// Installs the callback invoked when the score drops below the
    /// critical threshold.
    pub fn with_critical_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.critical_hook = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Scores the portfolio and appends the result to the rolling trend.
    pub fn score(&self, input: &HealthInput) -> PortfolioHealthResult {
        let weights: Vec<f64> = input.asset_weights.values().copied().collect();

        let breakdown = HealthBreakdown {
            diversification: diversification_score(&weights),
            drawdown: drawdown_score(input.value_history),
            correlation: correlation_score(input.correlation_matrix),
            risk: risk_score(input.volatility, input.active_overlays, self.config.risk_ceiling),
        };

        let weighted = self.config.diversification_weight * breakdown.diversification
            + self.config.drawdown_weight * breakdown.drawdown
            + self.config.correlation_weight * breakdown.correlation
            + self.config.risk_weight * breakdown.risk;
        let score = ((100.0 * weighted).round() as u32).min(100);

        let mut trend = input.prior_trend.to_vec();
        trend.push(score);
        if trend.len() > self.config.trend_capacity {
            let excess = trend.len() - self.config.trend_capacity;
            trend.drain(..excess);
        }

        if score < self.config.critical_threshold {
            warn!(
                "portfolio health degraded to {} (threshold {})",
                score, self.config.critical_threshold
            );
            self.events.emit(DomainEvent::health_degraded(score));
            if let Some(hook) = &self.critical_hook {
                hook();
            }
        }

        PortfolioHealthResult {
            score,
            breakdown,
            trend,
        }
    }
}

// =============================================================================
// Sub-scores
// =============================================================================

/// Shannon entropy of the weight vector, normalized by the maximum possible
/// entropy for that number of assets.
///
/// Zero weights contribute nothing (the limit `0·ln 0 = 0`). Equals 1 only
/// for a perfectly uniform allocation; a single-asset portfolio has no
/// spread to measure and scores 0.
pub fn diversification_score(weights: &[f64]) -> f64 {
    let n = weights.len();
    if n < 2 {
        return 0.0;
    }
    let total: f64 = weights.iter().copied().filter(|w| *w > 0.0).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let entropy: f64 = weights
        .iter()
        .map(|w| w / total)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    (entropy / (n as f64).ln()).clamp(0.0, 1.0)
}

/// One minus the maximum fractional decline from the running peak of the
/// value series; 1 is best (no drawdown), 0 is a full drawdown or worse.
pub fn drawdown_score(history: &[f64]) -> f64 {
    let mut peak: f64 = 0.0;
    let mut max_drawdown: f64 = 0.0;
    for &value in history {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - value) / peak);
        }
    }
    1.0 - max_drawdown.min(1.0)
}

/// One minus the mean absolute off-diagonal correlation. Degenerate
/// matrices (fewer than two assets) score 1.
pub fn correlation_score(matrix: &[Vec<f64>]) -> f64 {
    if matrix.len() < 2 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut count = 0usize;
    for (i, row) in matrix.iter().enumerate() {
        for (j, &correlation) in row.iter().enumerate() {
            if i != j {
                sum += correlation.abs();
                count += 1;
            }
        }
    }
    if count == 0 {
        return 1.0;
    }
    1.0 - (sum / count as f64).min(1.0)
}

/// Volatility plus the active overlays' risk adjustments, measured against
/// the reference ceiling, clamped and inverted so 1 is lowest risk.
pub fn risk_score(volatility: f64, overlays: &[Overlay], ceiling: f64) -> f64 {
    let adjustment: f64 = overlays
        .iter()
        .filter(|o| o.is_active)
        .map(|o| o.metadata.risk_adjustment)
        .sum();
    let combined = volatility + adjustment;
    1.0 - (combined / ceiling).clamp(0.0, 1.0)
}
