//! Portfolio health module.
//!
//! Converts portfolio state (weights, value history, volatility, the
//! correlation matrix, active overlays) into a normalized 0–100 health score
//! with a per-component breakdown and a bounded rolling trend. Scores below
//! the critical threshold invoke an optional hook so the owner can request a
//! rebalance; the scorer itself never rebalances.

mod health_model;
mod health_service;


// Re-export the public interface
pub use health_model::{HealthBreakdown, HealthConfig, HealthInput, PortfolioHealthResult};
pub use health_service::{
    correlation_score, diversification_score, drawdown_score, risk_score, HealthScorer,
};
