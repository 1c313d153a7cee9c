//! Rebalancing module - schedules, proposals, trigger evaluation, history.
//!
//! The trigger evaluator answers "should a rebalance be proposed right
//! now?" from a schedule and the latest signals/events. Proposals await an
//! external confirm/skip decision, which the history store finalizes into
//! immutable records. The daily-spacing cooldown is advisory only: it
//! annotates the proposal rationale but never suppresses a trigger.

mod rebalancing_constants;
mod rebalancing_history;
mod rebalancing_model;
mod rebalancing_service;
mod rebalancing_traits;

#[cfg(test)]
mod rebalancing_service_tests;

// Re-export the public interface
pub use rebalancing_constants::*;
pub use rebalancing_history::RebalanceHistory;
pub use rebalancing_model::{
    MarketEvent, ProposalId, ProposalOutcome, RebalanceHistoryEntry, RebalanceInterval,
    RebalanceProposal, RebalanceSchedule, StrategySignal, TriggerKind,
};
pub use rebalancing_service::TriggerEvaluator;
pub use rebalancing_traits::{IdentityAllocator, WeightAllocator};
