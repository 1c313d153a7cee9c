//! Trigger evaluation service.
//!
//! Decides whether a new rebalance proposal should be surfaced right now,
//! given the schedule, the latest signals and market events, and the time of
//! the last rebalance. Pure apart from reading the wall clock: callers are
//! expected to poll [`TriggerEvaluator::evaluate`] once immediately and then
//! every [`POLL_INTERVAL_SECS`](super::POLL_INTERVAL_SECS) seconds, and to
//! record the accepted/declined outcome through
//! [`RebalanceHistory`](super::RebalanceHistory).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::overlays::Overlay;

use super::rebalancing_constants::{
    COOLDOWN_ADVISORY_PHRASE, COOLDOWN_HOURS, INTERVAL_TRIGGER_PHRASE, MACRO_TRIGGER_PHRASE,
    RATIONALE_SEPARATOR, SIGNAL_TRIGGER_PHRASE,
};
use super::rebalancing_model::{
    MarketEvent, ProposalId, RebalanceProposal, RebalanceSchedule, StrategySignal, TriggerKind,
};
use super::rebalancing_traits::WeightAllocator;

pub struct TriggerEvaluator {
    allocator: Arc<dyn WeightAllocator>,
}

impl TriggerEvaluator {
    pub fn new(allocator: Arc<dyn WeightAllocator>) -> Self {
        Self { allocator }
    }

    /// Decides whether a rebalance should be proposed right now.
    ///
    /// Returns `None` when the schedule is disabled or paused, and when no
    /// trigger fired. The caller treats `None` as "no action", not an error.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate(
        &self,
        schedule: &RebalanceSchedule,
        signals: &[StrategySignal],
        events: &[MarketEvent],
        current_weights: &HashMap<String, f64>,
        active_overlays: &[Overlay],
    ) -> Option<RebalanceProposal> {
        self.evaluate_at(
            Utc::now(),
            schedule,
            signals,
            events,
            current_weights,
            active_overlays,
        )
    }

    /// Clock-explicit variant of [`evaluate`](Self::evaluate) for
    /// deterministic tests.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_at(
        &self,
        now: DateTime<Utc>,
        schedule: &RebalanceSchedule,
        signals: &[StrategySignal],
        events: &[MarketEvent],
        current_weights: &HashMap<String, f64>,
        active_overlays: &[Overlay],
    ) -> Option<RebalanceProposal> {
        if !schedule.enabled || schedule.paused {
            return None;
        }

        let mut reasons: Vec<String> = Vec::new();

        // Interval trigger: due when no prior rebalance exists or one full
        // unit has elapsed.
        if let Some(interval) = schedule.interval {
            let due = match schedule.last_rebalance {
                None => true,
                Some(last) => now - last >= interval.duration(),
            };
            if due {
                reasons.push(format!("{} ({})", INTERVAL_TRIGGER_PHRASE, interval));
            }
        }

        if schedule.has_trigger(TriggerKind::Macro) && !events.is_empty() {
            reasons.push(format!("{} ({} event(s))", MACRO_TRIGGER_PHRASE, events.len()));
        }

        if schedule.has_trigger(TriggerKind::Signal) && !signals.is_empty() {
            reasons.push(format!(
                "{} ({} signal(s))",
                SIGNAL_TRIGGER_PHRASE,
                signals.len()
            ));
        }

        if reasons.is_empty() {
            return None;
        }

        // Advisory only: annotates the rationale, never suppresses a firing
        // trigger. The confirm/skip step is the actual gate.
        if !schedule.cooldown_override {
            if let Some(last) = schedule.last_rebalance {
                if now - last < Duration::hours(COOLDOWN_HOURS) {
                    reasons.push(COOLDOWN_ADVISORY_PHRASE.to_string());
                }
            }
        }

        let after_weights = self.allocator.allocate(current_weights, active_overlays);
        let proposal = RebalanceProposal {
            id: ProposalId::new(),
            before_weights: current_weights.clone(),
            after_weights,
            rationale: reasons.join(RATIONALE_SEPARATOR),
            timestamp: now,
            confirmed: false,
            skipped: false,
        };
        debug!(
            "rebalance proposed ({}): {}",
            proposal.id, proposal.rationale
        );
        Some(proposal)
    }
}
