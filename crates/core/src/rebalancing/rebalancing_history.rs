//! Append-only store of resolved rebalance proposals.

use std::sync::{Arc, RwLock};

use log::debug;

use crate::events::{DomainEvent, DomainEventSink};

use super::rebalancing_model::{
    ProposalOutcome, RebalanceHistoryEntry, RebalanceProposal, RebalanceSchedule,
};

/// Records the final confirmed/skipped state of proposals.
///
/// Entries are append-only and never mutated after creation; the proposal
/// itself is consumed by `record` and discarded.
pub struct RebalanceHistory {
    entries: RwLock<Vec<RebalanceHistoryEntry>>,
    events: Arc<dyn DomainEventSink>,
}

impl RebalanceHistory {
    pub fn new(events: Arc<dyn DomainEventSink>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Finalizes a proposal with the user's decision and appends the record.
    ///
    /// A confirmed outcome advances the schedule's `last_rebalance` to the
    /// proposal timestamp; skips leave the interval clock untouched so the
    /// next interval trigger stays due.
    pub fn record(
        &self,
        proposal: RebalanceProposal,
        outcome: ProposalOutcome,
        schedule: &mut RebalanceSchedule,
    ) -> RebalanceHistoryEntry {
        let confirmed = outcome == ProposalOutcome::Confirmed;
        let entry = RebalanceHistoryEntry {
            id: proposal.id,
            before_weights: proposal.before_weights,
            after_weights: proposal.after_weights,
            rationale: proposal.rationale,
            timestamp: proposal.timestamp,
            confirmed,
            skipped: !confirmed,
        };

        if confirmed {
            schedule.last_rebalance = Some(entry.timestamp);
        }

        debug!(
            "recorded rebalance outcome for {}: confirmed={}",
            entry.id, confirmed
        );
        self.entries.write().unwrap().push(entry.clone());
        self.events
            .emit(DomainEvent::proposal_resolved(entry.id.to_string(), confirmed));
        entry
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<RebalanceHistoryEntry> {
        self.entries.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}
