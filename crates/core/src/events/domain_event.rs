//! Domain event types.

use serde::{Deserialize, Serialize};

/// Domain events emitted by core services after successful mutations and
/// decisions.
///
/// These events represent facts about the decision core. Runtime adapters
/// translate them into platform-specific actions (surfacing a proposal for
/// confirmation, refreshing an overlay list, flagging degraded health).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// An overlay was created, updated, or deleted.
    OverlayMutated {
        overlay_id: String,
        /// Version after the mutation; the pre-delete version for deletions.
        version: u32,
    },

    /// An overlay was executed against a market snapshot.
    OverlayExecuted {
        overlay_id: String,
        matched_rules: usize,
    },

    /// A rebalance proposal was confirmed or skipped and moved to history.
    ProposalResolved {
        proposal_id: String,
        confirmed: bool,
    },

    /// The composite health score dropped below the critical threshold.
    HealthDegraded { score: u32 },
}

impl DomainEvent {
    /// Creates an OverlayMutated event.
    pub fn overlay_mutated(overlay_id: String, version: u32) -> Self {
        Self::OverlayMutated {
            overlay_id,
            version,
        }
    }

    /// Creates an OverlayExecuted event.
    pub fn overlay_executed(overlay_id: String, matched_rules: usize) -> Self {
        Self::OverlayExecuted {
            overlay_id,
            matched_rules,
        }
    }

    /// Creates a ProposalResolved event.
    pub fn proposal_resolved(proposal_id: String, confirmed: bool) -> Self {
        Self::ProposalResolved {
            proposal_id,
            confirmed,
        }
    }

    /// Creates a HealthDegraded event.
    pub fn health_degraded(score: u32) -> Self {
        Self::HealthDegraded { score }
    }
}
