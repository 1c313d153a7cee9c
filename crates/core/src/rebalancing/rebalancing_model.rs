//! Rebalancing domain models.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::overlays::OverlayExecution;

// =============================================================================
// Schedule
// =============================================================================

/// Cadence options for the interval trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceInterval {
    Daily,
    Weekly,
    Monthly,
}

impl RebalanceInterval {
    /// Length of one full interval unit. Monthly is a fixed 30 days;
    /// calendar-aware scheduling is the caller's concern.
    pub fn duration(&self) -> Duration {
        match self {
            RebalanceInterval::Daily => Duration::hours(24),
            RebalanceInterval::Weekly => Duration::days(7),
            RebalanceInterval::Monthly => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RebalanceInterval::Daily => "daily",
            RebalanceInterval::Weekly => "weekly",
            RebalanceInterval::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for RebalanceInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three reasons a rebalance can be proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Interval,
    Macro,
    Signal,
}

/// Recurring/event-driven policy for proposing rebalances.
///
/// Long-lived and mutated by the surrounding application; the evaluator only
/// reads it, except for `last_rebalance`, which advances when a confirmed
/// proposal is recorded to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceSchedule {
    pub enabled: bool,
    pub interval: Option<RebalanceInterval>,
    pub triggers: Vec<TriggerKind>,
    pub paused: bool,
    pub last_rebalance: Option<DateTime<Utc>>,
    /// Suppresses the daily-spacing advisory. The advisory never blocks a
    /// trigger either way; user confirmation is the only gate.
    pub cooldown_override: bool,
}

impl RebalanceSchedule {
    pub fn has_trigger(&self, kind: TriggerKind) -> bool {
        self.triggers.contains(&kind)
    }
}

impl Default for RebalanceSchedule {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: None,
            triggers: Vec::new(),
            paused: false,
            last_rebalance: None,
            cooldown_override: false,
        }
    }
}

// =============================================================================
// Proposals and history
// =============================================================================

/// Strongly-typed proposal identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(String);

impl ProposalId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProposalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate rebalance decision awaiting user confirmation.
///
/// Weight maps share one asset-key universe; values are portfolio fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceProposal {
    pub id: ProposalId,
    pub before_weights: HashMap<String, f64>,
    pub after_weights: HashMap<String, f64>,
    pub rationale: String,
    pub timestamp: DateTime<Utc>,
    pub confirmed: bool,
    pub skipped: bool,
}

/// Final state assigned to a proposal when the user resolves it.
/// Confirmed and skipped are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalOutcome {
    Confirmed,
    Skipped,
}

/// Immutable record of a resolved proposal. Append-only; never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceHistoryEntry {
    pub id: ProposalId,
    pub before_weights: HashMap<String, f64>,
    pub after_weights: HashMap<String, f64>,
    pub rationale: String,
    pub timestamp: DateTime<Utc>,
    pub confirmed: bool,
    pub skipped: bool,
}

// =============================================================================
// Signals and events
// =============================================================================

/// A strategy-generated event that can satisfy the signal trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySignal {
    pub id: String,
    /// Where the signal came from, e.g. an overlay id.
    pub source: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// An external macro-market event that can satisfy the macro trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketEvent {
    pub id: String,
    pub kind: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Overlay executions that matched at least one rule feed the signal trigger.
impl From<OverlayExecution> for StrategySignal {
    fn from(execution: OverlayExecution) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: execution.overlay_id.to_string(),
            description: format!(
                "{} rule(s) matched, {} action(s) produced",
                execution.matched_rules.len(),
                execution.actions.len()
            ),
            timestamp: execution.timestamp,
        }
    }
}
