//! Overlay service and backtest provider traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;

use super::overlays_model::{
    BacktestResult, MarketSnapshot, NewRule, Overlay, OverlayExecution, OverlayId,
    OverlayTemplate, OverlayUpdate, OverlayValidation, Rule, RuleId,
};

/// Simulation seam for overlay backtests.
///
/// The shipped [`SyntheticBacktestProvider`](super::SyntheticBacktestProvider)
/// fabricates a reproducible series from an explicit seed. Production
/// embedders implement this trait against real historical data and should
/// treat runs as cancellable, timeout-bounded tasks.
#[async_trait]
pub trait BacktestProvider: Send + Sync {
    async fn run(&self, overlay: &Overlay, start: NaiveDate, end: NaiveDate)
        -> Result<BacktestResult>;
}

/// Service interface for the overlay rule engine.
///
/// # Failure semantics
///
/// Catalogue operations on an unknown id return sentinel values (`None` /
/// `false`) and never error. `backtest_overlay` is the one operation that
/// errors on an unknown id instead (`Error::NotFound`) because it has no
/// sentinel-shaped return; the asymmetry is deliberate and matches the
/// upstream API. Validation never errors either: it always returns a
/// structured [`OverlayValidation`].
#[async_trait]
pub trait OverlayServiceTrait: Send + Sync {
    /// Creates an overlay with no rules, inactive, at version 1.
    fn create_overlay(&self, name: &str, description: &str, category: &str, owner: &str)
        -> Overlay;

    fn get_overlay(&self, id: &OverlayId) -> Option<Overlay>;

    fn list_overlays(&self) -> Vec<Overlay>;

    /// Applies the non-`None` fields of `update`; returns the updated
    /// overlay, or `None` for an unknown id.
    fn update_overlay(&self, id: &OverlayId, update: OverlayUpdate) -> Option<Overlay>;

    /// Toggles the active flag. Activation gates scheduling (which overlays
    /// feed signals automatically), not execution.
    fn set_active(&self, id: &OverlayId, active: bool) -> bool;

    /// Deletes an overlay. Returns `false` for an unknown id, and for an
    /// overlay that is still active: deactivate first.
    fn delete_overlay(&self, id: &OverlayId) -> bool;

    /// Appends a rule; returns the created rule, or `None` for an unknown
    /// overlay.
    fn add_rule(&self, id: &OverlayId, rule: NewRule) -> Option<Rule>;

    /// Replaces the rule with the same id. Returns `false` when either the
    /// overlay or the rule is unknown.
    fn update_rule(&self, id: &OverlayId, rule: Rule) -> bool;

    fn remove_rule(&self, id: &OverlayId, rule_id: &RuleId) -> bool;

    /// Validates an overlay's content. Unknown ids report as a not-found
    /// validation error, not an `Err`.
    fn validate_overlay(&self, id: &OverlayId) -> OverlayValidation;

    /// Case-insensitive substring match over name, description, category,
    /// and tags; `owner` filters by exact match.
    fn search_overlays(&self, query: &str, owner: Option<&str>) -> Vec<Overlay>;

    /// Structural copy with fresh overlay and rule ids, version reset to 1,
    /// inactive, and no backtest carried over.
    fn clone_overlay(&self, id: &OverlayId) -> Option<Overlay>;

    /// Instantiates an overlay from a built-in template's rule prototypes.
    fn create_from_template(&self, template_id: &str, name: &str, owner: &str)
        -> Option<Overlay>;

    fn list_templates(&self) -> Vec<OverlayTemplate>;

    /// Evaluates enabled rules against a snapshot, highest priority first.
    /// Inactive overlays execute too; this is a dry-run surface.
    fn execute_overlay(&self, id: &OverlayId, snapshot: &MarketSnapshot)
        -> Option<OverlayExecution>;

    /// Runs the injected backtest provider and stores the result on the
    /// overlay. Errors with `Error::NotFound` for an unknown id.
    async fn backtest_overlay(
        &self,
        id: &OverlayId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BacktestResult>;

    /// Serializes an overlay to JSON. `None` for an unknown id.
    async fn export_overlay(&self, id: &OverlayId) -> Option<String>;

    /// Deserializes an exported payload, assigns fresh overlay and rule
    /// ids, resets version and the active flag, and inserts it.
    async fn import_overlay(&self, json: &str) -> Result<Overlay>;
}
