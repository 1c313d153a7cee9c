//! Overlays module - rule-based strategy catalogue and execution engine.
//!
//! An overlay bundles prioritized condition/action rules into one named,
//! versioned strategy. This module owns overlay lifecycle (CRUD with version
//! bumps), structured validation, execution against market snapshots,
//! templates, export/import, and backtesting through a pluggable provider.

mod backtest;
mod overlays_model;
mod overlays_service;
mod overlays_templates;
mod overlays_traits;


// Re-export the public interface
pub use backtest::SyntheticBacktestProvider;
pub use overlays_model::{
    Action, ActionKind, BacktestResult, Complexity, Condition, ConditionField,
    ConditionOperator, EquityPoint, LogicalConnector, MarketSnapshot, NewRule, Overlay,
    OverlayExecution, OverlayId, OverlayMetadata, OverlayTemplate, OverlayUpdate,
    OverlayValidation, RiskLevel, Rule, RuleId, RulePrototype,
};
pub use overlays_service::OverlayService;
pub use overlays_traits::{BacktestProvider, OverlayServiceTrait};
