//! Driftguard Core - rebalance decision logic for a portfolio manager.
//!
//! This crate contains the decision core consumed by the presentation and
//! persistence layers of the surrounding application:
//!
//! - [`rebalancing`] decides *when* a rebalance should be proposed: a
//!   trigger evaluator over schedules, macro events, and strategy signals,
//!   plus the append-only history of confirmed/skipped proposals.
//! - [`overlays`] decides *what* a rebalance should do: a catalogue of
//!   named, versioned rule-based strategies with validation, execution,
//!   templates, export/import, and pluggable backtesting.
//! - [`health`] closes the loop: a composite 0–100 portfolio health score
//!   whose critical hook lets the owner auto-request a rebalance when
//!   health degrades.
//!
//! Services are explicitly constructed and dependency-injected; there is no
//! global state. All catalogue state is in memory; persistence, market data,
//! and UI are collaborator boundaries.

pub mod errors;
pub mod events;
pub mod health;
pub mod overlays;
pub mod rebalancing;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
