/// Advisory minimum spacing between rebalances, in hours. The advisory never
/// blocks a trigger; it only annotates the rationale.
pub const COOLDOWN_HOURS: i64 = 24;

/// Cadence at which callers should re-poll the trigger evaluator, in seconds.
/// The evaluator itself never sleeps or spawns.
pub const POLL_INTERVAL_SECS: u64 = 300;

/// Rationale fragment recorded when the interval trigger fires.
pub const INTERVAL_TRIGGER_PHRASE: &str = "Scheduled interval elapsed";

/// Rationale fragment recorded when macro market events are present.
pub const MACRO_TRIGGER_PHRASE: &str = "Macro market event detected";

/// Rationale fragment recorded when strategy signals are present.
pub const SIGNAL_TRIGGER_PHRASE: &str = "Strategy signal detected";

/// Advisory appended when a rebalance happened within the cooldown window.
pub const COOLDOWN_ADVISORY_PHRASE: &str =
    "Advisory: at most one rebalance per day is recommended";

/// Separator between rationale fragments.
pub const RATIONALE_SEPARATOR: &str = "; ";
