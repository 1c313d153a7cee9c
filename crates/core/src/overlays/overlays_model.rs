//! Overlay domain models.
//!
//! An overlay is a named, versioned rule-based strategy: an ordered list of
//! rules, each a prioritized set of conditions mapped to a set of actions.
//! The wire shape (camelCase keys, the original operator/action tokens) is
//! preserved so exported overlays remain interchangeable with the dashboard
//! API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Identifiers
// =============================================================================

/// Strongly-typed overlay identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed rule identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Conditions
// =============================================================================

/// Logical connector joining a condition to the next one in a rule.
///
/// A missing connector is treated as `And` during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalConnector {
    And,
    Or,
}

/// Closed set of fields a condition can inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionField {
    Price,
    Volume,
    MarketCap,
    Symbol,
    Sector,
}

impl ConditionField {
    /// Numeric fields require positive numeric condition values; string
    /// fields require non-empty strings.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConditionField::Price | ConditionField::Volume | ConditionField::MarketCap
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionField::Price => "price",
            ConditionField::Volume => "volume",
            ConditionField::MarketCap => "marketCap",
            ConditionField::Symbol => "symbol",
            ConditionField::Sector => "sector",
        }
    }
}

impl std::fmt::Display for ConditionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operators, serialized as the original wire tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "between")]
    Between,
    /// Catch-all escape hatch evaluated by the embedder, never matched here.
    /// Validation flags every use of it with a warning.
    #[serde(rename = "complex")]
    Complex,
}

/// A single predicate over a named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    /// Numeric or string depending on the field.
    pub value: Value,
    /// Upper bound for the `between` operator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_value: Option<Value>,
    /// Connector to the next condition in the rule's list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<LogicalConnector>,
}

impl Condition {
    /// Evaluates this predicate against a snapshot.
    ///
    /// Shapes the validation contract rejects (wrong value type for the
    /// field, missing `between` bound, `complex`) evaluate to false rather
    /// than erroring; `validate_overlay` reports them separately.
    pub fn matches(&self, snapshot: &MarketSnapshot) -> bool {
        if self.field.is_numeric() {
            let Some(actual) = snapshot.numeric_field(self.field) else {
                return false;
            };
            let Some(expected) = self.value.as_f64() else {
                return false;
            };
            match self.operator {
                ConditionOperator::GreaterThan => actual > expected,
                ConditionOperator::LessThan => actual < expected,
                ConditionOperator::Equals => actual == expected,
                ConditionOperator::GreaterOrEqual => actual >= expected,
                ConditionOperator::LessOrEqual => actual <= expected,
                ConditionOperator::NotEquals => actual != expected,
                ConditionOperator::Between => {
                    match self.secondary_value.as_ref().and_then(Value::as_f64) {
                        // Bounds are inclusive on both ends.
                        Some(upper) => actual >= expected && actual <= upper,
                        None => false,
                    }
                }
                ConditionOperator::Contains | ConditionOperator::Complex => false,
            }
        } else {
            let Some(actual) = snapshot.string_field(self.field) else {
                return false;
            };
            let Some(expected) = self.value.as_str() else {
                return false;
            };
            match self.operator {
                ConditionOperator::Equals => actual.eq_ignore_ascii_case(expected),
                ConditionOperator::NotEquals => !actual.eq_ignore_ascii_case(expected),
                ConditionOperator::Contains => {
                    actual.to_lowercase().contains(&expected.to_lowercase())
                }
                _ => false,
            }
        }
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Kinds of effects a rule can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Buy,
    Sell,
    Hold,
    Rebalance,
    Alert,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Buy => "buy",
            ActionKind::Sell => "sell",
            ActionKind::Hold => "hold",
            ActionKind::Rebalance => "rebalance",
            ActionKind::Alert => "alert",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An effect to apply when a rule's conditions hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Position percentage for buy/sell, in (0, 100].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    /// Target weight for rebalance, in [0, 100].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Action {
    pub fn buy(percentage: f64, reason: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Buy,
            percentage: Some(percentage),
            target_weight: None,
            reason: Some(reason.into()),
        }
    }

    pub fn sell(percentage: f64, reason: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Sell,
            percentage: Some(percentage),
            target_weight: None,
            reason: Some(reason.into()),
        }
    }

    pub fn rebalance(target_weight: f64, reason: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Rebalance,
            percentage: None,
            target_weight: Some(target_weight),
            reason: Some(reason.into()),
        }
    }

    pub fn alert(reason: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Alert,
            percentage: None,
            target_weight: None,
            reason: Some(reason.into()),
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// One prioritized condition-set/action-set pair within an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    /// Higher priority rules are evaluated first.
    pub priority: i32,
    pub enabled: bool,
}

impl Rule {
    /// A rule matches when its condition chain holds against the snapshot.
    ///
    /// Connectors join each condition to the next, folded left-to-right; a
    /// missing connector means `And`. A rule with no conditions never
    /// matches (it is also a validation error).
    pub fn matches(&self, snapshot: &MarketSnapshot) -> bool {
        let mut conditions = self.conditions.iter();
        let Some(first) = conditions.next() else {
            return false;
        };
        let mut result = first.matches(snapshot);
        let mut connector = first.connector;
        for condition in conditions {
            let value = condition.matches(snapshot);
            result = match connector.unwrap_or(LogicalConnector::And) {
                LogicalConnector::And => result && value,
                LogicalConnector::Or => result || value,
            };
            connector = condition.connector;
        }
        result
    }
}

/// Input model for adding a rule to an overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub priority: i32,
}

impl NewRule {
    pub(crate) fn into_rule(self) -> Rule {
        Rule {
            id: RuleId::new(),
            name: self.name,
            conditions: self.conditions,
            actions: self.actions,
            priority: self.priority,
            enabled: true,
        }
    }
}

// =============================================================================
// Overlays
// =============================================================================

/// Relative complexity of an overlay's rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Advanced,
}

/// Coarse risk bucket for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Descriptive metadata attached to an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OverlayMetadata {
    pub complexity: Complexity,
    pub risk_level: RiskLevel,
    pub tags: Vec<String>,
    /// Additive contribution to the portfolio risk sub-score while this
    /// overlay is active. Absent on imported payloads defaults to zero.
    #[serde(default)]
    pub risk_adjustment: f64,
}

/// A named, versioned rule-based strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub id: OverlayId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub owner: String,
    pub rules: Vec<Rule>,
    pub is_active: bool,
    /// Incremented on every structural mutation (rule add/update/remove,
    /// field update, activation toggle).
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backtest: Option<BacktestResult>,
    pub metadata: OverlayMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for updating an overlay's descriptive fields.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub metadata: Option<OverlayMetadata>,
}

/// Structured result of validating one overlay. Never surfaced as an `Err`;
/// invalid overlays remain storable and only explicit validation reports
/// their problems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Prototype rule carried by a template: a rule without identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePrototype {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub priority: i32,
}

impl RulePrototype {
    pub(crate) fn instantiate(&self) -> Rule {
        Rule {
            id: RuleId::new(),
            name: self.name.clone(),
            conditions: self.conditions.clone(),
            actions: self.actions.clone(),
            priority: self.priority,
            enabled: true,
        }
    }
}

/// A factory for pre-built overlays. Loaded once at engine construction and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub rules: Vec<RulePrototype>,
    pub metadata: OverlayMetadata,
}

// =============================================================================
// Execution
// =============================================================================

/// Evaluation context for overlay execution: one instrument at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub symbol: String,
    pub sector: String,
    pub price: f64,
    pub volume: f64,
    pub market_cap: f64,
}

impl MarketSnapshot {
    pub(crate) fn numeric_field(&self, field: ConditionField) -> Option<f64> {
        match field {
            ConditionField::Price => Some(self.price),
            ConditionField::Volume => Some(self.volume),
            ConditionField::MarketCap => Some(self.market_cap),
            ConditionField::Symbol | ConditionField::Sector => None,
        }
    }

    pub(crate) fn string_field(&self, field: ConditionField) -> Option<&str> {
        match field {
            ConditionField::Symbol => Some(&self.symbol),
            ConditionField::Sector => Some(&self.sector),
            _ => None,
        }
    }
}

/// Result of executing one overlay against a market snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayExecution {
    pub overlay_id: OverlayId,
    /// Matched rules in descending priority order.
    pub matched_rules: Vec<RuleId>,
    /// Actions contributed by the matched rules, in the same order.
    pub actions: Vec<Action>,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Backtests
// =============================================================================

/// Point on a backtest equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Outcome of one backtest simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub total_trades: u32,
    pub winning_trades: u32,
    /// Fraction of winning trades, in [0, 1].
    pub win_rate: f64,
    /// Total return over the simulated range, as a fraction.
    pub total_return: f64,
    /// Largest fractional decline from a running peak, in [0, 1].
    pub max_drawdown: f64,
    pub equity_curve: Vec<EquityPoint>,
    /// Seed the series was produced with; identical seed and range
    /// reproduce the result exactly.
    pub seed: u64,
}
