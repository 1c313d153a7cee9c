//! Built-in overlay templates.

use serde_json::json;

use super::overlays_model::{
    Action, Complexity, Condition, ConditionField, ConditionOperator, LogicalConnector,
    OverlayMetadata, OverlayTemplate, RiskLevel, RulePrototype,
};

/// The template catalogue loaded at engine construction.
pub(crate) fn builtin_templates() -> Vec<OverlayTemplate> {
    vec![
        momentum_tilt(),
        drawdown_brake(),
        sector_cap(),
    ]
}

fn momentum_tilt() -> OverlayTemplate {
    OverlayTemplate {
        id: "momentum-tilt".to_string(),
        name: "Momentum Tilt".to_string(),
        description: "Adds to positions trading on elevated volume and trims extended ones"
            .to_string(),
        category: "momentum".to_string(),
        rules: vec![
            RulePrototype {
                name: "Add on volume surge".to_string(),
                conditions: vec![Condition {
                    field: ConditionField::Volume,
                    operator: ConditionOperator::GreaterThan,
                    value: json!(2_000_000),
                    secondary_value: None,
                    connector: None,
                }],
                actions: vec![Action::buy(5.0, "Volume surge confirms momentum")],
                priority: 2,
            },
            RulePrototype {
                name: "Trim extended positions".to_string(),
                conditions: vec![Condition {
                    field: ConditionField::Price,
                    operator: ConditionOperator::GreaterThan,
                    value: json!(250.0),
                    secondary_value: None,
                    connector: None,
                }],
                actions: vec![Action::sell(10.0, "Price extended above band")],
                priority: 1,
            },
        ],
        metadata: OverlayMetadata {
            complexity: Complexity::Simple,
            risk_level: RiskLevel::Medium,
            tags: vec!["momentum".to_string(), "trend".to_string()],
            risk_adjustment: 0.05,
        },
    }
}

fn drawdown_brake() -> OverlayTemplate {
    OverlayTemplate {
        id: "drawdown-brake".to_string(),
        name: "Drawdown Brake".to_string(),
        description: "Rotates toward the target allocation when prices fall through the floor"
            .to_string(),
        category: "defensive".to_string(),
        rules: vec![RulePrototype {
            name: "Rebalance on breakdown".to_string(),
            conditions: vec![
                Condition {
                    field: ConditionField::Price,
                    operator: ConditionOperator::LessThan,
                    value: json!(50.0),
                    secondary_value: None,
                    connector: Some(LogicalConnector::And),
                },
                Condition {
                    field: ConditionField::Volume,
                    operator: ConditionOperator::GreaterThan,
                    value: json!(500_000),
                    secondary_value: None,
                    connector: None,
                },
            ],
            actions: vec![Action::rebalance(60.0, "Breakdown on heavy volume")],
            priority: 3,
        }],
        metadata: OverlayMetadata {
            complexity: Complexity::Moderate,
            risk_level: RiskLevel::Low,
            tags: vec!["defensive".to_string(), "drawdown".to_string()],
            risk_adjustment: -0.05,
        },
    }
}

fn sector_cap() -> OverlayTemplate {
    OverlayTemplate {
        id: "sector-cap".to_string(),
        name: "Sector Concentration Cap".to_string(),
        description: "Flags and trims oversized technology exposure".to_string(),
        category: "risk".to_string(),
        rules: vec![RulePrototype {
            name: "Cap technology mega-caps".to_string(),
            conditions: vec![
                Condition {
                    field: ConditionField::Sector,
                    operator: ConditionOperator::Equals,
                    value: json!("Technology"),
                    secondary_value: None,
                    connector: Some(LogicalConnector::And),
                },
                Condition {
                    field: ConditionField::MarketCap,
                    operator: ConditionOperator::GreaterThan,
                    value: json!(500_000_000_000u64),
                    secondary_value: None,
                    connector: None,
                },
            ],
            actions: vec![
                Action::alert("Technology exposure above cap"),
                Action::sell(5.0, "Trim concentrated mega-cap position"),
            ],
            priority: 1,
        }],
        metadata: OverlayMetadata {
            complexity: Complexity::Simple,
            risk_level: RiskLevel::Low,
            tags: vec!["risk".to_string(), "concentration".to_string()],
            risk_adjustment: -0.02,
        },
    }
}
