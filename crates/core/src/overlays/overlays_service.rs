//! Overlay rule engine service.
//!
//! Owns the overlay catalogue and the full lifecycle of overlays and their
//! rules: CRUD with version bumps, structured validation, execution against
//! market snapshots, template instantiation, export/import, and backtests
//! through the injected provider.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, warn};

use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};

use super::overlays_model::{
    Action, ActionKind, BacktestResult, Condition, ConditionOperator, MarketSnapshot, NewRule,
    Overlay, OverlayExecution, OverlayId, OverlayMetadata, OverlayTemplate, OverlayUpdate,
    OverlayValidation, Rule, RuleId,
};
use super::overlays_templates::builtin_templates;
use super::overlays_traits::{BacktestProvider, OverlayServiceTrait};

/// Warn when a single overlay carries more rules than this.
const RULE_COUNT_WARNING_THRESHOLD: usize = 10;

// =============================================================================
// Catalogue arena
// =============================================================================

/// In-memory overlay catalogue: stable slots plus a typed-id index.
///
/// Deleting clears a slot and recycles it through the free list; the index
/// is the only path to a slot, so stale slot numbers can never be observed.
#[derive(Default)]
struct OverlayArena {
    slots: Vec<Option<Overlay>>,
    index: HashMap<OverlayId, usize>,
    free: Vec<usize>,
}

impl OverlayArena {
    fn insert(&mut self, overlay: Overlay) {
        let id = overlay.id.clone();
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(overlay);
                slot
            }
            None => {
                self.slots.push(Some(overlay));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
    }

    fn get(&self, id: &OverlayId) -> Option<&Overlay> {
        self.index
            .get(id)
            .and_then(|slot| self.slots.get(*slot))
            .and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: &OverlayId) -> Option<&mut Overlay> {
        let slot = *self.index.get(id)?;
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    fn remove(&mut self, id: &OverlayId) -> Option<Overlay> {
        let slot = self.index.remove(id)?;
        let overlay = self.slots.get_mut(slot).and_then(Option::take);
        if overlay.is_some() {
            self.free.push(slot);
        }
        overlay
    }

    fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

// =============================================================================
// Service
// =============================================================================

pub struct OverlayService {
    catalogue: RwLock<OverlayArena>,
    templates: Vec<OverlayTemplate>,
    backtests: Arc<dyn BacktestProvider>,
    events: Arc<dyn DomainEventSink>,
}

impl OverlayService {
    pub fn new(backtests: Arc<dyn BacktestProvider>, events: Arc<dyn DomainEventSink>) -> Self {
        Self {
            catalogue: RwLock::new(OverlayArena::default()),
            templates: builtin_templates(),
            backtests,
            events,
        }
    }

    fn insert_new(&self, mut overlay: Overlay) -> Overlay {
        overlay.version = 1;
        overlay.is_active = false;
        let snapshot = overlay.clone();
        self.catalogue.write().unwrap().insert(overlay);
        self.events.emit(DomainEvent::overlay_mutated(
            snapshot.id.to_string(),
            snapshot.version,
        ));
        snapshot
    }

    /// Applies `mutation` to the overlay; on `Some`, bumps the version,
    /// refreshes the modification timestamp, and emits the mutation event.
    fn try_mutate<T>(
        &self,
        id: &OverlayId,
        mutation: impl FnOnce(&mut Overlay) -> Option<T>,
    ) -> Option<T> {
        let mut catalogue = self.catalogue.write().unwrap();
        let overlay = catalogue.get_mut(id)?;
        let result = mutation(overlay)?;
        overlay.version += 1;
        overlay.updated_at = Utc::now();
        let event = DomainEvent::overlay_mutated(overlay.id.to_string(), overlay.version);
        drop(catalogue);
        self.events.emit(event);
        Some(result)
    }

    fn reidentified(mut overlay: Overlay, keep_name: bool) -> Overlay {
        let now = Utc::now();
        overlay.id = OverlayId::new();
        overlay.version = 1;
        overlay.is_active = false;
        overlay.last_backtest = None;
        overlay.created_at = now;
        overlay.updated_at = now;
        for rule in &mut overlay.rules {
            rule.id = RuleId::new();
        }
        if !keep_name {
            overlay.name = format!("{} (Copy)", overlay.name);
        }
        overlay
    }
}

#[async_trait]
impl OverlayServiceTrait for OverlayService {
    fn create_overlay(
        &self,
        name: &str,
        description: &str,
        category: &str,
        owner: &str,
    ) -> Overlay {
        let now = Utc::now();
        let overlay = Overlay {
            id: OverlayId::new(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            owner: owner.to_string(),
            rules: Vec::new(),
            is_active: false,
            version: 1,
            last_backtest: None,
            metadata: OverlayMetadata::default(),
            created_at: now,
            updated_at: now,
        };
        debug!("creating overlay '{}' ({})", overlay.name, overlay.id);
        self.insert_new(overlay)
    }

    fn get_overlay(&self, id: &OverlayId) -> Option<Overlay> {
        self.catalogue.read().unwrap().get(id).cloned()
    }

    fn list_overlays(&self) -> Vec<Overlay> {
        self.catalogue.read().unwrap().iter().cloned().collect()
    }

    fn update_overlay(&self, id: &OverlayId, update: OverlayUpdate) -> Option<Overlay> {
        self.try_mutate(id, |overlay| {
            if let Some(name) = update.name {
                overlay.name = name;
            }
            if let Some(description) = update.description {
                overlay.description = description;
            }
            if let Some(category) = update.category {
                overlay.category = category;
            }
            if let Some(metadata) = update.metadata {
                overlay.metadata = metadata;
            }
            Some(())
        })?;
        self.get_overlay(id)
    }

    fn set_active(&self, id: &OverlayId, active: bool) -> bool {
        self.try_mutate(id, |overlay| {
            overlay.is_active = active;
            Some(())
        })
        .is_some()
    }

    fn delete_overlay(&self, id: &OverlayId) -> bool {
        let mut catalogue = self.catalogue.write().unwrap();
        let is_active = match catalogue.get(id) {
            Some(overlay) => overlay.is_active,
            None => return false,
        };
        if is_active {
            warn!("refusing to delete active overlay {}", id);
            return false;
        }
        let Some(overlay) = catalogue.remove(id) else {
            return false;
        };
        drop(catalogue);
        debug!("deleted overlay '{}' ({})", overlay.name, overlay.id);
        self.events.emit(DomainEvent::overlay_mutated(
            overlay.id.to_string(),
            overlay.version,
        ));
        true
    }

    fn add_rule(&self, id: &OverlayId, rule: NewRule) -> Option<Rule> {
        self.try_mutate(id, |overlay| {
            let rule = rule.into_rule();
            overlay.rules.push(rule.clone());
            Some(rule)
        })
    }

    fn update_rule(&self, id: &OverlayId, rule: Rule) -> bool {
        self.try_mutate(id, |overlay| {
            let existing = overlay.rules.iter_mut().find(|r| r.id == rule.id)?;
            *existing = rule;
            Some(())
        })
        .is_some()
    }

    fn remove_rule(&self, id: &OverlayId, rule_id: &RuleId) -> bool {
        self.try_mutate(id, |overlay| {
            let position = overlay.rules.iter().position(|r| &r.id == rule_id)?;
            overlay.rules.remove(position);
            Some(())
        })
        .is_some()
    }

    fn validate_overlay(&self, id: &OverlayId) -> OverlayValidation {
        match self.catalogue.read().unwrap().get(id) {
            Some(overlay) => validate_content(overlay),
            None => OverlayValidation {
                is_valid: false,
                errors: vec![format!("Overlay not found: {}", id)],
                warnings: Vec::new(),
            },
        }
    }

    fn search_overlays(&self, query: &str, owner: Option<&str>) -> Vec<Overlay> {
        let needle = query.to_lowercase();
        self.catalogue
            .read()
            .unwrap()
            .iter()
            .filter(|overlay| owner.is_none_or(|o| overlay.owner == o))
            .filter(|overlay| {
                overlay.name.to_lowercase().contains(&needle)
                    || overlay.description.to_lowercase().contains(&needle)
                    || overlay.category.to_lowercase().contains(&needle)
                    || overlay
                        .metadata
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    fn clone_overlay(&self, id: &OverlayId) -> Option<Overlay> {
        let source = self.get_overlay(id)?;
        Some(self.insert_new(Self::reidentified(source, false)))
    }

    fn create_from_template(
        &self,
        template_id: &str,
        name: &str,
        owner: &str,
    ) -> Option<Overlay> {
        let template = self.templates.iter().find(|t| t.id == template_id)?;
        let now = Utc::now();
        let overlay = Overlay {
            id: OverlayId::new(),
            name: name.to_string(),
            description: template.description.clone(),
            category: template.category.clone(),
            owner: owner.to_string(),
            rules: template.rules.iter().map(|proto| proto.instantiate()).collect(),
            is_active: false,
            version: 1,
            last_backtest: None,
            metadata: template.metadata.clone(),
            created_at: now,
            updated_at: now,
        };
        debug!(
            "instantiated overlay '{}' from template '{}'",
            overlay.name, template.id
        );
        Some(self.insert_new(overlay))
    }

    fn list_templates(&self) -> Vec<OverlayTemplate> {
        self.templates.clone()
    }

    fn execute_overlay(
        &self,
        id: &OverlayId,
        snapshot: &MarketSnapshot,
    ) -> Option<OverlayExecution> {
        let overlay = self.get_overlay(id)?;

        let mut rules: Vec<&Rule> = overlay.rules.iter().filter(|r| r.enabled).collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut matched_rules = Vec::new();
        let mut actions = Vec::new();
        for rule in rules {
            if rule.matches(snapshot) {
                matched_rules.push(rule.id.clone());
                actions.extend(rule.actions.iter().cloned());
            }
        }

        debug!(
            "executed overlay {} against {}: {} rule(s) matched",
            overlay.id,
            snapshot.symbol,
            matched_rules.len()
        );
        self.events.emit(DomainEvent::overlay_executed(
            overlay.id.to_string(),
            matched_rules.len(),
        ));

        Some(OverlayExecution {
            overlay_id: overlay.id,
            matched_rules,
            actions,
            timestamp: Utc::now(),
        })
    }

    async fn backtest_overlay(
        &self,
        id: &OverlayId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BacktestResult> {
        let overlay = self
            .get_overlay(id)
            .ok_or_else(|| Error::NotFound(format!("Overlay not found: {}", id)))?;

        let result = self.backtests.run(&overlay, start, end).await?;

        // Recording a backtest is not a structural mutation; no version bump.
        if let Some(stored) = self.catalogue.write().unwrap().get_mut(id) {
            stored.last_backtest = Some(result.clone());
        }
        Ok(result)
    }

    async fn export_overlay(&self, id: &OverlayId) -> Option<String> {
        let overlay = self.get_overlay(id)?;
        match serde_json::to_string_pretty(&overlay) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("failed to serialize overlay {}: {}", id, e);
                None
            }
        }
    }

    async fn import_overlay(&self, json: &str) -> Result<Overlay> {
        let parsed: Overlay = serde_json::from_str(json)?;
        if parsed.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Imported overlay name cannot be empty".to_string(),
            )));
        }
        debug!("importing overlay '{}'", parsed.name);
        Ok(self.insert_new(Self::reidentified(parsed, true)))
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates one overlay's content against the rule/condition/action
/// contracts. Rule indices in messages are 1-based.
fn validate_content(overlay: &Overlay) -> OverlayValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if overlay.name.trim().is_empty() {
        errors.push("Overlay name must not be empty".to_string());
    }
    if overlay.rules.is_empty() {
        errors.push("Overlay has no rules".to_string());
    }
    if overlay.rules.len() > RULE_COUNT_WARNING_THRESHOLD {
        warnings.push(format!(
            "Overlay has {} rules; more than {} may slow evaluation",
            overlay.rules.len(),
            RULE_COUNT_WARNING_THRESHOLD
        ));
    }

    for (i, rule) in overlay.rules.iter().enumerate() {
        validate_rule(i + 1, rule, &mut errors, &mut warnings);
    }

    OverlayValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn validate_rule(index: usize, rule: &Rule, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if rule.name.trim().is_empty() {
        errors.push(format!("Rule {}: name must not be empty", index));
    }
    if rule.conditions.is_empty() {
        errors.push(format!("Rule {}: no conditions defined", index));
    }
    if rule.actions.is_empty() {
        errors.push(format!("Rule {}: no actions defined", index));
    }

    for (j, condition) in rule.conditions.iter().enumerate() {
        validate_condition(index, j + 1, condition, errors, warnings);
    }
    for (k, action) in rule.actions.iter().enumerate() {
        validate_action(index, k + 1, action, errors);
    }
}

fn validate_condition(
    rule_index: usize,
    index: usize,
    condition: &Condition,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    if condition.field.is_numeric() {
        let positive = condition.value.as_f64().is_some_and(|v| v > 0.0);
        if !positive {
            errors.push(format!(
                "Rule {}, condition {}: {} requires a positive numeric value",
                rule_index, index, condition.field
            ));
        }
    } else {
        let non_empty = condition
            .value
            .as_str()
            .is_some_and(|s| !s.trim().is_empty());
        if !non_empty {
            errors.push(format!(
                "Rule {}, condition {}: {} requires a non-empty string value",
                rule_index, index, condition.field
            ));
        }
    }

    if condition.operator == ConditionOperator::Between && condition.secondary_value.is_none() {
        errors.push(format!(
            "Rule {}, condition {}: between requires a secondary value",
            rule_index, index
        ));
    }

    if condition.operator == ConditionOperator::Complex {
        warnings.push(format!(
            "Rule {}, condition {}: 'complex' operator is not evaluated by the engine",
            rule_index, index
        ));
    }
}

fn validate_action(rule_index: usize, index: usize, action: &Action, errors: &mut Vec<String>) {
    match action.kind {
        ActionKind::Buy | ActionKind::Sell => {
            let valid = action
                .percentage
                .is_some_and(|p| p > 0.0 && p <= 100.0);
            if !valid {
                errors.push(format!(
                    "Rule {}, action {}: {} requires a percentage in (0, 100]",
                    rule_index, index, action.kind
                ));
            }
        }
        ActionKind::Rebalance => {
            let valid = action
                .target_weight
                .is_some_and(|w| (0.0..=100.0).contains(&w));
            if !valid {
                errors.push(format!(
                    "Rule {}, action {}: rebalance requires a target weight in [0, 100]",
                    rule_index, index
                ));
            }
        }
        ActionKind::Hold | ActionKind::Alert => {}
    }
}
