//! Tests for trigger evaluation and the rebalance history store.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::events::{DomainEvent, MockDomainEventSink, NoOpDomainEventSink};
    use crate::rebalancing::{
        IdentityAllocator, MarketEvent, ProposalOutcome, RebalanceHistory, RebalanceInterval,
        RebalanceSchedule, StrategySignal, TriggerEvaluator, TriggerKind,
        COOLDOWN_ADVISORY_PHRASE, INTERVAL_TRIGGER_PHRASE, MACRO_TRIGGER_PHRASE,
        SIGNAL_TRIGGER_PHRASE,
    };

    // ============== Helpers ==============

    fn evaluator() -> TriggerEvaluator {
        TriggerEvaluator::new(Arc::new(IdentityAllocator))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn weights() -> HashMap<String, f64> {
        HashMap::from([
            ("VTI".to_string(), 0.6),
            ("BND".to_string(), 0.3),
            ("GLD".to_string(), 0.1),
        ])
    }

    fn signal() -> StrategySignal {
        StrategySignal {
            id: "sig-1".to_string(),
            source: "overlay-1".to_string(),
            description: "momentum fired".to_string(),
            timestamp: now(),
        }
    }

    fn market_event() -> MarketEvent {
        MarketEvent {
            id: "evt-1".to_string(),
            kind: "rate-decision".to_string(),
            description: "central bank cut".to_string(),
            timestamp: now(),
        }
    }

    fn interval_schedule(interval: RebalanceInterval) -> RebalanceSchedule {
        RebalanceSchedule {
            interval: Some(interval),
            triggers: vec![TriggerKind::Interval],
            ..Default::default()
        }
    }

    // ============== Gate conditions ==============

    #[test]
    fn test_disabled_schedule_never_fires() {
        let schedule = RebalanceSchedule {
            enabled: false,
            interval: Some(RebalanceInterval::Daily),
            triggers: vec![TriggerKind::Interval, TriggerKind::Macro, TriggerKind::Signal],
            ..Default::default()
        };

        let result = evaluator().evaluate_at(
            now(),
            &schedule,
            &[signal()],
            &[market_event()],
            &weights(),
            &[],
        );

        assert!(result.is_none());
    }

    #[test]
    fn test_paused_schedule_never_fires() {
        let schedule = RebalanceSchedule {
            paused: true,
            interval: Some(RebalanceInterval::Daily),
            ..Default::default()
        };

        let result = evaluator().evaluate_at(now(), &schedule, &[], &[], &weights(), &[]);

        assert!(result.is_none());
    }

    #[test]
    fn test_no_trigger_no_proposal() {
        let schedule = RebalanceSchedule {
            triggers: vec![TriggerKind::Macro, TriggerKind::Signal],
            ..Default::default()
        };

        let result = evaluator().evaluate_at(now(), &schedule, &[], &[], &weights(), &[]);

        assert!(result.is_none());
    }

    // ============== Interval trigger ==============

    #[test]
    fn test_interval_fires_with_no_prior_rebalance() {
        let schedule = interval_schedule(RebalanceInterval::Daily);

        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[], &[], &weights(), &[])
            .unwrap();

        assert!(proposal.rationale.contains(INTERVAL_TRIGGER_PHRASE));
        assert!(proposal.rationale.contains("daily"));
        assert!(!proposal.confirmed);
        assert!(!proposal.skipped);
    }

    #[test]
    fn test_interval_fires_after_one_full_unit() {
        let mut schedule = interval_schedule(RebalanceInterval::Weekly);
        schedule.last_rebalance = Some(now() - Duration::days(7));

        let proposal = evaluator().evaluate_at(now(), &schedule, &[], &[], &weights(), &[]);

        assert!(proposal.is_some());
    }

    #[test]
    fn test_interval_quiet_before_one_full_unit() {
        let mut schedule = interval_schedule(RebalanceInterval::Monthly);
        schedule.last_rebalance = Some(now() - Duration::days(29));

        let proposal = evaluator().evaluate_at(now(), &schedule, &[], &[], &weights(), &[]);

        assert!(proposal.is_none());
    }

    // ============== Macro and signal triggers ==============

    #[test]
    fn test_macro_trigger_fires_on_events() {
        let schedule = RebalanceSchedule {
            triggers: vec![TriggerKind::Macro],
            ..Default::default()
        };

        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[], &[market_event()], &weights(), &[])
            .unwrap();

        assert!(proposal.rationale.contains(MACRO_TRIGGER_PHRASE));
    }

    #[test]
    fn test_macro_events_ignored_without_macro_trigger() {
        let schedule = RebalanceSchedule {
            triggers: vec![TriggerKind::Signal],
            ..Default::default()
        };

        let result =
            evaluator().evaluate_at(now(), &schedule, &[], &[market_event()], &weights(), &[]);

        assert!(result.is_none());
    }

    #[test]
    fn test_signal_trigger_fires_on_signals() {
        let schedule = RebalanceSchedule {
            triggers: vec![TriggerKind::Signal],
            ..Default::default()
        };

        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[signal()], &[], &weights(), &[])
            .unwrap();

        assert!(proposal.rationale.contains(SIGNAL_TRIGGER_PHRASE));
    }

    #[test]
    fn test_rationale_accumulates_in_fixed_order() {
        let schedule = RebalanceSchedule {
            interval: Some(RebalanceInterval::Daily),
            triggers: vec![TriggerKind::Interval, TriggerKind::Macro, TriggerKind::Signal],
            ..Default::default()
        };

        let proposal = evaluator()
            .evaluate_at(
                now(),
                &schedule,
                &[signal()],
                &[market_event()],
                &weights(),
                &[],
            )
            .unwrap();

        let interval_pos = proposal.rationale.find(INTERVAL_TRIGGER_PHRASE).unwrap();
        let macro_pos = proposal.rationale.find(MACRO_TRIGGER_PHRASE).unwrap();
        let signal_pos = proposal.rationale.find(SIGNAL_TRIGGER_PHRASE).unwrap();
        assert!(interval_pos < macro_pos);
        assert!(macro_pos < signal_pos);
    }

    // ============== Cooldown advisory ==============

    #[test]
    fn test_trigger_fires_during_cooldown_with_advisory() {
        // A rebalance one hour ago puts us inside the cooldown window; the
        // signal trigger must still fire, with the advisory appended.
        let schedule = RebalanceSchedule {
            triggers: vec![TriggerKind::Signal],
            last_rebalance: Some(now() - Duration::hours(1)),
            ..Default::default()
        };

        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[signal()], &[], &weights(), &[])
            .unwrap();

        assert!(proposal.rationale.contains(SIGNAL_TRIGGER_PHRASE));
        assert!(proposal.rationale.contains(COOLDOWN_ADVISORY_PHRASE));
        // The advisory comes last.
        assert!(proposal.rationale.ends_with(COOLDOWN_ADVISORY_PHRASE));
    }

    #[test]
    fn test_cooldown_override_suppresses_advisory() {
        let schedule = RebalanceSchedule {
            triggers: vec![TriggerKind::Signal],
            last_rebalance: Some(now() - Duration::hours(1)),
            cooldown_override: true,
            ..Default::default()
        };

        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[signal()], &[], &weights(), &[])
            .unwrap();

        assert!(!proposal.rationale.contains(COOLDOWN_ADVISORY_PHRASE));
    }

    #[test]
    fn test_no_advisory_outside_cooldown_window() {
        let schedule = RebalanceSchedule {
            triggers: vec![TriggerKind::Signal],
            last_rebalance: Some(now() - Duration::hours(25)),
            ..Default::default()
        };

        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[signal()], &[], &weights(), &[])
            .unwrap();

        assert!(!proposal.rationale.contains(COOLDOWN_ADVISORY_PHRASE));
    }

    // ============== Proposal payload ==============

    #[test]
    fn test_after_weights_are_identity_copy() {
        let schedule = interval_schedule(RebalanceInterval::Daily);

        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[], &[], &weights(), &[])
            .unwrap();

        assert_eq!(proposal.before_weights, proposal.after_weights);
        assert_eq!(proposal.before_weights, weights());
    }

    #[test]
    fn test_schedule_wire_shape() {
        let schedule = interval_schedule(RebalanceInterval::Daily);

        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value["interval"], "daily");
        assert_eq!(value["triggers"][0], "interval");
        assert_eq!(value["lastRebalance"], serde_json::Value::Null);
        assert_eq!(value["cooldownOverride"], false);
    }

    #[test]
    fn test_overlay_execution_converts_to_signal() {
        use crate::overlays::{OverlayExecution, OverlayId};

        let overlay_id = OverlayId::new();
        let execution = OverlayExecution {
            overlay_id: overlay_id.clone(),
            matched_rules: vec![],
            actions: vec![],
            timestamp: now(),
        };

        let signal = StrategySignal::from(execution);

        assert_eq!(signal.source, overlay_id.to_string());
        assert_eq!(signal.timestamp, now());
    }

    // ============== History ==============

    #[test]
    fn test_confirmed_outcome_advances_interval_clock() {
        let history = RebalanceHistory::new(Arc::new(NoOpDomainEventSink));
        let mut schedule = interval_schedule(RebalanceInterval::Daily);
        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[], &[], &weights(), &[])
            .unwrap();

        let entry = history.record(proposal, ProposalOutcome::Confirmed, &mut schedule);

        assert!(entry.confirmed);
        assert!(!entry.skipped);
        assert_eq!(schedule.last_rebalance, Some(now()));

        // The next daily evaluation is quiet until a full unit elapses.
        let next = evaluator().evaluate_at(
            now() + Duration::hours(1),
            &schedule,
            &[],
            &[],
            &weights(),
            &[],
        );
        assert!(next.is_none());
    }

    #[test]
    fn test_skipped_outcome_leaves_interval_clock() {
        let history = RebalanceHistory::new(Arc::new(NoOpDomainEventSink));
        let mut schedule = interval_schedule(RebalanceInterval::Daily);
        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[], &[], &weights(), &[])
            .unwrap();

        let entry = history.record(proposal, ProposalOutcome::Skipped, &mut schedule);

        assert!(entry.skipped);
        assert!(!entry.confirmed);
        assert_eq!(schedule.last_rebalance, None);
    }

    #[test]
    fn test_history_is_append_only_and_ordered() {
        let history = RebalanceHistory::new(Arc::new(NoOpDomainEventSink));
        let mut schedule = interval_schedule(RebalanceInterval::Daily);

        for outcome in [
            ProposalOutcome::Skipped,
            ProposalOutcome::Confirmed,
            ProposalOutcome::Skipped,
        ] {
            let fresh = interval_schedule(RebalanceInterval::Daily);
            let proposal = evaluator()
                .evaluate_at(now(), &fresh, &[], &[], &weights(), &[])
                .unwrap();
            history.record(proposal, outcome, &mut schedule);
        }

        let entries = history.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].skipped);
        assert!(entries[1].confirmed);
        assert!(entries[2].skipped);
    }

    #[test]
    fn test_record_emits_resolution_event() {
        let sink = MockDomainEventSink::new();
        let history = RebalanceHistory::new(Arc::new(sink.clone()));
        let mut schedule = interval_schedule(RebalanceInterval::Daily);
        let proposal = evaluator()
            .evaluate_at(now(), &schedule, &[], &[], &weights(), &[])
            .unwrap();
        let proposal_id = proposal.id.to_string();

        history.record(proposal, ProposalOutcome::Confirmed, &mut schedule);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DomainEvent::ProposalResolved {
                proposal_id: id,
                confirmed,
            } => {
                assert_eq!(id, &proposal_id);
                assert!(*confirmed);
            }
            other => panic!("Expected ProposalResolved, got {:?}", other),
        }
    }
}
