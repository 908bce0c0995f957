//! Integration tests for intent parsing: the pipeline, the safety gate,
//! the direct device path and confidence scoring.

mod common;

use common::*;
use smarthome_intent::parser::{Action, Unit};
use smarthome_intent::store::GroupingKind;

#[tokio::test]
async fn switches_on_lighting_in_a_room() {
    let h = harness().await;
    let intent = h
        .parser
        .parse("Licht im Wohnzimmer ein")
        .await
        .expect("deterministic intent");

    assert_eq!(intent.action, Action::SetOn);
    assert_eq!(intent.room.as_deref(), Some("Wohnzimmer"));
    assert_eq!(intent.function.as_deref(), Some("Beleuchtung"));
    assert!(intent.confidence >= 0.8);
    assert_eq!(
        intent.state_ids,
        vec![WZ_DECKENLICHT, WZ_STEHLAMPE, WZ_DECKENLAMPE]
    );
}

#[tokio::test]
async fn sets_a_temperature_with_unit() {
    let h = harness().await;
    let intent = h
        .parser
        .parse("Heizung im Schlafzimmer auf 22 Grad")
        .await
        .expect("deterministic intent");

    assert_eq!(intent.action, Action::SetValue);
    assert_eq!(intent.value, Some(22.0));
    assert_eq!(intent.unit, Some(Unit::Degree));
    assert_eq!(intent.state_ids, vec![SZ_HEIZUNG]);
}

#[tokio::test]
async fn direct_device_match_without_any_enum() {
    let h = harness().await;
    let intent = h
        .parser
        .parse("schalte den Standventilator ein")
        .await
        .expect("direct device intent");

    assert_eq!(intent.action, Action::SetOn);
    assert!(intent.room.is_none());
    assert!(intent.function.is_none());
    assert_eq!(intent.device_name.as_deref(), Some("standventilator"));
    assert_eq!(intent.state_ids, vec![VENTILATOR]);
}

#[tokio::test]
async fn safety_gate_blocks_function_only_writes() {
    let h = harness().await;
    // "Licht" matches the lighting function but no room is named; switching
    // would hit every light in the house
    assert!(h.parser.parse("schalte das Licht ein").await.is_none());
}

#[tokio::test]
async fn safety_gate_blocks_room_only_writes() {
    let h = harness().await;
    assert!(h.parser.parse("Wohnzimmer ausschalten").await.is_none());
    assert!(h.parser.parse("mach das Schlafzimmer an").await.is_none());
}

#[tokio::test]
async fn safety_gate_holds_for_every_write_verb() {
    let h = harness().await;
    // one-sided mentions with assorted write verbs must never parse
    let one_sided = [
        "Licht ein",
        "Licht aus",
        "mach das Licht heller",
        "Heizung wärmer",
        "Heizung runter",
        "stelle die Heizung auf 21 Grad",
        "Wohnzimmer ein",
        "Schlafzimmer aus",
        "mach die Küche dunkler",
    ];
    for text in one_sided {
        assert!(
            h.parser.parse(text).await.is_none(),
            "expected no intent for {text:?}"
        );
    }
}

#[tokio::test]
async fn queries_pass_with_one_sided_context() {
    let h = harness().await;
    let intent = h
        .parser
        .parse("Wie warm ist es im Schlafzimmer?")
        .await
        .expect("query intent");

    assert_eq!(intent.action, Action::Query);
    assert_eq!(intent.room.as_deref(), Some("Schlafzimmer"));
    assert!(intent.function.is_none());
    assert!((intent.confidence - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn height_question_reads_instead_of_writing() {
    let h = harness().await;
    let intent = h
        .parser
        .parse("Wie hoch ist die Heizung im Schlafzimmer?")
        .await
        .expect("query intent");
    assert_eq!(intent.action, Action::Query);

    let result = h.executor.execute(&intent).await.expect("readable");
    assert!(result.mutations.is_empty());
    assert!(h.store.recorded_writes().is_empty());
}

#[tokio::test]
async fn confidence_grows_with_function_match_and_caps() {
    let h = harness().await;
    let room_only = h
        .parser
        .parse("Wie warm ist es im Schlafzimmer?")
        .await
        .unwrap();
    let full = h
        .parser
        .parse("Wie warm ist die Heizung im Schlafzimmer?")
        .await
        .unwrap();

    assert!(full.confidence > room_only.confidence);
    assert_eq!(full.confidence, 1.0);
}

#[tokio::test]
async fn device_narrowing_adds_exactly_five_points() {
    let h = harness().await;
    let broad = h.parser.parse("Wie ist es im Büro?").await.unwrap();
    assert!(broad.device_name.is_none());

    let narrowed = h
        .parser
        .parse("Wie ist der Standventilator im Büro?")
        .await
        .unwrap();
    assert_eq!(narrowed.device_name.as_deref(), Some("standventilator"));
    assert_eq!(narrowed.state_ids, vec![VENTILATOR]);
    assert!((narrowed.confidence - broad.confidence - 0.05).abs() < 1e-9);
}

#[tokio::test]
async fn narrows_multi_light_commands_to_named_device() {
    let h = harness().await;
    let intent = h
        .parser
        .parse("schalte die Stehlampe im Wohnzimmer ein")
        .await
        .expect("narrowed intent");

    assert_eq!(intent.action, Action::SetOn);
    assert_eq!(intent.device_name.as_deref(), Some("stehlampe"));
    assert_eq!(intent.state_ids, vec![WZ_STEHLAMPE]);
    assert_eq!(intent.confidence, 1.0);
}

#[tokio::test]
async fn unknown_context_produces_no_intent() {
    let h = harness().await;
    assert!(h.parser.parse("schalte die Sauna im Poolhaus ein").await.is_none());
    assert!(h.parser.parse("erzähl mir einen Witz").await.is_none());
    assert!(h.parser.parse("").await.is_none());
}

#[tokio::test]
async fn context_without_action_produces_no_intent() {
    let h = harness().await;
    assert!(h.parser.parse("Wohnzimmer Beleuchtung").await.is_none());
}

#[tokio::test]
async fn empty_intersection_produces_no_intent() {
    let h = harness().await;
    // kitchen has no heating member, names resolve but nothing remains
    assert!(h
        .parser
        .parse("Heizung in der Küche auf 21 Grad")
        .await
        .is_none());
}

#[tokio::test]
async fn degraded_room_collection_falls_back_to_safety_gate() {
    let store = sample_store().failing_groupings(GroupingKind::Room);
    let h = harness_with(store).await;

    // the function still matches, but without a room the write is blocked
    assert!(h.parser.parse("Licht im Wohnzimmer ein").await.is_none());
}

#[tokio::test]
async fn typo_in_switch_verb_still_parses() {
    let h = harness().await;
    let intent = h
        .parser
        .parse("schlate das Licht im Wohnzimmer ein")
        .await
        .expect("typo-tolerant intent");
    assert_eq!(intent.action, Action::SetOn);
}

#[tokio::test]
async fn value_boundary_follows_range_heuristic() {
    let h = harness().await;
    let degree = h
        .parser
        .parse("stelle die Heizung im Schlafzimmer auf 30")
        .await
        .unwrap();
    assert_eq!(degree.value, Some(30.0));
    assert_eq!(degree.unit, Some(Unit::Degree));

    let percent = h
        .parser
        .parse("stelle die Heizung im Schlafzimmer auf 31")
        .await
        .unwrap();
    assert_eq!(percent.value, Some(31.0));
    assert_eq!(percent.unit, Some(Unit::Percent));
}
