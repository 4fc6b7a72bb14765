use super::*;
use crate::api::ErrorCode;
use crate::fixtures::{DEFAULT_GATE_ID, condition};
use crate::model::Operator;
use std::collections::HashSet;

fn single_gate_emulator() -> QualityGateEmulator {
    QualityGateEmulator::with_baseline(vec![
        QualityGateBuilder::new()
            .id("G1047")
            .name("Base")
            .is_default(true)
            .build(),
    ])
}

fn coverage(error: &str) -> ConditionSpec {
    ConditionSpec::new("new_coverage", Operator::LessThan, error)
}

// =============================================================================
// list / show
// =============================================================================

#[tokio::test]
async fn list_reports_every_gate_and_the_default_id() {
    let emulator = QualityGateEmulator::new();
    let list = emulator.list().await;
    assert_eq!(list.qualitygates.len(), 3);
    assert_eq!(list.default, DEFAULT_GATE_ID);
    assert!(!list.actions.create);
}

#[tokio::test]
async fn list_omits_conditions_and_carries_actions() {
    let emulator = QualityGateEmulator::new();
    let json = serde_json::to_value(emulator.list().await).unwrap();
    for gate in json["qualitygates"].as_array().unwrap() {
        assert!(gate.get("conditions").is_none());
        assert!(gate.get("actions").is_some());
    }
}

#[tokio::test]
async fn list_actions_follow_admin_flag() {
    let emulator = QualityGateEmulator::new();
    emulator.set_is_admin(true).await;
    let list = emulator.list().await;
    assert!(list.actions.create);

    let built_in = list.qualitygates.iter().find(|g| g.is_built_in).unwrap();
    assert!(!built_in.actions.rename);
    assert!(!built_in.actions.delete);
    assert!(built_in.actions.copy);

    let default = list.qualitygates.iter().find(|g| g.is_default).unwrap();
    assert!(!default.actions.set_as_default);
    assert!(default.actions.delete);
}

#[tokio::test]
async fn list_default_falls_back_when_no_gate_is_default() {
    let emulator = QualityGateEmulator::with_baseline(vec![QualityGateBuilder::new().id("A").build()]);
    assert_eq!(emulator.list().await.default, "1");
}

#[tokio::test]
async fn show_returns_conditions_without_default_flag() {
    let emulator = QualityGateEmulator::new();
    let show = emulator.show(DEFAULT_GATE_ID).await;
    let gate = show.gate.expect("default gate should exist");
    assert_eq!(gate.name, "SonarSource way");
    assert_eq!(gate.conditions.len(), 8);

    let json = serde_json::to_value(emulator.show(DEFAULT_GATE_ID).await).unwrap();
    assert!(json.get("isDefault").is_none());
}

#[tokio::test]
async fn show_unknown_gate_is_silent() {
    let emulator = QualityGateEmulator::new();
    emulator.set_is_admin(true).await;
    let show = emulator.show("missing").await;
    assert!(show.gate.is_none());
    assert!(show.actions.rename);
    assert!(show.actions.delete);
}

// =============================================================================
// create / destroy
// =============================================================================

#[tokio::test]
async fn create_appends_gate_with_no_conditions() {
    let emulator = QualityGateEmulator::new();
    let created = emulator.create("Foo").await;
    assert_eq!(created.name, "Foo");

    let list = emulator.list().await;
    let summary = list.qualitygates.iter().find(|g| g.id == created.id).unwrap();
    assert!(!summary.is_default);
    assert!(!summary.is_built_in);

    let shown = emulator.show(&created.id).await.gate.unwrap();
    assert!(shown.conditions.is_empty());
}

#[tokio::test]
async fn create_uses_sequential_ids_from_baseline_size() {
    let emulator = QualityGateEmulator::new();
    assert_eq!(emulator.create("A").await.id, "newId3");
    assert_eq!(emulator.create("B").await.id, "newId4");
}

#[tokio::test]
async fn ids_do_not_collide_after_delete_and_recreate() {
    let emulator = QualityGateEmulator::new();
    let first = emulator.create("A").await;
    let second = emulator.create("B").await;
    emulator.destroy(&first.id).await;
    let third = emulator.create("C").await;

    assert_ne!(third.id, second.id);
    let ids: HashSet<String> = emulator.snapshot().await.into_iter().map(|g| g.id).collect();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn sequential_ids_skip_ids_present_in_baseline() {
    let emulator = QualityGateEmulator::with_baseline(vec![QualityGateBuilder::new().id("newId1").build()]);
    let created = emulator.create("Other").await;
    assert_eq!(created.id, "newId2");
}

#[tokio::test]
async fn random_ids_are_unique() {
    let emulator = QualityGateEmulator::new().with_id_strategy(IdStrategy::Random);
    let a = emulator.create("A").await;
    let b = emulator.create("B").await;
    assert_ne!(a.id, b.id);
    assert!(!a.id.starts_with("newId"));
}

#[tokio::test]
async fn destroy_removes_gate_and_ignores_unknown_ids() {
    let emulator = QualityGateEmulator::new();
    emulator.destroy(DEFAULT_GATE_ID).await;
    assert_eq!(emulator.snapshot().await.len(), 2);

    emulator.destroy("missing").await;
    assert_eq!(emulator.snapshot().await.len(), 2);
}

// =============================================================================
// copy / rename / set_as_default
// =============================================================================

#[tokio::test]
async fn copy_of_unknown_gate_names_the_id() {
    let emulator = QualityGateEmulator::new();
    let err = emulator.copy("nope", "Copy").await.unwrap_err();
    assert_eq!(err, QualityGateError::GateNotFound("nope".into()));
    assert!(err.to_string().contains("nope"));
    assert_eq!(err.error_code(), "E_GATE_NOT_FOUND");
}

#[tokio::test]
async fn copy_clones_conditions_and_clears_flags() {
    let emulator = QualityGateEmulator::new();
    let built_in = emulator.built_in_quality_gate().await;
    let copied = emulator.copy(&built_in.id, "Copy").await.unwrap();

    let gates = emulator.snapshot().await;
    let copy = gates.iter().find(|g| g.id == copied.id).unwrap();
    assert_ne!(copy.id, built_in.id);
    assert_eq!(copy.name, "Copy");
    assert_eq!(copy.conditions, built_in.conditions);
    assert!(!copy.is_default);
    assert!(!copy.is_built_in);
}

#[tokio::test]
async fn copy_of_default_gate_is_not_default() {
    let emulator = single_gate_emulator();
    let created = emulator.create("New").await;
    assert_eq!(emulator.list().await.qualitygates.len(), 2);

    let copied = emulator.copy("G1047", "Base Copy").await.unwrap();
    assert_ne!(copied.id, "G1047");
    assert_ne!(copied.id, created.id);

    let gates = emulator.snapshot().await;
    let copy = gates.iter().find(|g| g.id == copied.id).unwrap();
    assert!(!copy.is_default);
    assert!(copy.conditions.is_empty());
    assert_eq!(emulator.list().await.default, "G1047");
}

#[tokio::test]
async fn rename_changes_only_the_name() {
    let emulator = QualityGateEmulator::new();
    let before = emulator.default_quality_gate().await;
    let renamed = emulator.rename(&before.id, "Renamed").await.unwrap();
    assert_eq!(renamed.name, "Renamed");

    let after = emulator.default_quality_gate().await;
    assert_eq!(after.name, "Renamed");
    assert_eq!(after.id, before.id);
    assert_eq!(after.conditions, before.conditions);
    assert_eq!(after.is_default, before.is_default);
    assert_eq!(after.is_built_in, before.is_built_in);
}

#[tokio::test]
async fn rename_unknown_gate_fails() {
    let emulator = QualityGateEmulator::new();
    let err = emulator.rename("missing", "X").await.unwrap_err();
    assert_eq!(err.to_string(), "No quality gate has been found for id missing");
}

#[tokio::test]
async fn set_as_default_leaves_exactly_one_default() {
    let emulator = QualityGateEmulator::new();
    emulator.set_as_default("AWBWEMe4qGAMGEYPjJlr").await.unwrap();

    let gates = emulator.snapshot().await;
    let defaults: Vec<&str> = gates.iter().filter(|g| g.is_default).map(|g| g.id.as_str()).collect();
    assert_eq!(defaults, vec!["AWBWEMe4qGAMGEYPjJlr"]);
    assert_eq!(emulator.list().await.default, "AWBWEMe4qGAMGEYPjJlr");
}

#[tokio::test]
async fn set_as_default_unknown_gate_keeps_current_default() {
    let emulator = QualityGateEmulator::new();
    assert!(emulator.set_as_default("missing").await.is_err());
    assert_eq!(emulator.default_quality_gate().await.id, DEFAULT_GATE_ID);
}

// =============================================================================
// conditions
// =============================================================================

#[tokio::test]
async fn create_condition_appends_with_gate_scoped_id() {
    let emulator = single_gate_emulator();
    let created = emulator.create_condition("G1047", coverage("80")).await.unwrap();
    assert_eq!(created.id, "condIdG10470");
    assert_eq!(created.op, Operator::LessThan);

    let second = emulator.create_condition("G1047", coverage("90")).await.unwrap();
    assert_ne!(second.id, created.id);

    let shown = emulator.show("G1047").await.gate.unwrap();
    assert_eq!(shown.conditions, vec![created, second]);
}

#[tokio::test]
async fn create_condition_on_unknown_gate_fails() {
    let emulator = QualityGateEmulator::new();
    let err = emulator.create_condition("missing", coverage("80")).await.unwrap_err();
    assert_eq!(err, QualityGateError::GateNotFound("missing".into()));
}

#[tokio::test]
async fn update_condition_mutates_in_place() {
    let emulator = QualityGateEmulator::new();
    let spec = ConditionSpec::new("new_bugs", Operator::GreaterThan, "0");
    let updated = emulator.update_condition("AXJMbIUHPAOIsUIE3eOF", spec).await.unwrap();
    assert_eq!(updated, condition("AXJMbIUHPAOIsUIE3eOF", "new_bugs", Operator::GreaterThan, "0"));

    let built_in = emulator.built_in_quality_gate().await;
    assert!(built_in.conditions.contains(&updated));
}

#[tokio::test]
async fn update_unknown_condition_fails() {
    let emulator = QualityGateEmulator::new();
    let err = emulator.update_condition("missing", coverage("1")).await.unwrap_err();
    assert_eq!(err.to_string(), "No condition has been found for id missing");
    assert_eq!(err.error_code(), "E_CONDITION_NOT_FOUND");
}

#[tokio::test]
async fn delete_condition_removes_it_from_every_gate() {
    let emulator = QualityGateEmulator::new();
    let built_in = emulator.built_in_quality_gate().await;
    emulator.copy(&built_in.id, "Copy").await.unwrap();

    emulator.delete_condition("AXJMbIUHPAOIsUIE3eOF").await;

    let gates = emulator.snapshot().await;
    assert!(
        gates
            .iter()
            .all(|g| g.conditions.iter().all(|c| c.id != "AXJMbIUHPAOIsUIE3eOF"))
    );
    let copy = gates.iter().find(|g| g.name == "Copy").unwrap();
    assert_eq!(copy.conditions.len(), 5);
}

#[tokio::test]
async fn delete_unknown_condition_is_noop() {
    let emulator = QualityGateEmulator::new();
    let before = emulator.snapshot().await;
    emulator.delete_condition("missing").await;
    assert_eq!(emulator.snapshot().await, before);
}

// =============================================================================
// isolation / reset
// =============================================================================

#[tokio::test]
async fn mutating_a_response_does_not_leak_into_state() {
    let emulator = QualityGateEmulator::new();
    let mut show = emulator.show(DEFAULT_GATE_ID).await;
    if let Some(gate) = show.gate.as_mut() {
        gate.name = "Tampered".into();
        gate.conditions.clear();
    }

    let fresh = emulator.show(DEFAULT_GATE_ID).await.gate.unwrap();
    assert_eq!(fresh.name, "SonarSource way");
    assert_eq!(fresh.conditions.len(), 8);
}

#[tokio::test]
async fn reset_restores_baseline_and_is_idempotent() {
    let emulator = QualityGateEmulator::new();
    emulator.set_is_admin(true).await;
    emulator.create("Extra").await;
    emulator.rename(DEFAULT_GATE_ID, "Renamed").await.unwrap();
    emulator.delete_condition("AXJMbIUGPAOIsUIE3eNC").await;

    emulator.reset().await;
    assert_eq!(emulator.snapshot().await, emulator.baseline());
    assert!(!emulator.is_admin().await);

    emulator.reset().await;
    assert_eq!(emulator.snapshot().await, emulator.baseline());
}

#[tokio::test]
async fn reset_rewinds_id_sequence() {
    let emulator = QualityGateEmulator::new();
    let first = emulator.create("A").await;
    emulator.reset().await;
    assert_eq!(emulator.create("A").await.id, first.id);
}

#[tokio::test]
async fn mutations_never_touch_the_baseline() {
    let emulator = QualityGateEmulator::new();
    let pristine = fixtures::default_baseline(DEFAULT_GATE_ID);
    emulator.update_condition("AXJMbIUGPAOIsUIE3eNC", coverage("1")).await.unwrap();
    emulator.destroy("AWBWEMe4qGAMGEYPjJlr").await;
    assert_eq!(emulator.baseline(), pristine.as_slice());
}

// =============================================================================
// fallbacks / searches
// =============================================================================

#[tokio::test]
async fn fallback_gates_when_none_match() {
    let emulator = QualityGateEmulator::with_baseline(Vec::new());
    let default = emulator.default_quality_gate().await;
    assert!(default.is_default);
    let built_in = emulator.built_in_quality_gate().await;
    assert!(built_in.is_built_in);
}

#[tokio::test]
async fn corrupted_gate_name_matches_seed() {
    let emulator = QualityGateEmulator::new();
    let name = emulator.corrupted_quality_gate_name();
    assert!(emulator.snapshot().await.iter().any(|g| g.name == name));
}

#[tokio::test]
async fn searches_return_empty_results() {
    let emulator = QualityGateEmulator::new();
    assert!(emulator.search_users("Sonar way", None).await.users.is_empty());
    assert!(emulator.search_groups("Sonar way", Some("adm")).await.groups.is_empty());
    let projects = emulator.search_projects("Sonar way", None).await;
    assert_eq!(projects, SearchProjectsResponse::empty());
}

// =============================================================================
// condition ids / deferred delivery
// =============================================================================

fn assert_condition_ids_unique(gates: &[QualityGate]) {
    let ids: Vec<&str> = gates
        .iter()
        .flat_map(|g| g.conditions.iter().map(|c| c.id.as_str()))
        .collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate condition ids: {ids:?}");
}

#[tokio::test]
async fn condition_ids_do_not_collide_after_delete_and_recreate() {
    let emulator = single_gate_emulator();
    let first = emulator.create_condition("G1047", coverage("80")).await.unwrap();
    let second = emulator.create_condition("G1047", coverage("85")).await.unwrap();
    emulator.delete_condition(&first.id).await;
    let third = emulator.create_condition("G1047", coverage("90")).await.unwrap();

    assert_ne!(third.id, second.id);
    let gates = emulator.snapshot().await;
    assert_eq!(gates[0].conditions.len(), 2);
    assert_condition_ids_unique(&gates);
}

#[tokio::test]
async fn condition_ids_skip_candidates_owned_by_a_prefix_sharing_gate() {
    let emulator = QualityGateEmulator::with_baseline(vec![
        QualityGateBuilder::new().id("X").build(),
        QualityGateBuilder::new().id("X1").build(),
    ]);
    let on_x1 = emulator.create_condition("X1", coverage("80")).await.unwrap();
    assert_eq!(on_x1.id, "condIdX10");

    for _ in 0..11 {
        emulator.create_condition("X", coverage("80")).await.unwrap();
    }

    let gates = emulator.snapshot().await;
    let on_x: Vec<&str> = gates[0].conditions.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(on_x.len(), 11);
    assert!(!on_x.contains(&"condIdX10"));
    assert!(on_x.contains(&"condIdX11"));
    assert_eq!(on_x.last(), Some(&"condIdX12"));

    let extra = emulator.create_condition("X1", coverage("90")).await.unwrap();
    assert_ne!(extra.id, on_x1.id);
    assert_condition_ids_unique(&emulator.snapshot().await);
}

#[tokio::test]
async fn failed_create_condition_does_not_consume_an_id() {
    let emulator = single_gate_emulator();
    assert!(emulator.create_condition("missing", coverage("80")).await.is_err());
    let created = emulator.create_condition("G1047", coverage("80")).await.unwrap();
    assert_eq!(created.id, "condIdG10470");
}

#[tokio::test(flavor = "current_thread")]
async fn operations_resolve_on_a_later_scheduler_turn() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let emulator = QualityGateEmulator::new();

    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });
    emulator.list().await;
    assert!(ran.load(Ordering::SeqCst), "list resolved without yielding");

    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });
    assert!(emulator.copy("missing", "Copy").await.is_err());
    assert!(ran.load(Ordering::SeqCst), "rejected copy resolved without yielding");
}
