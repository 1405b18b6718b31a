//! Snapshot export/import: versioning, checksums, and exact continuation.

use serde_json::Value;
use talentsim_core::{
    axis::CapabilityAxis,
    config::SimConfig,
    engine::SimEngine,
    error::SimError,
    snapshot::{Snapshot, SNAPSHOT_VERSION},
};

fn exported_json(years: u32) -> (SimEngine, String) {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = SimConfig { stochastic: true, ..SimConfig::default_test() }.with_seed(31);
    let mut engine = SimEngine::new(config).expect("engine");
    engine.simulate_years(years);
    let json = engine.export_snapshot().expect("export").to_json().expect("to_json");
    (engine, json)
}

fn edit(json: &str, f: impl FnOnce(&mut serde_json::Map<String, Value>)) -> String {
    let mut value: Value = serde_json::from_str(json).expect("parse");
    f(value.as_object_mut().expect("object"));
    serde_json::to_string(&value).expect("serialize")
}

#[test]
fn export_then_import_verifies_checksum() {
    let (engine, json) = exported_json(3);
    let imported = Snapshot::import(&json).expect("import");

    assert!(imported.checksum_valid, "Untouched snapshot must verify");
    assert_eq!(imported.snapshot.version, SNAPSHOT_VERSION);
    assert_eq!(imported.snapshot.state, engine.state());
    assert_eq!(imported.snapshot.history, engine.history());
    assert!(imported.snapshot.exported_at.is_some());
}

#[test]
fn reformatted_snapshot_still_verifies() {
    let (_, json) = exported_json(2);
    let compact = edit(&json, |_| {});
    let imported = Snapshot::import(&compact).expect("import");
    assert!(imported.checksum_valid, "Whitespace and key order must not affect the checksum");
}

#[test]
fn tampered_payload_warns_but_imports() {
    let (_, json) = exported_json(2);
    let tampered = edit(&json, |obj| {
        obj["state"]["total_score"] = Value::from(99.5);
    });
    let imported = Snapshot::import(&tampered).expect("checksum mismatch must not be fatal");
    assert!(!imported.checksum_valid, "Edited state must fail verification");
    assert_eq!(imported.snapshot.state.total_score, 99.5);
}

#[test]
fn missing_checksum_is_reported_invalid() {
    let (_, json) = exported_json(1);
    let stripped = edit(&json, |obj| {
        obj.remove("checksum");
    });
    let imported = Snapshot::import(&stripped).expect("import");
    assert!(!imported.checksum_valid);
}

#[test]
fn missing_version_is_rejected() {
    let (_, json) = exported_json(1);
    let stripped = edit(&json, |obj| {
        obj.remove("version");
    });
    assert!(matches!(Snapshot::import(&stripped), Err(SimError::InvalidSnapshot { .. })));
}

#[test]
fn newer_version_is_rejected() {
    let (_, json) = exported_json(1);
    let future = edit(&json, |obj| {
        obj.insert("version".into(), Value::from(SNAPSHOT_VERSION + 1));
    });
    match Snapshot::import(&future) {
        Err(SimError::UnsupportedSnapshotVersion { found }) => assert_eq!(found, SNAPSHOT_VERSION + 1),
        other => panic!("expected UnsupportedSnapshotVersion, got {other:?}"),
    }
}

#[test]
fn missing_state_or_history_is_rejected() {
    let (_, json) = exported_json(1);
    for field in ["state", "history"] {
        let stripped = edit(&json, |obj| {
            obj.remove(field);
        });
        assert!(
            matches!(Snapshot::import(&stripped), Err(SimError::InvalidSnapshot { .. })),
            "Snapshot without `{field}` must be rejected"
        );
    }
}

#[test]
fn non_object_payload_is_rejected() {
    assert!(matches!(Snapshot::import("[1, 2, 3]"), Err(SimError::InvalidSnapshot { .. })));
    assert!(matches!(Snapshot::import("not json"), Err(SimError::Serialization(_))));
}

#[test]
fn restored_engine_continues_exactly() {
    let (mut original, json) = exported_json(4);
    let imported = Snapshot::import(&json).expect("import");
    let mut restored = SimEngine::restore(SimConfig::default_test(), &imported.snapshot)
        .expect("restore");

    assert_eq!(restored.year(), 4);
    assert_eq!(restored.state(), original.state(), "Restored state must match at the cut");

    original.simulate_years(5);
    restored.simulate_years(5);
    assert_eq!(
        restored.history(),
        original.history(),
        "Restored engine diverged after continuing"
    );
}

#[test]
fn restore_rejects_unknown_cohorts() {
    let (_, json) = exported_json(1);
    let mut snapshot = Snapshot::import(&json).expect("import").snapshot;
    snapshot.state.cohorts[0].id = "made_up".into();
    match SimEngine::restore(SimConfig::default_test(), &snapshot) {
        Err(SimError::UnknownCohort { id }) => assert_eq!(id, "made_up"),
        other => panic!("expected UnknownCohort, got {:?}", other.map(|e| e.year())),
    }
}

#[test]
fn restore_rejects_duplicate_cohorts() {
    let (_, json) = exported_json(1);
    let mut snapshot = Snapshot::import(&json).expect("import").snapshot;
    snapshot.state.cohorts[1] = snapshot.state.cohorts[0].clone();
    assert!(
        matches!(
            SimEngine::restore(SimConfig::default_test(), &snapshot),
            Err(SimError::InvalidSnapshot { .. })
        ),
        "A repeated cohort id must not restore"
    );
}

#[test]
fn restore_rejects_missing_cohorts() {
    let (_, json) = exported_json(1);
    let mut snapshot = Snapshot::import(&json).expect("import").snapshot;
    snapshot.state.cohorts.pop();
    assert!(matches!(
        SimEngine::restore(SimConfig::default_test(), &snapshot),
        Err(SimError::InvalidSnapshot { .. })
    ));
}

#[test]
fn restore_rejects_incomplete_skill_maps() {
    let (_, json) = exported_json(1);
    let mut snapshot = Snapshot::import(&json).expect("import").snapshot;
    snapshot.state.cohorts[3].skills.remove(&CapabilityAxis::Finance);
    assert!(
        matches!(
            SimEngine::restore(SimConfig::default_test(), &snapshot),
            Err(SimError::InvalidSnapshot { .. })
        ),
        "A cohort without every axis must not restore"
    );
}

#[test]
fn restore_rejects_negative_skill_spread() {
    let (_, json) = exported_json(1);
    let mut snapshot = Snapshot::import(&json).expect("import").snapshot;
    if let Some(skill) = snapshot.state.cohorts[0].skills.get_mut(&CapabilityAxis::Energy) {
        skill.std = -1.0;
    }
    assert!(matches!(
        SimEngine::restore(SimConfig::default_test(), &snapshot),
        Err(SimError::InvalidSnapshot { .. })
    ));
}
