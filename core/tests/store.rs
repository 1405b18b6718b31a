//! SQLite run log: history and snapshots survive a round trip.

use talentsim_core::{
    config::SimConfig,
    engine::SimEngine,
    snapshot::Snapshot,
    store::SimStore,
};

fn store_with_run(run_id: &str) -> SimStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store.insert_run(run_id, 12345, false, "0.1.0-test").expect("insert run");
    store
}

#[test]
fn history_round_trips_in_year_order() {
    let store = store_with_run("hist");
    let mut engine = SimEngine::new(SimConfig::default_test()).expect("engine");
    engine.simulate_years(4);

    store.append_history("hist", &engine.history()).expect("append");
    let loaded = store.history_for_run("hist").expect("load");
    assert_eq!(loaded, engine.history());

    let series = store.score_series("hist").expect("series");
    assert_eq!(series.len(), 5);
    assert_eq!(series[4], (4, engine.total_score()));
}

#[test]
fn re_appending_a_year_replaces_it() {
    let store = store_with_run("dup");
    let mut engine = SimEngine::new(SimConfig::default_test()).expect("engine");
    engine.simulate_years(2);

    store.append_history("dup", &engine.history()).expect("first append");
    store.append_history("dup", &engine.history()).expect("second append");
    assert_eq!(store.history_for_run("dup").expect("load").len(), 3);
}

#[test]
fn latest_snapshot_is_importable() {
    let store = store_with_run("snap");
    let mut engine = SimEngine::new(SimConfig::default_test()).expect("engine");
    engine.simulate_years(1);
    store.save_snapshot("snap", &engine.export_snapshot().expect("export")).expect("save 1");
    engine.simulate_years(2);
    store.save_snapshot("snap", &engine.export_snapshot().expect("export")).expect("save 2");

    let (year, json) = store.latest_snapshot("snap").expect("query").expect("a snapshot");
    assert_eq!(year, 3);
    let imported = Snapshot::import(&json).expect("import");
    assert!(imported.checksum_valid);
    assert_eq!(imported.snapshot.state.year, 3);
}

#[test]
fn unknown_run_has_no_snapshot() {
    let store = store_with_run("empty");
    assert!(store.latest_snapshot("empty").expect("query").is_none());
    assert!(store.history_for_run("nobody").expect("query").is_empty());
}

#[test]
fn history_requires_a_known_run() {
    let store = SimStore::in_memory().expect("store");
    store.migrate().expect("migration");
    let engine = SimEngine::new(SimConfig::default_test()).expect("engine");
    assert!(
        store.append_history("ghost", &engine.history()).is_err(),
        "Foreign key on run must reject orphan history"
    );
}
