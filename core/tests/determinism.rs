//! Reproducibility is the contract everything else leans on.
//!
//! Two engines, same seed, same operations: identical histories, to the bit.
//! Any divergence is a blocker.

use talentsim_core::{
    config::SimConfig,
    engine::{HistoryEntry, SimEngine},
    rng::SeededRandom,
};

fn stochastic_engine(seed: u32) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = SimConfig { stochastic: true, ..SimConfig::default_test() }.with_seed(seed);
    SimEngine::new(config).expect("engine")
}

fn assert_same_history(a: &[HistoryEntry], b: &[HistoryEntry]) {
    assert_eq!(a.len(), b.len(), "History lengths differ: {} vs {}", a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert_eq!(x, y, "History diverged at year {i}");
    }
}

#[test]
fn same_seed_produces_identical_histories() {
    const SEED: u32 = 0xDEAD_BEEF;
    let mut engine_a = stochastic_engine(SEED);
    let mut engine_b = stochastic_engine(SEED);

    engine_a.simulate_years(15);
    engine_b.simulate_years(15);

    assert_same_history(&engine_a.history(), &engine_b.history());
    assert_eq!(engine_a.state(), engine_b.state(), "Final states differ");
}

#[test]
fn different_seeds_produce_different_histories() {
    let mut engine_a = stochastic_engine(42);
    let mut engine_b = stochastic_engine(99);

    engine_a.simulate_years(5);
    engine_b.simulate_years(5);

    let any_different = engine_a
        .history()
        .iter()
        .zip(engine_b.history().iter())
        .skip(1)
        .any(|(a, b)| a.total_score != b.total_score);
    assert!(any_different, "Different seeds produced identical runs — seed is not being used");
}

#[test]
fn deterministic_mode_ignores_the_seed() {
    let mut engine_a = SimEngine::new(SimConfig::default_test().with_seed(1)).expect("engine a");
    let mut engine_b = SimEngine::new(SimConfig::default_test().with_seed(2)).expect("engine b");

    engine_a.simulate_years(8);
    engine_b.simulate_years(8);

    assert_same_history(&engine_a.history(), &engine_b.history());
}

#[test]
fn reset_replays_the_same_run() {
    let mut engine = stochastic_engine(777);
    engine.simulate_years(6);
    let first = engine.history();

    let year0 = engine.reset();
    assert_eq!(year0.year, 0, "Reset must return the year-0 entry");
    assert_eq!(engine.history_len(), 1, "Reset must leave only year 0 in history");

    engine.simulate_years(6);
    assert_same_history(&first, &engine.history());
}

#[test]
fn seeded_random_sequences_are_bit_identical() {
    let mut a = SeededRandom::new(2024);
    let mut b = SeededRandom::new(2024);
    for i in 0..1_000 {
        let (x, y) = (a.next(), b.next());
        assert_eq!(x.to_bits(), y.to_bits(), "Draw {i} differs: {x} vs {y}");
    }
    let g1: Vec<u64> = (0..50).map(|_| a.gaussian(0.0, 1.0).to_bits()).collect();
    let g2: Vec<u64> = (0..50).map(|_| b.gaussian(0.0, 1.0).to_bits()).collect();
    assert_eq!(g1, g2, "Gaussian draws diverged");
}
