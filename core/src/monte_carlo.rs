//! Monte Carlo — many independent stochastic runs, summarized.
//!
//! RULES:
//!   - Run i is seeded with `base_seed + i` (wrapping) and is always stochastic.
//!   - Every run owns its engine and RNG streams; nothing is shared.
//!   - Results are collected in run-index order, so output does not depend
//!     on how the thread pool schedules runs.
//!   - Progress is advisory and never affects results.

use crate::{
    config::SimConfig,
    engine::SimEngine,
    error::SimResult,
    stats::{self, Summary},
    types::{Seed, Year},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub iterations:     usize,
    pub years:          u32,
    pub base_seed:      Seed,
    /// Notify every this many finished runs. 0 disables progress.
    pub progress_every: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self { iterations: 100, years: 10, base_seed: 42, progress_every: 10 }
    }
}

/// One finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub seed:             Seed,
    pub final_score:      f64,
    pub final_population: u64,
    pub final_succession: f64,
    /// Total score per year, year 0 included.
    pub scores:           Vec<f64>,
}

/// Distribution of total score across runs for one simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearBand {
    pub year: Year,
    pub mean: f64,
    pub p5:   f64,
    pub p50:  f64,
    pub p95:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub config:  MonteCarloConfig,
    /// Final total score of each run, in run-index order.
    pub samples: Vec<f64>,
    pub summary: Summary,
    pub yearly:  Vec<YearBand>,
    pub runs:    Vec<RunOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct McProgress {
    pub completed: usize,
    pub total:     usize,
}

pub type ProgressFn<'a> = &'a (dyn Fn(McProgress) + Sync);

/// Run one stochastic simulation for `years` from `base` with `seed`.
pub fn run_single(base: &SimConfig, seed: Seed, years: u32) -> SimResult<RunOutcome> {
    let config = SimConfig { seed, stochastic: true, ..base.clone() };
    let mut engine = SimEngine::new(config)?;
    engine.simulate_years(years);
    let history = engine.history();
    Ok(RunOutcome {
        seed,
        final_score:      engine.total_score(),
        final_population: engine.total_population(),
        final_succession: engine.succession_score(),
        scores:           history.iter().map(|h| h.total_score).collect(),
    })
}

pub fn run(
    base: &SimConfig,
    mc: &MonteCarloConfig,
    progress: Option<ProgressFn<'_>>,
) -> SimResult<MonteCarloResult> {
    base.validate()?;
    log::info!(
        "monte carlo start: iterations={} years={} base_seed={}",
        mc.iterations,
        mc.years,
        mc.base_seed
    );

    let finished = AtomicUsize::new(0);
    let runs: Vec<RunOutcome> = (0..mc.iterations)
        .into_par_iter()
        .map(|i| {
            let seed = mc.base_seed.wrapping_add(i as Seed);
            let outcome = run_single(base, seed, mc.years);
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(notify) = progress {
                if mc.progress_every > 0 && (done % mc.progress_every == 0 || done == mc.iterations) {
                    notify(McProgress { completed: done, total: mc.iterations });
                }
            }
            outcome
        })
        .collect::<SimResult<Vec<_>>>()?;

    let samples: Vec<f64> = runs.iter().map(|r| r.final_score).collect();
    let summary = stats::summarize(&samples);
    let yearly = year_bands(&runs, mc.years);
    log::info!(
        "monte carlo done: mean={:.2} std={:.2} p5={:.2} p95={:.2}",
        summary.mean,
        summary.std,
        summary.p5,
        summary.p95
    );

    Ok(MonteCarloResult { config: *mc, samples, summary, yearly, runs })
}

fn year_bands(runs: &[RunOutcome], years: u32) -> Vec<YearBand> {
    if runs.is_empty() {
        return Vec::new();
    }
    (0..=years)
        .map(|year| {
            let mut column: Vec<f64> = runs
                .iter()
                .filter_map(|r| r.scores.get(year as usize).copied())
                .collect();
            column.sort_by(|a, b| a.total_cmp(b));
            YearBand {
                year,
                mean: stats::mean(&column),
                p5:   stats::percentile_sorted(&column, 5.0),
                p50:  stats::percentile_sorted(&column, 50.0),
                p95:  stats::percentile_sorted(&column, 95.0),
            }
        })
        .collect()
}
