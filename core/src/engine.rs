//! The simulation engine — owns all state and sequences the yearly pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Population dynamics  (inflow plan for the calendar year)
//!   2. Transition engine    (promotion/attrition/retirement + inflow blend)
//!   3. Growth/decay         (ageing, skill growth from investment)
//!   4. Capability aggregation and standardization
//!   5. Succession scoring
//!   6. History entry appended
//!
//! RULES:
//!   - Each stage sees the result of the stages before it this year.
//!   - All randomness flows through the RngBank, one stream per stage and year.
//!   - Numeric degeneracies fall back locally; a year step never fails.
//!   - Callers receive copies of state and history, never references.

use crate::{
    advisor::{self, Recommendation},
    aggregation,
    axis::{CapabilityVector, Investments, AXIS_COUNT},
    clock::SimClock,
    cohort::{self, Cohort},
    config::{PolicyParams, SimConfig},
    error::{SimError, SimResult},
    growth, population,
    rng::{RngBank, StageSlot},
    snapshot::Snapshot,
    standardize::{self, AxisStats},
    succession::{self, SuccessionReport},
    transition::{self, TransitionOutcome, TRANSITION_RULES},
    types::{CalendarYear, Seed, Year},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Full engine state as handed to callers and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub year:             Year,
    pub calendar_year:    CalendarYear,
    pub cohorts:          Vec<Cohort>,
    pub capability:       CapabilityVector,
    pub standardized:     CapabilityVector,
    pub axis_stats:       AxisStats,
    pub total_score:      f64,
    pub investments:      Investments,
    pub policy:           PolicyParams,
    pub total_population: u64,
    pub succession_score: f64,
    pub succession:       SuccessionReport,
    pub seed:             Seed,
    pub stochastic:       bool,
}

/// One simulated year. Appended once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub year:             Year,
    pub calendar_year:    CalendarYear,
    pub capability:       CapabilityVector,
    pub standardized:     CapabilityVector,
    pub total_score:      f64,
    pub succession_score: f64,
    pub total_population: u64,
    pub investments:      Investments,
}

/// Total-score statistics over the engine's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub years:   Year,
    pub average: f64,
    pub min:     f64,
    pub max:     f64,
    /// Last total score minus the first.
    pub growth:  f64,
}

impl RunSummary {
    pub fn from_history(history: &[HistoryEntry]) -> Self {
        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Self::default();
        };
        let scores: Vec<f64> = history.iter().map(|h| h.total_score).collect();
        Self {
            years:   last.year - first.year,
            average: scores.iter().sum::<f64>() / scores.len() as f64,
            min:     scores.iter().copied().fold(f64::INFINITY, f64::min),
            max:     scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            growth:  last.total_score - first.total_score,
        }
    }
}

/// Advisory progress notification for multi-year runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub completed:   u32,
    pub total:       u32,
    pub total_score: f64,
}

pub struct SimEngine {
    config:          SimConfig,
    clock:           SimClock,
    rng_bank:        RngBank,
    cohorts:         Vec<Cohort>,
    investments:     Investments,
    policy:          PolicyParams,
    capability:      CapabilityVector,
    standardized:    CapabilityVector,
    axis_stats:      AxisStats,
    total_score:     f64,
    succession:      SuccessionReport,
    history:         Vec<HistoryEntry>,
    last_transition: TransitionOutcome,
}

impl SimEngine {
    /// Build an engine from validated config and record year 0.
    ///
    /// The seed is a u32; a negative seed in a JSON config is rejected by
    /// deserialization before it reaches here.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut engine = Self {
            clock:           SimClock::new(config.demographics.base_year),
            rng_bank:        RngBank::new(config.seed),
            cohorts:         cohort::registry(),
            investments:     config.investments,
            policy:          config.policy,
            capability:      CapabilityVector::default(),
            standardized:    CapabilityVector::default(),
            axis_stats:      AxisStats { mean: 0.0, std: 0.0 },
            total_score:     0.0,
            succession:      SuccessionReport { sectors: Vec::new(), overall: 0.0 },
            history:         Vec::new(),
            last_transition: TransitionOutcome::default(),
            config,
        };
        engine.recompute();
        engine.record_history();
        log::info!(
            "engine initialised: seed={} stochastic={} population={}",
            engine.config.seed,
            engine.config.stochastic,
            cohort::total_population(&engine.cohorts)
        );
        Ok(engine)
    }

    /// Rebuild an engine from an imported snapshot.
    ///
    /// Static tables (demographics, inflow targets, growth) come from
    /// `config`; everything that evolves comes from the snapshot. The stage
    /// streams are keyed by (seed, year), so the restored engine continues
    /// exactly as the exporting engine would have.
    pub fn restore(config: SimConfig, snapshot: &Snapshot) -> SimResult<Self> {
        config.validate()?;
        let state = &snapshot.state;
        validate_cohorts(&state.cohorts)?;

        let mut clock = SimClock::new(state.calendar_year - state.year as CalendarYear);
        clock.current_year = state.year;
        let mut engine = Self {
            clock,
            rng_bank:        RngBank::new(state.seed),
            cohorts:         state.cohorts.clone(),
            investments:     state.investments,
            policy:          state.policy,
            capability:      CapabilityVector::default(),
            standardized:    CapabilityVector::default(),
            axis_stats:      AxisStats { mean: 0.0, std: 0.0 },
            total_score:     0.0,
            succession:      SuccessionReport { sectors: Vec::new(), overall: 0.0 },
            history:         snapshot.history.clone(),
            last_transition: TransitionOutcome::default(),
            config: SimConfig {
                seed: state.seed,
                stochastic: state.stochastic,
                ..config
            },
        };
        engine.recompute();
        log::info!("engine restored at year {}", engine.clock.current_year);
        Ok(engine)
    }

    /// Advance one simulated year through the fixed pipeline.
    pub fn simulate_year(&mut self) -> HistoryEntry {
        let year = self.clock.advance();
        let calendar_year = self.clock.calendar_year();

        // 1. Population dynamics
        let plan = population::plan_inflow(
            &self.config.demographics,
            &self.config.inflow_targets,
            &self.policy,
            calendar_year,
        );

        // 2. Transitions + inflow blend
        let mut transition_rng = self
            .config
            .stochastic
            .then(|| self.rng_bank.for_stage(StageSlot::Transition, year));
        self.last_transition = transition::apply_transitions(
            &mut self.cohorts,
            TRANSITION_RULES,
            &plan,
            self.policy.retirement_age_extension,
            transition_rng.as_mut(),
        );

        // 3. Growth/decay
        let mut growth_rng = self
            .config
            .stochastic
            .then(|| self.rng_bank.for_stage(StageSlot::Growth, year));
        growth::age_cohorts(&mut self.cohorts);
        growth::apply_growth(
            &mut self.cohorts,
            &self.investments,
            &self.config.growth,
            growth_rng.as_mut(),
        );

        // 4–5. Aggregation, standardization, succession
        self.recompute();

        let entry = self.record_history();
        log::debug!(
            "year={year} ({calendar_year}) total_score={:.2} succession={:.1} population={} \
             promoted={} exited={} retired={} entered={}",
            entry.total_score,
            entry.succession_score,
            entry.total_population,
            self.last_transition.promoted,
            self.last_transition.exited,
            self.last_transition.retired,
            self.last_transition.entered,
        );
        entry
    }

    /// Run `n` years and summarize total score over the whole history.
    pub fn simulate_years(&mut self, n: u32) -> RunSummary {
        self.simulate_years_with_progress(n, 0, |_| {})
    }

    /// Run `n` years, notifying `on_progress` every `every` years and at the
    /// end. `every == 0` disables notifications. Progress never affects results.
    pub fn simulate_years_with_progress(
        &mut self,
        n: u32,
        every: u32,
        mut on_progress: impl FnMut(Progress),
    ) -> RunSummary {
        for done in 1..=n {
            let entry = self.simulate_year();
            if every > 0 && (done % every == 0 || done == n) {
                on_progress(Progress {
                    completed:   done,
                    total:       n,
                    total_score: entry.total_score,
                });
            }
        }
        self.summary()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_history(&self.history)
    }

    /// Replace the investment allocation. Takes effect next year.
    pub fn set_investments(&mut self, investments: Investments) {
        self.investments = investments;
    }

    /// Replace the policy parameters. Takes effect next year.
    pub fn set_policy_params(&mut self, policy: PolicyParams) {
        self.policy = policy;
    }

    /// Reinitialize cohorts, clock and history from the original seed.
    /// Current investments and policy are kept.
    pub fn reset(&mut self) -> HistoryEntry {
        self.clock.reset();
        self.rng_bank = RngBank::new(self.config.seed);
        self.cohorts = cohort::registry();
        self.history.clear();
        self.last_transition = TransitionOutcome::default();
        self.recompute();
        log::info!("engine reset (seed={})", self.config.seed);
        self.record_history()
    }

    // ── Read API (copies only) ─────────────────────────────────────

    pub fn state(&self) -> SimState {
        SimState {
            year:             self.clock.current_year,
            calendar_year:    self.clock.calendar_year(),
            cohorts:          self.cohorts.clone(),
            capability:       self.capability.clone(),
            standardized:     self.standardized.clone(),
            axis_stats:       self.axis_stats,
            total_score:      self.total_score,
            investments:      self.investments,
            policy:           self.policy,
            total_population: cohort::total_population(&self.cohorts),
            succession_score: self.succession.overall,
            succession:       self.succession.clone(),
            seed:             self.config.seed,
            stochastic:       self.config.stochastic,
        }
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.clone()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn latest(&self) -> Option<HistoryEntry> {
        self.history.last().cloned()
    }

    pub fn year(&self) -> Year {
        self.clock.current_year
    }

    pub fn capability(&self) -> CapabilityVector {
        self.capability.clone()
    }

    pub fn standardized(&self) -> CapabilityVector {
        self.standardized.clone()
    }

    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    pub fn succession_score(&self) -> f64 {
        self.succession.overall
    }

    pub fn total_population(&self) -> u64 {
        cohort::total_population(&self.cohorts)
    }

    pub fn last_transition(&self) -> TransitionOutcome {
        self.last_transition.clone()
    }

    pub fn config(&self) -> SimConfig {
        self.config.clone()
    }

    /// Achievement against the configured target vector, in percent.
    pub fn achievement_rate(&self) -> f64 {
        aggregation::achievement_rate(&self.capability, &self.config.target)
    }

    /// Heuristic reallocation toward the configured target.
    pub fn recommend(&self) -> Recommendation {
        advisor::recommend(&self.capability, &self.config.target, &self.investments)
    }

    pub fn export_snapshot(&self) -> SimResult<Snapshot> {
        Snapshot::capture(self.state(), self.history())
    }

    // ── Internals ──────────────────────────────────────────────────

    fn recompute(&mut self) {
        self.capability = aggregation::aggregate(&self.cohorts);
        let standardized = standardize::standardize(&self.capability);
        self.standardized = standardized.scores;
        self.axis_stats = standardized.stats;
        self.total_score = aggregation::total_score(&self.capability);
        self.succession = succession::score(&self.cohorts);
    }

    fn record_history(&mut self) -> HistoryEntry {
        let entry = HistoryEntry {
            year:             self.clock.current_year,
            calendar_year:    self.clock.calendar_year(),
            capability:       self.capability.clone(),
            standardized:     self.standardized.clone(),
            total_score:      self.total_score,
            succession_score: self.succession.overall,
            total_population: cohort::total_population(&self.cohorts),
            investments:      self.investments,
        };
        self.history.push(entry.clone());
        entry
    }
}

/// Cohorts from outside the engine must be exactly the registry set,
/// each with every axis present and no negative std.
fn validate_cohorts(cohorts: &[Cohort]) -> SimResult<()> {
    let mut seen = BTreeSet::new();
    for c in cohorts {
        if cohort::registry_spec(&c.id).is_none() {
            return Err(SimError::UnknownCohort { id: c.id.clone() });
        }
        if !seen.insert(c.id.as_str()) {
            return Err(SimError::InvalidSnapshot {
                reason: format!("cohort '{}' appears more than once", c.id),
            });
        }
    }
    if let Some(missing) = cohort::COHORT_REGISTRY.iter().find(|spec| !seen.contains(spec.id)) {
        return Err(SimError::InvalidSnapshot {
            reason: format!("cohort '{}' is missing", missing.id),
        });
    }
    for c in cohorts {
        if c.skills.len() != AXIS_COUNT {
            return Err(SimError::InvalidSnapshot {
                reason: format!("cohort '{}' has {} skill axes, expected {AXIS_COUNT}", c.id, c.skills.len()),
            });
        }
        if let Some((axis, _)) = c.skills.iter().find(|(_, s)| !(s.std >= 0.0)) {
            return Err(SimError::InvalidSnapshot {
                reason: format!("cohort '{}' has a negative std on {}", c.id, axis.key()),
            });
        }
    }
    Ok(())
}
