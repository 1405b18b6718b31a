//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SeededRandom instances derived
//! from the 32-bit master seed stored in the run configuration.
//!
//! Each pipeline stage gets its own stream for each simulated year,
//! seeded deterministically from (master_seed, stage index, year). This means:
//!   - Adding a new stage never changes existing stages' streams.
//!   - A run restored from a snapshot continues with the exact streams
//!     an uninterrupted run would have used.
//!   - Concurrent runs never share a generator.

use crate::types::{Seed, Year};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Re-draw cap for `truncated_gaussian` before falling back to clamping.
pub const TRUNCATED_GAUSSIAN_ATTEMPTS: u32 = 100;

/// A seeded PCG generator with the sampling helpers the model needs.
///
/// Preconditions (caller contract, checked only in debug builds):
///   - `pick` and `weighted_choice` require a non-empty slice.
///   - `int` requires `min <= max`.
///
/// Violating them is a bug in the caller; release builds do not guard.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed:  Seed,
    inner: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed as u64),
        }
    }

    /// Seed from the wall clock (seconds since the UNIX epoch, low 32 bits).
    pub fn from_time() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(secs as u32)
    }

    /// Internal constructor for derived streams, which need the full 64-bit space.
    fn derived(seed: Seed, stream_seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(stream_seed),
        }
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Uniform float in [0.0, 1.0).
    pub fn next(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform float in [min, max).
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    /// Uniform integer in [min, max], both ends inclusive.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(min <= max, "int() called with min > max");
        let span = (max - min + 1) as f64;
        min + (self.next() * span).floor() as i64
    }

    /// Box–Muller transform over two uniform draws.
    pub fn gaussian(&mut self, mean: f64, std: f64) -> f64 {
        let u1 = self.next().max(1e-12);
        let u2 = self.next();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + z * std
    }

    /// Gaussian restricted to [min, max]. Re-draws up to
    /// TRUNCATED_GAUSSIAN_ATTEMPTS times, then clamps the last draw.
    pub fn truncated_gaussian(&mut self, mean: f64, std: f64, min: f64, max: f64) -> f64 {
        let mut value = mean;
        for _ in 0..TRUNCATED_GAUSSIAN_ATTEMPTS {
            value = self.gaussian(mean, std);
            if (min..=max).contains(&value) {
                return value;
            }
        }
        value.clamp(min, max)
    }

    /// In-place Fisher–Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.int(0, i as i64) as usize;
            items.swap(i, j);
        }
    }

    /// Uniformly pick one element. `items` must be non-empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        debug_assert!(!items.is_empty(), "pick() called on an empty slice");
        let idx = self.int(0, items.len() as i64 - 1) as usize;
        &items[idx]
    }

    /// Pick one element with probability proportional to its weight.
    /// `items` must be non-empty and the same length as `weights`.
    pub fn weighted_choice<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> &'a T {
        debug_assert!(!items.is_empty(), "weighted_choice() called on an empty slice");
        debug_assert_eq!(items.len(), weights.len());
        let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return self.pick(items);
        }
        let mut roll = self.next() * total;
        for (item, w) in items.iter().zip(weights) {
            roll -= w.max(0.0);
            if roll < 0.0 {
                return item;
            }
        }
        &items[items.len() - 1]
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next() < p
    }
}

/// Per-stage generators for a single run, indexed by stable slot.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: Seed,
}

impl RngBank {
    pub fn new(master_seed: Seed) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> Seed {
        self.master_seed
    }

    /// The stream for `slot` during simulated year `year`.
    pub fn for_stage(&self, slot: StageSlot, year: Year) -> SeededRandom {
        let derived = (self.master_seed as u64)
            ^ (slot as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ (year as u64).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        SeededRandom::derived(self.master_seed, derived)
    }
}

/// Stable stage slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stage's stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StageSlot {
    Transition = 0,
    Growth = 1,
    // Add new stages here — append only.
}

impl StageSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transition => "transition",
            Self::Growth => "growth",
        }
    }
}
