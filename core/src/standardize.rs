//! Cross-axis standardization into deviation scores.
//!
//! The reference mean and std are taken across the 12 axis values of one
//! capability vector (not across cohorts), so every axis lands on a common
//! relative scale: 50 is the national average axis, 10 points is one std.

use crate::{
    axis::{CapabilityAxis, CapabilityVector},
    stats,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStats {
    pub mean: f64,
    pub std:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardized {
    pub scores: CapabilityVector,
    pub stats:  AxisStats,
}

pub fn axis_stats(raw: &CapabilityVector) -> AxisStats {
    let values = raw.values();
    AxisStats {
        mean: stats::mean(&values),
        std:  stats::std_dev(&values),
    }
}

/// Deviation scores for every axis. A flat vector (std = 0) maps to 50 everywhere.
pub fn standardize(raw: &CapabilityVector) -> Standardized {
    let reference = axis_stats(raw);
    let scores = CapabilityVector::from_fn(|axis: CapabilityAxis| {
        stats::to_deviation_score(raw.get(axis), reference.mean, reference.std)
    });
    Standardized { scores, stats: reference }
}

/// Raw value that would produce `score` under `reference`.
pub fn restore_raw(score: f64, reference: &AxisStats) -> f64 {
    stats::from_deviation_score(score, reference.mean, reference.std)
}
