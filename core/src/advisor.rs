//! Optimization advisor — a heuristic reallocation of the sector budget
//! toward a target capability vector.
//!
//! This is a gradient proxy, not a solver: one pass, no convergence.

use crate::{
    axis::{CapabilityAxis, CapabilityVector, Investments, Sector},
    growth,
};
use serde::{Deserialize, Serialize};

/// Share of the suggestion in the blended allocation; the rest is the current one.
pub const SUGGESTION_WEIGHT: f64 = 0.8;

/// Largest-gap thresholds for the confidence tiers.
pub const HIGH_CONFIDENCE_GAP: f64 = 5.0;
pub const MEDIUM_CONFIDENCE_GAP: f64 = 15.0;

/// Number of axes explained in the rationale.
const RATIONALE_AXES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Whole-percent allocation summing to 100.
    pub allocation: Investments,
    pub rationale:  Vec<String>,
    pub confidence: Confidence,
    /// Largest raw gap (target − current) over all axes.
    pub largest_gap: f64,
}

/// Gap weighted by how far the axis sits below 100. Axes further behind
/// get quadratically more weight.
pub fn weighted_gap(current: f64, target: f64) -> f64 {
    let gap = (target - current).max(0.0);
    let behind = ((100.0 - current) / 100.0).clamp(0.0, 1.0);
    gap * (1.0 + behind * behind)
}

pub fn recommend(
    current: &CapabilityVector,
    target: &CapabilityVector,
    allocation: &Investments,
) -> Recommendation {
    let gaps: Vec<(CapabilityAxis, f64, f64)> = CapabilityAxis::ALL
        .iter()
        .map(|a| {
            let raw = target.get(*a) - current.get(*a);
            (*a, raw, weighted_gap(current.get(*a), target.get(*a)))
        })
        .collect();

    let sector_scores: Vec<(Sector, f64)> = Sector::ALL
        .iter()
        .map(|s| {
            let score = gaps.iter().map(|(a, _, w)| growth::gradient(*s, *a) * w).sum();
            (*s, score)
        })
        .collect();
    let score_total: f64 = sector_scores.iter().map(|(_, v)| v).sum();
    let current_total = allocation.total();

    let mut blended = [0.0f64; 4];
    for (i, (sector, score)) in sector_scores.iter().enumerate() {
        let current_pct = if current_total > 0.0 {
            allocation.get(*sector) / current_total * 100.0
        } else {
            25.0
        };
        let suggested = if score_total > 0.0 {
            score / score_total * 100.0
        } else {
            current_pct
        };
        blended[i] = SUGGESTION_WEIGHT * suggested + (1.0 - SUGGESTION_WEIGHT) * current_pct;
    }

    let rounded = round_to_hundred(&blended);
    let mut result = Investments::all_in(Sector::University);
    for (i, sector) in Sector::ALL.iter().enumerate() {
        result.set(*sector, rounded[i]);
    }

    let largest_gap = gaps.iter().map(|(_, raw, _)| *raw).fold(0.0, f64::max);
    let confidence = if largest_gap < HIGH_CONFIDENCE_GAP {
        Confidence::High
    } else if largest_gap < MEDIUM_CONFIDENCE_GAP {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    Recommendation {
        allocation: result,
        rationale: rationale(&gaps),
        confidence,
        largest_gap,
    }
}

/// Round to whole percents, then move the remainder onto the largest sector.
fn round_to_hundred(values: &[f64; 4]) -> [f64; 4] {
    let mut rounded = values.map(|v| v.round());
    let remainder = 100.0 - rounded.iter().sum::<f64>();
    let largest = rounded
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    rounded[largest] += remainder;
    rounded
}

fn rationale(gaps: &[(CapabilityAxis, f64, f64)]) -> Vec<String> {
    let mut ranked: Vec<&(CapabilityAxis, f64, f64)> =
        gaps.iter().filter(|(_, raw, _)| *raw > 0.0).collect();
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

    if ranked.is_empty() {
        return vec!["All axes meet the target; keeping the current balance.".to_string()];
    }

    ranked
        .into_iter()
        .take(RATIONALE_AXES)
        .map(|(axis, raw, _)| {
            let sector = best_sector(*axis);
            format!(
                "{} is {:.1} points below target; {} investment moves it most.",
                axis.key(),
                raw,
                sector.key()
            )
        })
        .collect()
}

fn best_sector(axis: CapabilityAxis) -> Sector {
    Sector::ALL
        .iter()
        .copied()
        .max_by(|a, b| growth::gradient(*a, axis).total_cmp(&growth::gradient(*b, axis)))
        .unwrap_or(Sector::University)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_sums_to_exactly_hundred() {
        let current = CapabilityVector::from_fn(|a| 30.0 + a as u8 as f64 * 3.3);
        let rec = recommend(&current, &CapabilityVector::uniform(80.0), &Investments::default());
        assert_eq!(rec.allocation.total(), 100.0);
    }

    #[test]
    fn policy_gap_shifts_budget_to_government() {
        let mut current = CapabilityVector::uniform(78.0);
        current.set(CapabilityAxis::PolicyMaking, 20.0);
        current.set(CapabilityAxis::Implementation, 25.0);
        let before = Investments::default();
        let rec = recommend(&current, &CapabilityVector::uniform(80.0), &before);
        assert!(rec.allocation.government > before.government);
        assert_eq!(rec.confidence, Confidence::Low);
        assert!(rec.rationale[0].starts_with("policy_making"));
    }

    #[test]
    fn met_target_keeps_allocation_with_high_confidence() {
        let rec = recommend(
            &CapabilityVector::uniform(90.0),
            &CapabilityVector::uniform(80.0),
            &Investments::default(),
        );
        assert_eq!(rec.allocation, Investments::default());
        assert_eq!(rec.confidence, Confidence::High);
    }
}
