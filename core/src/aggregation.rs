//! Capability aggregation — CES combination of cohort skills into one
//! national value per axis, plus a key-person bonus.
//!
//! Axes are aggregated independently; there is no cross-axis term.
//! Results are NOT clamped. Callers clamp to [0, 100] for display.

use crate::{
    axis::{CapabilityAxis, CapabilityVector},
    cohort::Cohort,
    stats,
};

/// Complementarity exponent. Below 1, weak cohorts pull the aggregate
/// down more than strong cohorts push it up.
pub const CES_ALPHA: f64 = 0.8;

/// Skill floor inside the CES power, keeps 0^α well defined.
pub const CES_SKILL_FLOOR: f64 = 0.01;

/// Scale applied to the key-person term.
pub const KEY_PERSON_RATIO: f64 = 0.05;

/// Weights of mean and minimum axis in the total score.
pub const TOTAL_MEAN_WEIGHT: f64 = 0.6;
pub const TOTAL_MIN_WEIGHT: f64 = 0.4;

/// CES aggregate of the cohorts' means on `axis`, weighted by count.
/// Zero total population ⇒ 0.
pub fn ces_value(cohorts: &[Cohort], axis: CapabilityAxis) -> f64 {
    let total: f64 = cohorts.iter().map(|c| c.count as f64).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = cohorts
        .iter()
        .map(|c| c.count as f64 * c.skill(axis).mean.max(CES_SKILL_FLOOR).powf(CES_ALPHA))
        .sum();
    (weighted / total).powf(1.0 / CES_ALPHA)
}

/// Key-person bonus on `axis`: top-5% contributions normalized by total
/// population and scaled by KEY_PERSON_RATIO. Zero population ⇒ 0.
pub fn key_person_bonus(cohorts: &[Cohort], axis: CapabilityAxis) -> f64 {
    let total: f64 = cohorts.iter().map(|c| c.count as f64).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let contribution: f64 = cohorts
        .iter()
        .map(|c| {
            let skill = c.skill(axis);
            stats::key_person_contribution(skill.mean, skill.std, c.count as f64)
        })
        .sum();
    contribution / total * KEY_PERSON_RATIO
}

pub fn axis_value(cohorts: &[Cohort], axis: CapabilityAxis) -> f64 {
    ces_value(cohorts, axis) + key_person_bonus(cohorts, axis)
}

/// Raw capability vector over all 12 axes.
pub fn aggregate(cohorts: &[Cohort]) -> CapabilityVector {
    CapabilityVector::from_fn(|axis| axis_value(cohorts, axis))
}

/// 0.6 × mean + 0.4 × min. A single weak axis caps overall strength.
pub fn total_score(capability: &CapabilityVector) -> f64 {
    let values = capability.values();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return 0.0;
    }
    TOTAL_MEAN_WEIGHT * stats::mean(&values) + TOTAL_MIN_WEIGHT * min
}

/// Achievement against `target` as a percentage: cosine similarity scaled
/// by the magnitude ratio (capped at 1). Zero magnitude on either side ⇒ 0.
pub fn achievement_rate(current: &CapabilityVector, target: &CapabilityVector) -> f64 {
    let cur_mag = current.magnitude();
    let tgt_mag = target.magnitude();
    if cur_mag <= 0.0 || tgt_mag <= 0.0 {
        return 0.0;
    }
    let dot: f64 = CapabilityAxis::ALL
        .iter()
        .map(|a| current.get(*a) * target.get(*a))
        .sum();
    let cosine = dot / (cur_mag * tgt_mag);
    let ratio = (cur_mag / tgt_mag).min(1.0);
    cosine * ratio * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::registry;

    fn single(mean: f64, count: u64) -> Vec<Cohort> {
        let mut c = registry().remove(0);
        c.count = count;
        for skill in c.skills.values_mut() {
            skill.mean = mean;
            skill.std = 0.0;
        }
        vec![c]
    }

    #[test]
    fn single_cohort_ces_is_its_mean() {
        for (mean, count) in [(37.5, 10), (80.0, 123_456), (1.0, 1)] {
            let cohorts = single(mean, count);
            let v = ces_value(&cohorts, CapabilityAxis::Energy);
            assert!((v - mean).abs() < 1e-9, "expected {mean}, got {v}");
        }
    }

    #[test]
    fn ces_penalizes_imbalance() {
        let mut cohorts = single(20.0, 100);
        cohorts.extend(single(80.0, 100));
        let v = ces_value(&cohorts, CapabilityAxis::Finance);
        assert!(v < 50.0, "CES of 20/80 should sit below the arithmetic mean, got {v}");
    }

    #[test]
    fn empty_population_aggregates_to_zero() {
        assert_eq!(ces_value(&[], CapabilityAxis::Finance), 0.0);
        assert_eq!(key_person_bonus(&[], CapabilityAxis::Finance), 0.0);
    }

    fn with_spread(mean: f64, std: f64, count: u64) -> Vec<Cohort> {
        let mut cohorts = single(mean, count);
        for skill in cohorts[0].skills.values_mut() {
            skill.std = std;
        }
        cohorts
    }

    #[test]
    fn key_person_bonus_adds_the_top_tail() {
        let cohorts = with_spread(60.0, 10.0, 2_000);
        let expected = 60.0 + (60.0 + 1.645 * 10.0) * 0.05 * 2.0 * 0.05;
        let v = axis_value(&cohorts, CapabilityAxis::Innovation);
        assert!((v - expected).abs() < 1e-9, "expected {expected}, got {v}");
    }

    #[test]
    fn key_person_bonus_is_normalized_by_population() {
        let mut cohorts = with_spread(40.0, 10.0, 100);
        cohorts.extend(with_spread(60.0, 5.0, 300));
        let expected = ((40.0 + 1.645 * 10.0) * (0.05 * 100.0) * 2.0
            + (60.0 + 1.645 * 5.0) * (0.05 * 300.0) * 2.0)
            / 400.0
            * 0.05;
        let bonus = key_person_bonus(&cohorts, CapabilityAxis::Energy);
        assert!((bonus - expected).abs() < 1e-9, "expected {expected}, got {bonus}");

        // Doubling every count leaves the normalized term unchanged.
        for c in cohorts.iter_mut() {
            c.count *= 2;
        }
        let doubled = key_person_bonus(&cohorts, CapabilityAxis::Energy);
        assert!((doubled - bonus).abs() < 1e-9);
    }

    #[test]
    fn total_score_applies_minimum_penalty() {
        let mut v = CapabilityVector::uniform(60.0);
        let balanced = total_score(&v);
        v.set(CapabilityAxis::Energy, 10.0);
        let skewed = total_score(&v);
        assert!((balanced - 60.0).abs() < 1e-9);
        assert!(skewed < balanced - 20.0, "weak axis should drag score: {skewed}");
    }

    #[test]
    fn achievement_rate_caps_at_hundred() {
        let target = CapabilityVector::uniform(50.0);
        assert!((achievement_rate(&CapabilityVector::uniform(90.0), &target) - 100.0).abs() < 1e-9);
        assert!((achievement_rate(&CapabilityVector::uniform(25.0), &target) - 50.0).abs() < 1e-9);
        assert_eq!(achievement_rate(&CapabilityVector::default(), &target), 0.0);
    }
}
