//! Succession scoring — per-sector continuity risk.
//!
//! A sector scores low when its cohorts share a narrow age band, when
//! members are close to the end of their expected tenure, or when senior
//! ranks are thin. All component scores live in [0, 100].

use crate::{
    axis::{Sector, SeniorityTier},
    cohort::Cohort,
};
use serde::{Deserialize, Serialize};

/// Age spread (years) that earns a full age score.
pub const AGE_SPREAD_CAP: f64 = 40.0;
/// Senior share multiplier; a third of the sector in senior tiers scores 100.
pub const MENTOR_MULTIPLIER: f64 = 300.0;

pub const AGE_WEIGHT: f64 = 0.3;
pub const TENURE_WEIGHT: f64 = 0.4;
pub const MENTOR_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorSuccession {
    pub sector:       Sector,
    pub age_score:    f64,
    pub tenure_score: f64,
    pub mentor_score: f64,
    pub score:        f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessionReport {
    pub sectors: Vec<SectorSuccession>,
    /// Unweighted mean across sectors that have members.
    pub overall: f64,
}

/// Score one sector. Returns None when the sector has no cohorts.
pub fn score_sector(cohorts: &[Cohort], sector: Sector) -> Option<SectorSuccession> {
    let members: Vec<&Cohort> = cohorts.iter().filter(|c| c.sector == sector).collect();
    if members.is_empty() {
        return None;
    }

    let oldest = members.iter().map(|c| c.avg_age).fold(f64::MIN, f64::max);
    let youngest = members.iter().map(|c| c.avg_age).fold(f64::MAX, f64::min);
    let age_score = (oldest - youngest).clamp(0.0, AGE_SPREAD_CAP) / AGE_SPREAD_CAP * 100.0;

    let total: f64 = members.iter().map(|c| c.count as f64).sum();
    let tenure_score = if total > 0.0 {
        members
            .iter()
            .map(|c| c.count as f64 * tenure_margin(c))
            .sum::<f64>()
            / total
            * 100.0
    } else {
        0.0
    };

    let senior: f64 = members
        .iter()
        .filter(|c| c.tier == SeniorityTier::Senior)
        .map(|c| c.count as f64)
        .sum();
    let mentor_score = if total > 0.0 {
        (senior / total * MENTOR_MULTIPLIER).min(100.0)
    } else {
        0.0
    };

    let score = AGE_WEIGHT * age_score + TENURE_WEIGHT * tenure_score + MENTOR_WEIGHT * mentor_score;
    Some(SectorSuccession { sector, age_score, tenure_score, mentor_score, score })
}

/// Remaining share of expected tenure, clamped to [0, 1].
fn tenure_margin(cohort: &Cohort) -> f64 {
    if cohort.max_tenure <= 0.0 {
        return 0.0;
    }
    ((cohort.max_tenure - cohort.avg_tenure) / cohort.max_tenure).clamp(0.0, 1.0)
}

pub fn score(cohorts: &[Cohort]) -> SuccessionReport {
    let sectors: Vec<SectorSuccession> = Sector::ALL
        .iter()
        .filter_map(|s| score_sector(cohorts, *s))
        .collect();
    let overall = if sectors.is_empty() {
        0.0
    } else {
        sectors.iter().map(|s| s.score).sum::<f64>() / sectors.len() as f64
    };
    SuccessionReport { sectors, overall }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::registry;

    #[test]
    fn registry_scores_are_bounded() {
        let report = score(&registry());
        assert_eq!(report.sectors.len(), 4);
        assert!((0.0..=100.0).contains(&report.overall));
        for s in &report.sectors {
            for v in [s.age_score, s.tenure_score, s.mentor_score, s.score] {
                assert!((0.0..=100.0).contains(&v), "{:?} out of range", s.sector);
            }
        }
    }

    #[test]
    fn thin_senior_ranks_lower_the_score() {
        let cohorts = registry();
        let base = score_sector(&cohorts, Sector::Government).unwrap();
        let mut thinned = cohorts.clone();
        for c in thinned.iter_mut() {
            if c.sector == Sector::Government && c.tier == SeniorityTier::Senior {
                c.count = 10;
            }
        }
        let after = score_sector(&thinned, Sector::Government).unwrap();
        assert!(after.mentor_score < base.mentor_score);
        assert!(after.score < base.score);
    }

    #[test]
    fn exhausted_tenure_scores_zero_margin() {
        let mut cohorts = registry();
        for c in cohorts.iter_mut() {
            c.avg_tenure = c.max_tenure + 5.0;
        }
        let report = score(&cohorts);
        assert!(report.sectors.iter().all(|s| s.tenure_score == 0.0));
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(score(&[]).overall, 0.0);
    }
}
