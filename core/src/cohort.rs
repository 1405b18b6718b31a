//! Cohorts and the fixed cohort registry.
//!
//! A cohort is a homogeneous population segment, never an individual.
//! The full set of 14 cohorts is created once at simulation start and
//! never grows or shrinks; only `count`, demographics and skills mutate.
//!
//! INVARIANTS:
//!   - `count >= COUNT_FLOOR` (a cohort never goes extinct).
//!   - Every capability axis is present in every cohort's skill map.
//!   - Every skill `std >= 0`.

use crate::{
    axis::{CapabilityAxis, Sector, SeniorityTier},
    types::CohortId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest count a cohort may hold after any update.
pub const COUNT_FLOOR: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillDistribution {
    pub mean: f64,
    pub std:  f64,
}

impl SkillDistribution {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std: std.max(0.0) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub id:         CohortId,
    pub sector:     Sector,
    pub tier:       SeniorityTier,
    pub label:      String,
    pub count:      u64,
    pub avg_age:    f64,
    pub avg_tenure: f64,
    /// Years a member is expected to stay before moving on or leaving.
    pub max_tenure: f64,
    /// Age at which new entrants join this cohort.
    pub entry_age:  f64,
    pub skills:     BTreeMap<CapabilityAxis, SkillDistribution>,
}

impl Cohort {
    pub fn skill(&self, axis: CapabilityAxis) -> SkillDistribution {
        self.skills
            .get(&axis)
            .copied()
            .unwrap_or(SkillDistribution { mean: 0.0, std: 0.0 })
    }

    /// Skill profile new entrants arrive with: the registry baseline.
    /// Falls back to the cohort's current skills for ids not in the registry.
    pub fn entry_profile(&self) -> BTreeMap<CapabilityAxis, SkillDistribution> {
        registry_spec(&self.id)
            .map(CohortSpec::skills)
            .unwrap_or_else(|| self.skills.clone())
    }
}

/// Static description of one registry cohort.
#[derive(Debug)]
pub struct CohortSpec {
    pub id:         &'static str,
    pub sector:     Sector,
    pub tier:       SeniorityTier,
    pub label:      &'static str,
    pub count:      u64,
    pub avg_age:    f64,
    pub avg_tenure: f64,
    pub max_tenure: f64,
    pub entry_age:  f64,
    /// Skill mean on every axis not listed in `strengths`.
    pub base_skill: f64,
    pub skill_std:  f64,
    pub strengths:  &'static [(CapabilityAxis, f64)],
}

impl CohortSpec {
    pub fn skills(&self) -> BTreeMap<CapabilityAxis, SkillDistribution> {
        CapabilityAxis::ALL
            .iter()
            .map(|axis| {
                let mean = self
                    .strengths
                    .iter()
                    .find(|(a, _)| a == axis)
                    .map(|(_, m)| *m)
                    .unwrap_or(self.base_skill);
                (*axis, SkillDistribution::new(mean, self.skill_std))
            })
            .collect()
    }

    pub fn build(&self) -> Cohort {
        Cohort {
            id:         self.id.to_string(),
            sector:     self.sector,
            tier:       self.tier,
            label:      self.label.to_string(),
            count:      self.count,
            avg_age:    self.avg_age,
            avg_tenure: self.avg_tenure,
            max_tenure: self.max_tenure,
            entry_age:  self.entry_age,
            skills:     self.skills(),
        }
    }
}

use CapabilityAxis::*;
use SeniorityTier::*;

pub static COHORT_REGISTRY: [CohortSpec; 14] = [
    // ── University ─────────────────────────────────────────────
    CohortSpec {
        id: "uni_bachelor", sector: Sector::University, tier: Junior,
        label: "Undergraduate students", count: 130_000,
        avg_age: 20.5, avg_tenure: 1.5, max_tenure: 4.0, entry_age: 18.0,
        base_skill: 35.0, skill_std: 14.0,
        strengths: &[(BasicScience, 45.0), (Education, 40.0), (DigitalAi, 42.0)],
    },
    CohortSpec {
        id: "uni_master", sector: Sector::University, tier: Junior,
        label: "Master's students", count: 30_000,
        avg_age: 23.5, avg_tenure: 1.0, max_tenure: 2.0, entry_age: 22.0,
        base_skill: 42.0, skill_std: 12.0,
        strengths: &[(BasicScience, 55.0), (AppliedTechnology, 48.0), (DigitalAi, 50.0)],
    },
    CohortSpec {
        id: "uni_doctoral", sector: Sector::University, tier: Junior,
        label: "Doctoral students", count: 6_000,
        avg_age: 27.0, avg_tenure: 1.5, max_tenure: 3.0, entry_age: 24.0,
        base_skill: 48.0, skill_std: 12.0,
        strengths: &[(BasicScience, 68.0), (Innovation, 55.0), (DigitalAi, 55.0)],
    },
    CohortSpec {
        id: "uni_faculty", sector: Sector::University, tier: Senior,
        label: "Professors and faculty", count: 12_000,
        avg_age: 50.0, avg_tenure: 15.0, max_tenure: 30.0, entry_age: 32.0,
        base_skill: 55.0, skill_std: 10.0,
        strengths: &[(BasicScience, 78.0), (Education, 75.0), (Innovation, 62.0), (Succession, 60.0)],
    },
    // ── Industry ───────────────────────────────────────────────
    CohortSpec {
        id: "ind_junior", sector: Sector::Industry, tier: Junior,
        label: "Junior engineers", count: 100_000,
        avg_age: 27.0, avg_tenure: 3.0, max_tenure: 8.0, entry_age: 22.0,
        base_skill: 45.0, skill_std: 12.0,
        strengths: &[(AppliedTechnology, 55.0), (Manufacturing, 52.0), (DigitalAi, 55.0)],
    },
    CohortSpec {
        id: "ind_mid", sector: Sector::Industry, tier: Mid,
        label: "Mid-career engineers", count: 65_000,
        avg_age: 37.0, avg_tenure: 8.0, max_tenure: 15.0, entry_age: 30.0,
        base_skill: 52.0, skill_std: 12.0,
        strengths: &[(AppliedTechnology, 65.0), (Manufacturing, 62.0), (Implementation, 60.0), (Finance, 52.0)],
    },
    CohortSpec {
        id: "ind_senior", sector: Sector::Industry, tier: Senior,
        label: "Senior engineers", count: 27_000,
        avg_age: 47.0, avg_tenure: 15.0, max_tenure: 20.0, entry_age: 38.0,
        base_skill: 58.0, skill_std: 10.0,
        strengths: &[(AppliedTechnology, 72.0), (Manufacturing, 68.0), (GlobalCompetitiveness, 62.0), (Implementation, 66.0)],
    },
    CohortSpec {
        id: "ind_executive", sector: Sector::Industry, tier: Senior,
        label: "Executives", count: 5_000,
        avg_age: 55.0, avg_tenure: 7.0, max_tenure: 12.0, entry_age: 48.0,
        base_skill: 60.0, skill_std: 10.0,
        strengths: &[(Finance, 72.0), (GlobalCompetitiveness, 70.0), (PolicyMaking, 55.0), (Succession, 58.0)],
    },
    // ── Government ─────────────────────────────────────────────
    CohortSpec {
        id: "gov_junior", sector: Sector::Government, tier: Junior,
        label: "Junior officials", count: 30_000,
        avg_age: 28.0, avg_tenure: 4.0, max_tenure: 10.0, entry_age: 22.0,
        base_skill: 45.0, skill_std: 12.0,
        strengths: &[(PolicyMaking, 52.0), (Implementation, 50.0)],
    },
    CohortSpec {
        id: "gov_mid", sector: Sector::Government, tier: Mid,
        label: "Mid-level officials", count: 15_000,
        avg_age: 40.0, avg_tenure: 12.0, max_tenure: 15.0, entry_age: 32.0,
        base_skill: 52.0, skill_std: 12.0,
        strengths: &[(PolicyMaking, 62.0), (Implementation, 60.0), (Finance, 52.0)],
    },
    CohortSpec {
        id: "gov_senior", sector: Sector::Government, tier: Senior,
        label: "Senior officials", count: 5_000,
        avg_age: 52.0, avg_tenure: 7.0, max_tenure: 12.0, entry_age: 45.0,
        base_skill: 58.0, skill_std: 10.0,
        strengths: &[(PolicyMaking, 72.0), (Implementation, 66.0), (Succession, 60.0)],
    },
    // ── Research ───────────────────────────────────────────────
    CohortSpec {
        id: "res_postdoc", sector: Sector::Research, tier: Junior,
        label: "Postdoctoral researchers", count: 3_000,
        avg_age: 32.0, avg_tenure: 2.0, max_tenure: 5.0, entry_age: 28.0,
        base_skill: 52.0, skill_std: 12.0,
        strengths: &[(BasicScience, 70.0), (Innovation, 62.0), (DigitalAi, 58.0)],
    },
    CohortSpec {
        id: "res_researcher", sector: Sector::Research, tier: Mid,
        label: "Staff researchers", count: 22_000,
        avg_age: 42.0, avg_tenure: 10.0, max_tenure: 20.0, entry_age: 33.0,
        base_skill: 56.0, skill_std: 12.0,
        strengths: &[(BasicScience, 74.0), (Innovation, 68.0), (Energy, 56.0), (AppliedTechnology, 58.0)],
    },
    CohortSpec {
        id: "res_principal", sector: Sector::Research, tier: Senior,
        label: "Principal investigators", count: 10_000,
        avg_age: 52.0, avg_tenure: 10.0, max_tenure: 15.0, entry_age: 42.0,
        base_skill: 60.0, skill_std: 10.0,
        strengths: &[(BasicScience, 80.0), (Innovation, 74.0), (Succession, 58.0)],
    },
];

/// Fresh cohorts from the registry, in registry order.
pub fn registry() -> Vec<Cohort> {
    COHORT_REGISTRY.iter().map(CohortSpec::build).collect()
}

pub fn registry_spec(id: &str) -> Option<&'static CohortSpec> {
    COHORT_REGISTRY.iter().find(|s| s.id == id)
}

pub fn total_population(cohorts: &[Cohort]) -> u64 {
    cohorts.iter().map(|c| c.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_totals_460k_across_four_sectors() {
        let cohorts = registry();
        assert_eq!(cohorts.len(), 14);
        assert_eq!(total_population(&cohorts), 460_000);
        for sector in Sector::ALL {
            assert!(
                cohorts.iter().any(|c| c.sector == sector),
                "sector {} has no cohorts",
                sector.key()
            );
        }
    }

    #[test]
    fn every_cohort_has_every_axis() {
        for cohort in registry() {
            for axis in CapabilityAxis::ALL {
                assert!(cohort.skills.contains_key(&axis), "{} missing {}", cohort.id, axis.key());
            }
        }
    }

    #[test]
    fn registry_ids_are_unique() {
        let cohorts = registry();
        for (i, a) in cohorts.iter().enumerate() {
            assert!(cohorts[i + 1..].iter().all(|b| b.id != a.id), "duplicate id {}", a.id);
        }
    }

    #[test]
    fn registry_starts_inside_expected_tenure() {
        for cohort in registry() {
            assert!(
                cohort.avg_tenure < cohort.max_tenure,
                "{} starts with tenure {} at or past its expected {}",
                cohort.id,
                cohort.avg_tenure,
                cohort.max_tenure
            );
        }
    }
}
