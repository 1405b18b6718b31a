//! Population dynamics — demographic projection and the enrollment /
//! graduation cascade that produces yearly inflow per entry cohort.
//!
//! Rates are not validated here. Nonsensical policy inputs propagate as
//! negative or oversized flows without panicking; screening happens in
//! `SimConfig::validate` at construction time only.

use crate::{
    config::{DemographicTable, InflowTarget, PolicyParams},
    types::CalendarYear,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed stage completion rates. Not policy-controlled.
pub const BACHELOR_GRADUATION_RATE: f64 = 0.90;
pub const MASTER_GRADUATION_RATE: f64 = 0.92;
pub const DOCTORATE_GRADUATION_RATE: f64 = 0.70;

// Destination cohorts of the cascade.
pub const BACHELOR_COHORT: &str = "uni_bachelor";
pub const MASTER_COHORT: &str = "uni_master";
pub const DOCTORAL_COHORT: &str = "uni_doctoral";
pub const ACADEMIA_COHORT: &str = "uni_faculty";
pub const INDUSTRY_ENTRY_COHORT: &str = "ind_junior";
pub const GOVERNMENT_ENTRY_COHORT: &str = "gov_junior";
pub const RESEARCH_ENTRY_COHORT: &str = "res_postdoc";

/// Decline factor for `year`.
///
/// Uses the largest projection year ≤ `year`. Without one, a year past the
/// baseline falls back to `(1 − annual_decline_rate)^elapsed`; anything
/// else is 1.
pub fn decline_factor(
    table: &DemographicTable,
    year: CalendarYear,
    annual_decline_rate: f64,
) -> f64 {
    let projected = table
        .projections
        .iter()
        .filter(|p| p.year <= year)
        .max_by_key(|p| p.year);
    match projected {
        Some(point) => point.factor,
        None if year > table.base_year => {
            (1.0 - annual_decline_rate).powi(year - table.base_year)
        }
        None => 1.0,
    }
}

/// National-scale flows through higher education for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraduateCascade {
    pub decline_factor:       f64,
    pub university_entrants:  f64,
    pub bachelor_graduates:   f64,
    pub master_entrants:      f64,
    pub master_graduates:     f64,
    pub phd_entrants:         f64,
    pub phd_graduates:        f64,
}

impl GraduateCascade {
    /// Bachelor graduates entering the labour market directly.
    pub fn bachelor_leavers(&self) -> f64 {
        self.bachelor_graduates - self.master_entrants
    }

    /// Master graduates entering the labour market directly.
    pub fn master_leavers(&self) -> f64 {
        self.master_graduates - self.phd_entrants
    }
}

pub fn cascade(
    table: &DemographicTable,
    policy: &PolicyParams,
    year: CalendarYear,
) -> GraduateCascade {
    let factor = decline_factor(table, year, policy.annual_decline_rate);
    let university_entrants = table.population_18 * policy.university_enrollment_rate * factor;
    let bachelor_graduates = university_entrants * BACHELOR_GRADUATION_RATE;
    let master_entrants = bachelor_graduates * policy.master_enrollment_rate;
    let master_graduates = master_entrants * MASTER_GRADUATION_RATE;
    let phd_entrants = master_graduates * policy.phd_enrollment_rate;
    let phd_graduates = phd_entrants * DOCTORATE_GRADUATION_RATE;
    GraduateCascade {
        decline_factor: factor,
        university_entrants,
        bachelor_graduates,
        master_entrants,
        master_graduates,
        phd_entrants,
        phd_graduates,
    }
}

/// Annual inflow per destination cohort, scaled to the model population.
pub fn annual_inflows(
    flows: &GraduateCascade,
    policy: &PolicyParams,
    representation_ratio: f64,
) -> BTreeMap<&'static str, f64> {
    let bachelor_out = flows.bachelor_leavers();
    let master_out = flows.master_leavers();
    let phd = flows.phd_graduates;

    [
        (BACHELOR_COHORT, flows.university_entrants),
        (MASTER_COHORT, flows.master_entrants),
        (DOCTORAL_COHORT, flows.phd_entrants),
        (ACADEMIA_COHORT, phd * policy.phd_to_academia),
        (
            INDUSTRY_ENTRY_COHORT,
            bachelor_out * policy.bachelor_to_industry
                + master_out * policy.master_to_industry
                + phd * policy.phd_to_industry,
        ),
        (
            GOVERNMENT_ENTRY_COHORT,
            bachelor_out * policy.bachelor_to_government
                + master_out * policy.master_to_government,
        ),
        (RESEARCH_ENTRY_COHORT, phd * policy.phd_to_research),
    ]
    .into_iter()
    .map(|(id, flow)| (id, flow * representation_ratio))
    .collect()
}

/// Blend target for one destination cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedInflow {
    pub cohort_id:        String,
    pub annual_inflow:    f64,
    pub retention_weight: f64,
    pub target_count:     f64,
}

impl PlannedInflow {
    /// `count × w + target × (1 − w)`: partial replacement, not additive growth.
    pub fn blend(&self, count: f64) -> f64 {
        count * self.retention_weight + self.target_count * (1.0 - self.retention_weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflowPlan {
    pub calendar_year: CalendarYear,
    pub cascade:       GraduateCascade,
    pub inflows:       Vec<PlannedInflow>,
}

impl InflowPlan {
    pub fn for_cohort(&self, id: &str) -> Option<&PlannedInflow> {
        self.inflows.iter().find(|p| p.cohort_id == id)
    }

    pub fn total_annual_inflow(&self) -> f64 {
        self.inflows.iter().map(|p| p.annual_inflow).sum()
    }
}

/// Compute this year's inflow plan. Targets whose cohort receives no
/// cascade flow get an annual inflow of 0.
pub fn plan_inflow(
    table: &DemographicTable,
    targets: &[InflowTarget],
    policy: &PolicyParams,
    year: CalendarYear,
) -> InflowPlan {
    let flows = cascade(table, policy, year);
    let annual = annual_inflows(&flows, policy, table.representation_ratio);
    let inflows = targets
        .iter()
        .map(|t| {
            let annual_inflow = annual.get(t.cohort_id.as_str()).copied().unwrap_or(0.0);
            PlannedInflow {
                cohort_id:        t.cohort_id.clone(),
                annual_inflow,
                retention_weight: t.retention_weight,
                target_count:     annual_inflow * t.intake_years,
            }
        })
        .collect();
    InflowPlan { calendar_year: year, cascade: flows, inflows }
}
