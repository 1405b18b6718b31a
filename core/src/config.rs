use crate::{
    axis::{CapabilityVector, Investments, Sector},
    cohort::registry_spec,
    error::{SimError, SimResult},
    types::{CalendarYear, Seed},
};
use serde::{Deserialize, Serialize};

// ── Policy parameters ──────────────────────────────────────────────

/// Enrollment, progression and demographic assumptions.
/// Replaced wholesale between steps; never mutated inside one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    /// Share of 18-year-olds entering university.
    pub university_enrollment_rate: f64,
    /// Share of bachelor graduates continuing to a master's.
    pub master_enrollment_rate:     f64,
    /// Share of master graduates continuing to a doctorate.
    pub phd_enrollment_rate:        f64,
    pub phd_to_academia:            f64,
    pub phd_to_industry:            f64,
    pub phd_to_research:            f64,
    pub bachelor_to_industry:       f64,
    pub bachelor_to_government:     f64,
    pub master_to_industry:         f64,
    pub master_to_government:       f64,
    /// Fallback yearly shrink of the 18-year-old population.
    pub annual_decline_rate:        f64,
    /// Years added to the retirement age. Each year cuts retirement
    /// probabilities by 10%.
    pub retirement_age_extension:   f64,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            university_enrollment_rate: 0.57,
            master_enrollment_rate:     0.30,
            phd_enrollment_rate:        0.20,
            phd_to_academia:            0.30,
            phd_to_industry:            0.40,
            phd_to_research:            0.30,
            bachelor_to_industry:       0.75,
            bachelor_to_government:     0.10,
            master_to_industry:         0.80,
            master_to_government:       0.10,
            annual_decline_rate:        0.012,
            retirement_age_extension:   0.0,
        }
    }
}

impl PolicyParams {
    fn rates(&self) -> [(&'static str, f64); 11] {
        [
            ("university_enrollment_rate", self.university_enrollment_rate),
            ("master_enrollment_rate", self.master_enrollment_rate),
            ("phd_enrollment_rate", self.phd_enrollment_rate),
            ("phd_to_academia", self.phd_to_academia),
            ("phd_to_industry", self.phd_to_industry),
            ("phd_to_research", self.phd_to_research),
            ("bachelor_to_industry", self.bachelor_to_industry),
            ("bachelor_to_government", self.bachelor_to_government),
            ("master_to_industry", self.master_to_industry),
            ("master_to_government", self.master_to_government),
            ("annual_decline_rate", self.annual_decline_rate),
        ]
    }
}

// ── Demographics ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year:   CalendarYear,
    pub factor: f64,
}

/// Baseline-year demographic table. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicTable {
    pub base_year:            CalendarYear,
    /// Size of the 18-year-old age cohort in the base year.
    pub population_18:        f64,
    /// Fraction of national flows represented by the model population.
    pub representation_ratio: f64,
    /// Sparse year → decline factor projection.
    pub projections:          Vec<ProjectionPoint>,
}

impl Default for DemographicTable {
    fn default() -> Self {
        Self {
            base_year:            2024,
            population_18:        1_060_000.0,
            representation_ratio: 0.05,
            projections: vec![
                ProjectionPoint { year: 2024, factor: 1.00 },
                ProjectionPoint { year: 2030, factor: 0.93 },
                ProjectionPoint { year: 2035, factor: 0.86 },
                ProjectionPoint { year: 2040, factor: 0.80 },
                ProjectionPoint { year: 2050, factor: 0.70 },
            ],
        }
    }
}

/// How a destination cohort absorbs its demographic inflow.
///
/// `count_next = count × retention_weight + inflow × intake_years × (1 − retention_weight)`.
/// The weights are empirically tuned per cohort type and kept configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflowTarget {
    pub cohort_id:        String,
    pub retention_weight: f64,
    /// Annual intakes the cohort holds at steady state.
    pub intake_years:     f64,
}

impl InflowTarget {
    fn new(cohort_id: &str, retention_weight: f64, intake_years: f64) -> Self {
        Self { cohort_id: cohort_id.into(), retention_weight, intake_years }
    }
}

pub fn default_inflow_targets() -> Vec<InflowTarget> {
    vec![
        InflowTarget::new("uni_bachelor", 0.5, 5.2),
        InflowTarget::new("uni_master", 0.5, 5.3),
        InflowTarget::new("uni_doctoral", 0.5, 5.2),
        InflowTarget::new("uni_faculty", 0.8, 38.0),
        InflowTarget::new("ind_junior", 0.7, 7.0),
        InflowTarget::new("gov_junior", 0.7, 15.0),
        InflowTarget::new("res_postdoc", 0.5, 12.4),
    ]
}

// ── Skill growth ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    /// Skill points per year at full gradient and baseline share, before headroom.
    pub growth_rate:    f64,
    /// Fraction of a skill mean lost per year without investment.
    pub decay_rate:     f64,
    /// Std of the yearly skill noise when stochastic.
    pub noise_std:      f64,
    /// Investment share (percent) that yields exactly `growth_rate`.
    pub baseline_share: f64,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            growth_rate:    3.0,
            decay_rate:     0.01,
            noise_std:      0.5,
            baseline_share: 25.0,
        }
    }
}

// ── Top-level config ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed:           Seed,
    /// Enables transition jitter and skill noise.
    pub stochastic:     bool,
    pub investments:    Investments,
    pub policy:         PolicyParams,
    pub demographics:   DemographicTable,
    pub inflow_targets: Vec<InflowTarget>,
    pub growth:         GrowthParams,
    /// Reference vector for achievement rate and the advisor.
    pub target:         CapabilityVector,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:           42,
            stochastic:     true,
            investments:    Investments::default(),
            policy:         PolicyParams::default(),
            demographics:   DemographicTable::default(),
            inflow_targets: default_inflow_targets(),
            growth:         GrowthParams::default(),
            target:         CapabilityVector::uniform(80.0),
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Deterministic baseline for unit and integration tests.
    pub fn default_test() -> Self {
        Self {
            seed: 12345,
            stochastic: false,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Reject configuration that cannot describe a run.
    ///
    /// Investment totals are deliberately not checked: allocations that
    /// do not sum to 100 are the caller's responsibility.
    pub fn validate(&self) -> SimResult<()> {
        validate_investments(&self.investments)?;
        validate_policy(&self.policy)?;

        if !(self.demographics.population_18 >= 0.0) {
            return Err(invalid("demographics.population_18 must be non-negative"));
        }
        if !(self.demographics.representation_ratio >= 0.0) {
            return Err(invalid("demographics.representation_ratio must be non-negative"));
        }
        for target in &self.inflow_targets {
            if registry_spec(&target.cohort_id).is_none() {
                return Err(SimError::UnknownCohort { id: target.cohort_id.clone() });
            }
            if !(0.0..=1.0).contains(&target.retention_weight) {
                return Err(invalid(format!(
                    "inflow target '{}' retention_weight {} outside [0, 1]",
                    target.cohort_id, target.retention_weight
                )));
            }
            if !(target.intake_years >= 0.0) {
                return Err(invalid(format!(
                    "inflow target '{}' intake_years must be non-negative",
                    target.cohort_id
                )));
            }
        }
        if !(self.growth.baseline_share > 0.0) {
            return Err(invalid("growth.baseline_share must be positive"));
        }
        Ok(())
    }
}

pub fn validate_investments(investments: &Investments) -> SimResult<()> {
    for sector in Sector::ALL {
        let share = investments.get(sector);
        if !(share >= 0.0) || !share.is_finite() {
            return Err(invalid(format!(
                "investment share for {} must be a non-negative number, got {share}",
                sector.key()
            )));
        }
    }
    Ok(())
}

pub fn validate_policy(policy: &PolicyParams) -> SimResult<()> {
    for (name, rate) in policy.rates() {
        if !(0.0..=1.0).contains(&rate) {
            return Err(invalid(format!("policy.{name} = {rate} outside [0, 1]")));
        }
    }
    if !(policy.retirement_age_extension >= 0.0) {
        return Err(invalid("policy.retirement_age_extension must be non-negative"));
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> SimError {
    SimError::InvalidConfig { reason: reason.into() }
}
