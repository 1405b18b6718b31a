//! Skill growth and decay, plus yearly ageing.
//!
//! Investment in a sector raises its cohorts' skills along that sector's
//! gradient row, with diminishing returns as skills approach 100. Every
//! skill also depreciates by a fixed fraction per year.

use crate::{
    axis::{CapabilityAxis, Investments, Sector},
    cohort::Cohort,
    config::GrowthParams,
    rng::SeededRandom,
};

use CapabilityAxis::*;

/// Sector → axis sensitivity. Axes not listed have gradient 0.
/// Shared with the optimization advisor.
pub static SECTOR_GRADIENTS: [(Sector, &[(CapabilityAxis, f64)]); 4] = [
    (
        Sector::University,
        &[
            (BasicScience, 1.0),
            (Education, 1.0),
            (Innovation, 0.6),
            (DigitalAi, 0.5),
            (Succession, 0.5),
            (AppliedTechnology, 0.3),
        ],
    ),
    (
        Sector::Industry,
        &[
            (AppliedTechnology, 1.0),
            (Manufacturing, 1.0),
            (GlobalCompetitiveness, 0.9),
            (DigitalAi, 0.8),
            (Innovation, 0.7),
            (Finance, 0.6),
            (Implementation, 0.6),
            (Energy, 0.5),
        ],
    ),
    (
        Sector::Government,
        &[
            (PolicyMaking, 1.0),
            (Implementation, 1.0),
            (Succession, 0.6),
            (Finance, 0.4),
            (Education, 0.3),
            (Energy, 0.3),
        ],
    ),
    (
        Sector::Research,
        &[
            (Innovation, 1.0),
            (BasicScience, 0.9),
            (DigitalAi, 0.7),
            (Energy, 0.6),
            (AppliedTechnology, 0.6),
        ],
    ),
];

pub fn gradient(sector: Sector, axis: CapabilityAxis) -> f64 {
    SECTOR_GRADIENTS
        .iter()
        .find(|(s, _)| *s == sector)
        .and_then(|(_, row)| row.iter().find(|(a, _)| *a == axis))
        .map(|(_, g)| *g)
        .unwrap_or(0.0)
}

/// Skill change for one cohort on one axis, before noise.
pub fn skill_delta(mean: f64, share: f64, gradient: f64, params: &GrowthParams) -> f64 {
    let headroom = ((100.0 - mean) / 100.0).max(0.0);
    let gain = params.growth_rate * (share / params.baseline_share) * gradient * headroom;
    let decay = params.decay_rate * mean;
    gain - decay
}

/// Apply one year of growth/decay to every cohort's skills. Means are
/// clamped to [0, 100]. `rng` is `Some` only when stochastic.
pub fn apply_growth(
    cohorts: &mut [Cohort],
    investments: &Investments,
    params: &GrowthParams,
    mut rng: Option<&mut SeededRandom>,
) {
    for cohort in cohorts.iter_mut() {
        let share = investments.get(cohort.sector);
        for (axis, skill) in cohort.skills.iter_mut() {
            let mut delta = skill_delta(skill.mean, share, gradient(cohort.sector, *axis), params);
            if let Some(r) = rng.as_deref_mut() {
                delta += r.gaussian(0.0, params.noise_std);
            }
            skill.mean = (skill.mean + delta).clamp(0.0, 100.0);
        }
    }
}

/// Everyone gets a year older and a year more senior in role.
pub fn age_cohorts(cohorts: &mut [Cohort]) {
    for cohort in cohorts.iter_mut() {
        cohort.avg_age += 1.0;
        cohort.avg_tenure += 1.0;
    }
}
