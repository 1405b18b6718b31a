//! Capability axes, sectors and the vectors built over them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The 12 fixed dimensions of national capability.
/// Variants are never removed or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityAxis {
    BasicScience,
    AppliedTechnology,
    DigitalAi,
    Manufacturing,
    Finance,
    Energy,
    GlobalCompetitiveness,
    Innovation,
    Education,
    PolicyMaking,
    Implementation,
    Succession,
}

pub const AXIS_COUNT: usize = 12;

impl CapabilityAxis {
    pub const ALL: [CapabilityAxis; AXIS_COUNT] = [
        Self::BasicScience,
        Self::AppliedTechnology,
        Self::DigitalAi,
        Self::Manufacturing,
        Self::Finance,
        Self::Energy,
        Self::GlobalCompetitiveness,
        Self::Innovation,
        Self::Education,
        Self::PolicyMaking,
        Self::Implementation,
        Self::Succession,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::BasicScience          => "basic_science",
            Self::AppliedTechnology     => "applied_technology",
            Self::DigitalAi             => "digital_ai",
            Self::Manufacturing         => "manufacturing",
            Self::Finance               => "finance",
            Self::Energy                => "energy",
            Self::GlobalCompetitiveness => "global_competitiveness",
            Self::Innovation            => "innovation",
            Self::Education             => "education",
            Self::PolicyMaking          => "policy_making",
            Self::Implementation        => "implementation",
            Self::Succession            => "succession",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    University,
    Industry,
    Government,
    Research,
}

impl Sector {
    pub const ALL: [Sector; 4] = [
        Self::University,
        Self::Industry,
        Self::Government,
        Self::Research,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::University => "university",
            Self::Industry   => "industry",
            Self::Government => "government",
            Self::Research   => "research",
        }
    }
}

/// Explicit seniority of a cohort. Senior cohorts count as mentors
/// in succession scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityTier {
    Junior,
    Mid,
    Senior,
}

/// A scalar per capability axis. Missing axes read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityVector(BTreeMap<CapabilityAxis, f64>);

impl CapabilityVector {
    /// Every axis set to `value`.
    pub fn uniform(value: f64) -> Self {
        Self(CapabilityAxis::ALL.iter().map(|a| (*a, value)).collect())
    }

    pub fn from_fn(mut f: impl FnMut(CapabilityAxis) -> f64) -> Self {
        Self(CapabilityAxis::ALL.iter().map(|a| (*a, f(*a))).collect())
    }

    pub fn get(&self, axis: CapabilityAxis) -> f64 {
        self.0.get(&axis).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, axis: CapabilityAxis, value: f64) {
        self.0.insert(axis, value);
    }

    /// Values in canonical axis order.
    pub fn values(&self) -> Vec<f64> {
        CapabilityAxis::ALL.iter().map(|a| self.get(*a)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CapabilityAxis, f64)> + '_ {
        CapabilityAxis::ALL.iter().map(|a| (*a, self.get(*a)))
    }

    pub fn magnitude(&self) -> f64 {
        self.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }
}

/// Percentage of the national talent budget per sector.
///
/// Intended to sum to 100; the engine does not enforce it.
/// Callers validate before handing allocations in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Investments {
    pub university: f64,
    pub industry:   f64,
    pub government: f64,
    pub research:   f64,
}

impl Default for Investments {
    fn default() -> Self {
        Self {
            university: 30.0,
            industry:   35.0,
            government: 15.0,
            research:   20.0,
        }
    }
}

impl Investments {
    /// All budget in one sector.
    pub fn all_in(sector: Sector) -> Self {
        let mut inv = Self {
            university: 0.0,
            industry:   0.0,
            government: 0.0,
            research:   0.0,
        };
        inv.set(sector, 100.0);
        inv
    }

    pub fn get(&self, sector: Sector) -> f64 {
        match sector {
            Sector::University => self.university,
            Sector::Industry   => self.industry,
            Sector::Government => self.government,
            Sector::Research   => self.research,
        }
    }

    pub fn set(&mut self, sector: Sector, value: f64) {
        match sector {
            Sector::University => self.university = value,
            Sector::Industry   => self.industry = value,
            Sector::Government => self.government = value,
            Sector::Research   => self.research = value,
        }
    }

    pub fn total(&self) -> f64 {
        Sector::ALL.iter().map(|s| self.get(*s)).sum()
    }
}
