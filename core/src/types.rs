//! Shared primitive types used across the entire simulation.

/// A simulated year index. Year 0 is the initial state.
pub type Year = u32;

/// A calendar year (e.g. 2024), used for demographic lookups.
pub type CalendarYear = i32;

/// The master seed of a run. Always 32 bits so runs are portable.
pub type Seed = u32;

/// The canonical run identifier.
pub type RunId = String;

/// A stable cohort identifier from the registry (e.g. "ind_junior").
pub type CohortId = String;
