//! talentsim-core: cohort-based national workforce simulation.
//!
//! The engine evolves a fixed registry of population cohorts year by year
//! under a sector investment allocation and policy parameters, and reports
//! a twelve-axis national capability vector plus succession risk.

pub mod advisor;
pub mod aggregation;
pub mod axis;
pub mod clock;
pub mod cohort;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod growth;
pub mod monte_carlo;
pub mod population;
pub mod rng;
pub mod snapshot;
pub mod standardize;
pub mod stats;
pub mod store;
pub mod succession;
pub mod transition;
pub mod types;
