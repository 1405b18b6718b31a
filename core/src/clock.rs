//! Simulation clock — owns the year counter and its calendar mapping.

use crate::types::{CalendarYear, Year};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimClock {
    pub base_year:    CalendarYear,
    pub current_year: Year,
}

impl SimClock {
    pub fn new(base_year: CalendarYear) -> Self {
        Self { base_year, current_year: 0 }
    }

    /// Advance one simulated year. Returns the new year index.
    pub fn advance(&mut self) -> Year {
        self.current_year += 1;
        self.current_year
    }

    pub fn calendar_year(&self) -> CalendarYear {
        self.base_year + self.current_year as CalendarYear
    }

    pub fn reset(&mut self) {
        self.current_year = 0;
    }
}
