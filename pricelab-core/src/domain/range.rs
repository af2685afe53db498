//! Inclusive date range for a fetch request.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Inclusive `[start, end]` date range. `start <= end` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeRepr")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RangeRepr {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RangeRepr> for DateRange {
    type Error = ValidationError;

    fn try_from(repr: RangeRepr) -> Result<Self, Self::Error> {
        Self::new(repr.start, repr.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The dashboard default: the trailing 365 days ending at `today`.
    pub fn trailing_year(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(365),
            end: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, inclusive of both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
