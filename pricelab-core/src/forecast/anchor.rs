//! Where a forecast starts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Start date policy for the forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Today's date, regardless of the analyzed range.
    #[default]
    WallClock,
    /// The last date in the analyzed series.
    LastObserved,
}

impl Anchor {
    /// Resolve to a concrete date. `LastObserved` on an empty series falls
    /// back to `today`.
    pub fn resolve(self, last_observed: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
        match self {
            Anchor::WallClock => today,
            Anchor::LastObserved => last_observed.unwrap_or(today),
        }
    }

    /// True when a wall-clock anchor starts after the analyzed range ends,
    /// leaving a gap the forecast silently extrapolates across.
    pub fn is_detached(self, range_end: NaiveDate, today: NaiveDate) -> bool {
        self == Anchor::WallClock && range_end < today
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Anchor::WallClock => "wall-clock",
            Anchor::LastObserved => "last-observed",
        })
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "wall-clock" => Ok(Anchor::WallClock),
            "last-observed" => Ok(Anchor::LastObserved),
            other => Err(format!(
                "unknown anchor '{other}', expected wall-clock or last-observed"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn wall_clock_ignores_the_data() {
        let today = d(2026, 10, 16);
        assert_eq!(Anchor::WallClock.resolve(Some(d(2024, 12, 31)), today), today);
    }

    #[test]
    fn last_observed_uses_the_series_end() {
        let today = d(2026, 10, 16);
        assert_eq!(
            Anchor::LastObserved.resolve(Some(d(2024, 12, 31)), today),
            d(2024, 12, 31)
        );
        assert_eq!(Anchor::LastObserved.resolve(None, today), today);
    }

    #[test]
    fn detached_only_for_wall_clock_on_past_ranges() {
        let today = d(2026, 10, 16);
        assert!(Anchor::WallClock.is_detached(d(2024, 12, 31), today));
        assert!(!Anchor::WallClock.is_detached(today, today));
        assert!(!Anchor::LastObserved.is_detached(d(2024, 12, 31), today));
    }

    #[test]
    fn parses_cli_and_config_spellings() {
        assert_eq!("wall-clock".parse::<Anchor>(), Ok(Anchor::WallClock));
        assert_eq!("last_observed".parse::<Anchor>(), Ok(Anchor::LastObserved));
        assert_eq!("Last-Observed".parse::<Anchor>(), Ok(Anchor::LastObserved));
        assert!("tomorrow".parse::<Anchor>().is_err());
        assert_eq!(Anchor::default(), Anchor::WallClock);
    }
}
