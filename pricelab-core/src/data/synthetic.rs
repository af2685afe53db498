//! Synthetic data provider for offline runs and tests.
//!
//! Produces a random walk from a starting price of 100.0, seeded from the
//! symbol name so the same request always yields the same bars. These bars are
//! clearly fake and are tagged `DataSource::Synthetic`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;

use super::provider::{DataError, DataProvider, DataSource, RawBar};
use crate::rng::SeedHierarchy;

#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    weekdays_only: bool,
}

impl SyntheticProvider {
    /// One bar per calendar day (crypto-style, trades every day).
    pub fn new() -> Self {
        Self::default()
    }

    /// One bar per weekday (equity-style calendar).
    pub fn weekdays_only() -> Self {
        Self {
            weekdays_only: true,
        }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        Ok(generate_bars(symbol, start, end, self.weekdays_only))
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn generate_bars(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    weekdays_only: bool,
) -> Vec<RawBar> {
    let mut rng = SeedHierarchy::new(0).rng_for("synthetic", symbol.as_bytes());

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if weekdays_only && matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();

        bars.push(RawBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}
