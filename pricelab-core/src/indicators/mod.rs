//! Derived columns computed from a price series.
//!
//! Indicators are pure functions: series in, equally long numeric column out.
//! Positions without a full lookback window are `NaN`, never backfilled or
//! dropped, so a derived column always lines up 1:1 with its source bars.

pub mod sma;

pub use sma::{rolling_mean, Sma};

use crate::domain::PriceSeries;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Column name used in reports and exports (e.g. "SMA_20").
    fn name(&self) -> &str;

    /// Number of leading positions that are undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole series.
    ///
    /// Returns a `Vec<f64>` of the same length as the series.
    fn compute(&self, series: &PriceSeries) -> Vec<f64>;
}

/// A named column aligned 1:1 with a `PriceSeries`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl DerivedColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of defined (non-NaN) positions.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// True when no position has a value (e.g. window longer than the series).
    pub fn is_undefined(&self) -> bool {
        self.defined_count() == 0
    }
}

/// Create a synthetic series from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    PriceSeries::from_unordered("TEST", bars)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
