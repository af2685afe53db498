//! Simple Moving Average (SMA).
//!
//! Rolling mean of one column over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{DerivedColumn, Indicator};
use crate::domain::{Column, PriceSeries};
use crate::error::ValidationError;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    column: Column,
    name: String,
}

impl Sma {
    /// SMA of `column`. A zero period is rejected.
    pub fn new(period: usize, column: Column) -> Result<Self, ValidationError> {
        if period == 0 {
            return Err(ValidationError::ZeroWindow);
        }
        Ok(Self {
            period,
            column,
            name: format!("SMA_{period}"),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        let values = series.column(self.column);
        rolling_mean_values(&values, self.period)
    }
}

/// Rolling mean over a raw slice. `period` must be >= 1.
pub(crate) fn rolling_mean_values(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();

    // Identity: copying keeps W=1 bit-exact with the source.
    if period == 1 {
        return values.to_vec();
    }

    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    // Each window is summed on its own: a running sum drifts once a large
    // or infinite value leaves the window.
    for (i, window) in values.windows(period).enumerate() {
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i + period - 1] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

/// SMA of `column` as a named derived column.
pub fn rolling_mean(
    series: &PriceSeries,
    column: Column,
    window: usize,
) -> Result<DerivedColumn, ValidationError> {
    let sma = Sma::new(window, column)?;
    Ok(DerivedColumn::new(sma.name(), sma.compute(series)))
}
