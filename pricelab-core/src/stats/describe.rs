//! Descriptive statistics per column.

use serde::Serialize;

use crate::domain::{Column, PriceSeries};

/// Summary of one numeric column. Non-finite values are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Stats of a column with no usable rows.
    pub fn undefined() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            p50: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.count > 0
    }
}

/// Stats for every raw OHLCV column, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub columns: Vec<(Column, ColumnStats)>,
}

impl DescriptiveStats {
    pub fn get(&self, column: Column) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, s)| s)
    }
}

/// Describe the raw OHLCV columns of a series.
///
/// An empty series yields `count = 0` and `NaN` for everything else.
pub fn describe(series: &PriceSeries) -> DescriptiveStats {
    let columns = Column::ALL
        .iter()
        .map(|&c| (c, describe_values(&series.column(c))))
        .collect();
    DescriptiveStats { columns }
}

/// Describe an arbitrary slice (derived columns, forecast residuals).
pub fn describe_values(values: &[f64]) -> ColumnStats {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return ColumnStats::undefined();
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        f64::NAN
    } else {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    };

    ColumnStats {
        count: n,
        mean,
        std,
        min: sorted[0],
        p25: quantile_sorted(&sorted, 0.25),
        p50: quantile_sorted(&sorted, 0.50),
        p75: quantile_sorted(&sorted, 0.75),
        max: sorted[n - 1],
    }
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
