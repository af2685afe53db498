//! Equal-width histogram over one column.

use serde::Serialize;

use crate::domain::{Column, PriceSeries};

/// Bin counts over `[min, max]`. Bin `i` covers
/// `[min + i*width, min + (i+1)*width)`; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: Column,
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    fn empty(column: Column) -> Self {
        Self {
            column,
            min: f64::NAN,
            max: f64::NAN,
            counts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bin_width(&self) -> f64 {
        if self.counts.is_empty() {
            return f64::NAN;
        }
        (self.max - self.min) / self.counts.len() as f64
    }

    /// `(lower, upper, count)` for each bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        let width = self.bin_width();
        self.counts.iter().enumerate().map(move |(i, &count)| {
            let lower = self.min + width * i as f64;
            (lower, lower + width, count)
        })
    }
}

/// Histogram of `column` with `bins` equal-width bins.
///
/// Non-finite values are ignored. No finite values, or `bins == 0`, gives an
/// empty histogram.
pub fn histogram(series: &PriceSeries, column: Column, bins: usize) -> Histogram {
    let values: Vec<f64> = series
        .column(column)
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() || bins == 0 {
        return Histogram::empty(column);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut counts = vec![0usize; bins];
    let range = max - min;

    for v in values {
        let idx = if range == 0.0 {
            0
        } else {
            (((v - min) * bins as f64 / range) as usize).min(bins - 1)
        };
        counts[idx] += 1;
    }

    Histogram {
        column,
        min,
        max,
        counts,
    }
}
