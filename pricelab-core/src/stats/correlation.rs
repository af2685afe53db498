//! Pearson correlation matrix.
//!
//! Each cell uses the rows where both columns are finite. Cells with fewer
//! than two such rows, or where either side has zero variance, are `NaN`.
//! Callers must tolerate `NaN` entries.

use serde::Serialize;

use crate::domain::{Column, PriceSeries};

/// Square, symmetric correlation matrix with named axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Cell by index.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Cell by column names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }
}

/// Correlate the raw OHLCV columns of a series.
pub fn correlate(series: &PriceSeries) -> CorrelationMatrix {
    let columns: Vec<(String, Vec<f64>)> = Column::ALL
        .iter()
        .map(|&c| (c.name().to_string(), series.column(c)))
        .collect();
    let borrowed: Vec<(&str, &[f64])> = columns
        .iter()
        .map(|(n, v)| (n.as_str(), v.as_slice()))
        .collect();
    correlate_columns(&borrowed)
}

/// Correlate an arbitrary set of equally long named columns.
pub fn correlate_columns(columns: &[(&str, &[f64])]) -> CorrelationMatrix {
    let k = columns.len();
    let mut values = vec![vec![f64::NAN; k]; k];

    for i in 0..k {
        for j in i..k {
            let r = if i == j {
                if has_variance(columns[i].1) {
                    1.0
                } else {
                    f64::NAN
                }
            } else {
                pearson(columns[i].1, columns[j].1)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        names: columns.iter().map(|(n, _)| n.to_string()).collect(),
        values,
    }
}

fn has_variance(values: &[f64]) -> bool {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    match finite.next() {
        Some(first) => finite.any(|v| v != first),
        None => false,
    }
}

/// Pearson correlation over pairwise-complete observations.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for &(a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
