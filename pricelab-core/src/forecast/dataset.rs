//! Regression dataset: one `(timestamp, close)` sample per usable bar.

use chrono::{NaiveDate, NaiveTime};

use super::{ForecastError, Result};
use crate::domain::PriceSeries;

/// UTC-midnight Unix timestamp of `date`, in seconds.
pub fn timestamp_of(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub date: NaiveDate,
    /// Feature: [`timestamp_of`] the date.
    pub x: f64,
    /// Target: closing price.
    pub y: f64,
}

/// Samples in ascending date order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub(super) samples: Vec<Sample>,
}

impl Dataset {
    /// Build from samples in any order; they are sorted by date.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.date);
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.x)
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.y)
    }
}

/// Turn a series into a dataset. Bars without a finite close are skipped.
pub fn prepare(series: &PriceSeries) -> Result<Dataset> {
    let samples: Vec<Sample> = series
        .bars()
        .iter()
        .filter(|b| b.close.is_finite())
        .map(|b| Sample {
            date: b.date,
            x: timestamp_of(b.date),
            y: b.close,
        })
        .collect();

    if samples.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: samples.len(),
        });
    }
    Ok(Dataset::from_samples(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_series;

    #[test]
    fn timestamp_is_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(timestamp_of(date), 1_704_067_200.0);
    }

    #[test]
    fn prepare_keeps_one_sample_per_bar() {
        let ds = prepare(&make_series(&[10.0, 11.0, 12.0])).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.ys().collect::<Vec<_>>(), vec![10.0, 11.0, 12.0]);
        let xs: Vec<f64> = ds.xs().collect();
        assert_eq!(xs[1] - xs[0], 86_400.0);
    }

    #[test]
    fn prepare_skips_nan_closes() {
        let ds = prepare(&make_series(&[10.0, f64::NAN, 12.0])).unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn prepare_needs_two_rows() {
        assert_eq!(
            prepare(&make_series(&[10.0])).unwrap_err(),
            ForecastError::InsufficientData { needed: 2, got: 1 }
        );
        assert_eq!(
            prepare(&PriceSeries::empty("BTC-USD")).unwrap_err(),
            ForecastError::InsufficientData { needed: 2, got: 0 }
        );
    }
}
