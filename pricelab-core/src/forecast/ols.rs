//! Single-regressor ordinary least squares.

use serde::Serialize;

use super::{Dataset, ForecastError, Result};

/// Fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
    /// Number of samples the line was fitted on.
    pub trained_on: usize,
}

impl RegressionModel {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Closed-form OLS fit.
///
/// `x` is centred before accumulating the sums. Timestamps are ~1.7e9, and
/// squaring them uncentred loses most of the mantissa.
pub fn fit(train: &Dataset) -> Result<RegressionModel> {
    let n = train.len();
    if n < 2 {
        return Err(ForecastError::InsufficientData { needed: 2, got: n });
    }

    let nf = n as f64;
    let mean_x = train.xs().sum::<f64>() / nf;
    let mean_y = train.ys().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for s in train.samples() {
        let dx = s.x - mean_x;
        sxx += dx * dx;
        sxy += dx * (s.y - mean_y);
    }

    // every sample on the same timestamp
    if sxx == 0.0 {
        return Err(ForecastError::InsufficientData { needed: 2, got: 1 });
    }

    let slope = sxy / sxx;
    Ok(RegressionModel {
        slope,
        intercept: mean_y - slope * mean_x,
        trained_on: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{prepare, timestamp_of, Sample};
    use crate::indicators::{assert_approx, make_series};
    use chrono::NaiveDate;

    #[test]
    fn recovers_an_exact_line() {
        // +2 per day
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let ds = prepare(&make_series(&closes)).unwrap();
        let model = fit(&ds).unwrap();

        assert_approx(model.slope * 86_400.0, 2.0, 1e-9);
        let first = ds.samples()[0];
        assert_approx(model.predict(first.x), 100.0, 1e-6);
        assert_eq!(model.trained_on, 20);
    }

    #[test]
    fn flat_prices_give_zero_slope() {
        let ds = prepare(&make_series(&[50.0; 5])).unwrap();
        let model = fit(&ds).unwrap();
        assert_approx(model.slope, 0.0, 1e-15);
        assert_approx(model.intercept, 50.0, 1e-9);
    }

    #[test]
    fn fewer_than_two_rows_fails() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let ds = Dataset::from_samples(vec![Sample {
            date,
            x: timestamp_of(date),
            y: 1.0,
        }]);
        assert_eq!(
            fit(&ds).unwrap_err(),
            ForecastError::InsufficientData { needed: 2, got: 1 }
        );
        assert!(fit(&Dataset::default()).is_err());
    }

    #[test]
    fn zero_variance_in_x_fails() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sample = Sample {
            date,
            x: timestamp_of(date),
            y: 1.0,
        };
        let ds = Dataset::from_samples(vec![sample, Sample { y: 2.0, ..sample }]);
        assert!(matches!(
            fit(&ds),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
