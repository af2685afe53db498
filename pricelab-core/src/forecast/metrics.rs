//! Held-out scoring.

use serde::Serialize;

use super::{Dataset, ForecastError, RegressionModel, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    /// Mean squared error.
    pub mse: f64,
    /// Coefficient of determination. Negative when the line does worse than
    /// predicting the test mean.
    pub r2: f64,
    pub tested_on: usize,
}

/// Score `model` on `test`.
///
/// When the test targets are constant (`ss_tot == 0`) R² is `1.0` for a
/// perfect fit and `0.0` otherwise.
pub fn evaluate(model: &RegressionModel, test: &Dataset) -> Result<Evaluation> {
    let n = test.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    let nf = n as f64;
    let mean_y = test.ys().sum::<f64>() / nf;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for s in test.samples() {
        ss_res += (s.y - model.predict(s.x)).powi(2);
        ss_tot += (s.y - mean_y).powi(2);
    }

    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(Evaluation {
        mse: ss_res / nf,
        r2,
        tested_on: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{fit, prepare};
    use crate::indicators::{assert_approx, make_series};

    fn flat(value: f64) -> RegressionModel {
        RegressionModel {
            slope: 0.0,
            intercept: value,
            trained_on: 2,
        }
    }

    #[test]
    fn perfect_fit_scores_one() {
        let ds = prepare(&make_series(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        let model = fit(&ds).unwrap();
        let eval = evaluate(&model, &ds).unwrap();
        assert_approx(eval.mse, 0.0, 1e-12);
        assert_approx(eval.r2, 1.0, 1e-9);
        assert_eq!(eval.tested_on, 4);
    }

    #[test]
    fn mse_by_hand() {
        let ds = prepare(&make_series(&[1.0, 3.0])).unwrap();
        // residuals -1 and +1
        let eval = evaluate(&flat(2.0), &ds).unwrap();
        assert_approx(eval.mse, 1.0, 1e-12);
        assert_approx(eval.r2, 0.0, 1e-12);
    }

    #[test]
    fn r2_can_be_negative() {
        let ds = prepare(&make_series(&[1.0, 3.0])).unwrap();
        let eval = evaluate(&flat(10.0), &ds).unwrap();
        assert!(eval.r2 < 0.0);
    }

    #[test]
    fn constant_targets() {
        let ds = prepare(&make_series(&[5.0, 5.0, 5.0])).unwrap();
        assert_eq!(evaluate(&flat(5.0), &ds).unwrap().r2, 1.0);
        assert_eq!(evaluate(&flat(6.0), &ds).unwrap().r2, 0.0);
    }

    #[test]
    fn empty_test_set_fails() {
        assert!(matches!(
            evaluate(&flat(1.0), &Dataset::default()),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
