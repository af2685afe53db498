//! Linear-trend forecasting of the closing price.
//!
//! The model regresses `close` on the bar's UTC-midnight Unix timestamp,
//! scores itself on a seeded held-out split and extrapolates day by day
//! from an anchor date.
//!
//! The free functions ([`prepare`], [`split`], [`fit`], [`evaluate`],
//! [`forecast`]) are pure. [`ForecastModel`] strings them together as a
//! typestate machine so a model cannot forecast before it has been scored.

pub mod anchor;
pub mod dataset;
pub mod metrics;
pub mod model;
pub mod ols;
pub mod split;

pub use anchor::Anchor;
pub use dataset::{prepare, timestamp_of, Dataset, Sample};
pub use metrics::{evaluate, Evaluation};
pub use model::{EvaluatedModel, ForecastConfig, ForecastModel, TrainedModel};
pub use ols::{fit, RegressionModel};
pub use split::split;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("insufficient data: need {needed} rows, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("forecast of {horizon_days} days from {anchor} overflows the calendar")]
    DateOutOfRange {
        anchor: NaiveDate,
        horizon_days: usize,
    },
}

pub type Result<T> = std::result::Result<T, ForecastError>;

/// One predicted close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_close: f64,
}

/// Extrapolate `model` over `horizon_days` consecutive days starting at
/// `anchor_date` (inclusive).
pub fn forecast(
    model: &RegressionModel,
    horizon_days: usize,
    anchor_date: NaiveDate,
) -> Result<Vec<ForecastPoint>> {
    if horizon_days == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    let out_of_range = ForecastError::DateOutOfRange {
        anchor: anchor_date,
        horizon_days,
    };
    // Check the last day up front so a huge horizon fails before allocating.
    let last = (horizon_days - 1) as u64;
    if anchor_date.checked_add_days(Days::new(last)).is_none() {
        return Err(out_of_range);
    }

    (0..horizon_days as u64)
        .map(|i| {
            let date = anchor_date
                .checked_add_days(Days::new(i))
                .ok_or_else(|| out_of_range.clone())?;
            Ok(ForecastPoint {
                date,
                predicted_close: model.predict(timestamp_of(date)),
            })
        })
        .collect()
}
