//! Validation errors shared across the pipeline stages.
//!
//! These are raised before any expensive work (network, regression) and are
//! the only errors a caller is expected to surface verbatim to a user.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("start date {start} must not be after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("rolling window must be at least 1")]
    ZeroWindow,

    #[error("forecast horizon must be at least 1 day")]
    ZeroHorizon,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
