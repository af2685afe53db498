//! Summary statistics over a price series.
//!
//! Every function here is total: an empty or all-`NaN` input produces an
//! empty or undefined result, never an error.

pub mod correlation;
pub mod describe;
pub mod histogram;

pub use correlation::{correlate, correlate_columns, pearson, CorrelationMatrix};
pub use describe::{describe, describe_values, ColumnStats, DescriptiveStats};
pub use histogram::{histogram, Histogram};
