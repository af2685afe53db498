//! Domain types: bars, series and date ranges.

pub mod bar;
pub mod range;
pub mod series;

pub use bar::{Bar, Column};
pub use range::DateRange;
pub use series::PriceSeries;
