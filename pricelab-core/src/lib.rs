//! PriceLab Core: domain types, data retrieval, statistics and forecasting.
//!
//! This crate holds everything that does not touch the filesystem or the
//! terminal:
//! - Domain types (bars, series, date ranges)
//! - Data providers, the series cache and the cache-aware fetcher
//! - Descriptive statistics, correlation, histograms and moving averages
//! - The linear-trend forecast model

pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod indicators;
pub mod rng;
pub mod stats;

pub use error::ValidationError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with the runner are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::DateRange>();
        require_sync::<domain::DateRange>();

        // Data layer
        require_send::<data::SeriesCache>();
        require_sync::<data::SeriesCache>();
        require_send::<data::SeriesFetcher>();
        require_sync::<data::SeriesFetcher>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::FetchOutcome>();
        require_sync::<data::FetchOutcome>();

        // Statistics and forecast
        require_send::<stats::DescriptiveStats>();
        require_sync::<stats::DescriptiveStats>();
        require_send::<stats::CorrelationMatrix>();
        require_sync::<stats::CorrelationMatrix>();
        require_send::<forecast::EvaluatedModel>();
        require_sync::<forecast::EvaluatedModel>();
        require_send::<rng::SeedHierarchy>();
        require_sync::<rng::SeedHierarchy>();
    }

    /// The fetcher works through trait objects so tests can swap providers.
    #[test]
    fn provider_trait_is_object_safe() {
        fn _check(provider: &dyn data::DataProvider) -> &str {
            provider.name()
        }
        let synthetic = data::SyntheticProvider::new();
        assert_eq!(_check(&synthetic), "synthetic");
    }
}
