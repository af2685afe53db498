//! Data retrieval: providers, normalization and the process-lifetime cache.

pub mod cache;
pub mod canonicalize;
pub mod circuit_breaker;
pub mod fetcher;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use cache::{CacheKey, SeriesCache};
pub use canonicalize::{normalize, NormalizeReport};
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use fetcher::{FetchIssue, FetchOutcome, SeriesFetcher};
pub use provider::{DataError, DataProvider, DataSource, RawBar};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
