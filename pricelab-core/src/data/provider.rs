//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, the
//! synthetic generator) so the fetcher can swap implementations and tests can
//! count calls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily OHLCV bar from a data provider, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Structured error types for data operations.
///
/// Displayable as-is in CLI output; the fetcher turns every one of these into
/// an empty series plus a warning instead of aborting the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("data error: {0}")]
    Other(String),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Synthetic,
    Cache,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DataSource::YahooFinance => "yahoo",
            DataSource::Synthetic => "synthetic",
            DataSource::Cache => "cache",
        })
    }
}

/// Trait for data providers.
///
/// Implementations handle the specifics of one source. The cache sits above
/// this trait; providers don't know about it.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Which source tag results from this provider carry.
    fn source(&self) -> DataSource;

    /// Fetch daily OHLCV bars for a symbol over an inclusive date range.
    ///
    /// Bars may come back unordered or with duplicate dates; the fetcher
    /// normalizes them.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<RawBar>, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}
