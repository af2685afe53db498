//! SeriesFetcher: cached, normalized, never-panicking series retrieval.
//!
//! Resolution order for a request:
//! 1. Validate the range (rejected before cache or network are touched)
//! 2. Cache hit → return the stored series, no provider call
//! 3. Miss → provider fetch → normalize → cache (even if empty) → return
//!
//! Provider failures never abort the caller. They come back as an empty series
//! with a [`FetchIssue`] attached so every downstream stage degrades the same
//! way it does for a genuinely empty range.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use super::cache::{CacheKey, SeriesCache};
use super::canonicalize::normalize;
use super::provider::{DataError, DataProvider, DataSource};
use crate::domain::{DateRange, PriceSeries};
use crate::error::ValidationError;

/// Why a fetch produced no usable data.
#[derive(Debug, Clone, Error)]
pub enum FetchIssue {
    /// The range holds no bars (weekend-only range, unknown symbol).
    #[error("no data found for the selected range")]
    DataUnavailable,

    /// Transport or provider failure.
    #[error("error fetching data: {0}")]
    FetchFailed(#[from] DataError),
}

/// Result of a fetch: always a series, possibly empty, plus any issue.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub series: Arc<PriceSeries>,
    pub source: DataSource,
    pub issue: Option<FetchIssue>,
}

impl FetchOutcome {
    pub fn is_available(&self) -> bool {
        self.issue.is_none()
    }
}

/// Fetches daily series for one fixed symbol through a shared cache.
pub struct SeriesFetcher {
    symbol: String,
    provider: Arc<dyn DataProvider>,
    cache: Arc<SeriesCache>,
}

impl SeriesFetcher {
    pub fn new(
        symbol: impl Into<String>,
        provider: Arc<dyn DataProvider>,
        cache: Arc<SeriesCache>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            provider,
            cache,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Validate raw dates, then fetch.
    pub fn fetch_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchOutcome, ValidationError> {
        let range = DateRange::new(start, end)?;
        Ok(self.fetch(range))
    }

    /// Fetch the series for `range`.
    pub fn fetch(&self, range: DateRange) -> FetchOutcome {
        let key = CacheKey::new(&self.symbol, range);

        if let Some(series) = self.cache.get(&key) {
            tracing::debug!(symbol = %self.symbol, %range, bars = series.len(), "series cache hit");
            return outcome(series, DataSource::Cache);
        }

        tracing::debug!(
            symbol = %self.symbol,
            %range,
            provider = self.provider.name(),
            "series cache miss"
        );

        match self.provider.fetch(&self.symbol, range.start(), range.end()) {
            Ok(raw) => {
                let (series, report) = normalize(&self.symbol, raw, range);
                if report.void_bars > 0 || report.duplicates > 0 {
                    tracing::debug!(?report, "normalized provider batch");
                }
                tracing::info!(
                    symbol = %self.symbol,
                    %range,
                    bars = series.len(),
                    "fetched series"
                );
                let series = self.cache.put(key, series);
                outcome(series, self.provider.source())
            }
            Err(DataError::SymbolNotFound { symbol }) => {
                tracing::warn!(%symbol, "provider does not recognize symbol");
                let series = self.cache.put(key, PriceSeries::empty(&self.symbol));
                outcome(series, self.provider.source())
            }
            Err(e) => {
                // Not cached: a transient failure must not pin an empty result.
                tracing::warn!(symbol = %self.symbol, %range, error = %e, "series fetch failed");
                FetchOutcome {
                    series: Arc::new(PriceSeries::empty(&self.symbol)),
                    source: self.provider.source(),
                    issue: Some(FetchIssue::FetchFailed(e)),
                }
            }
        }
    }
}

fn outcome(series: Arc<PriceSeries>, source: DataSource) -> FetchOutcome {
    let issue = series.is_empty().then_some(FetchIssue::DataUnavailable);
    FetchOutcome {
        series,
        source,
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::RawBar;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingProvider {
        calls: AtomicUsize,
    }

    impl DataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }
        fn source(&self) -> DataSource {
            DataSource::YahooFinance
        }
        fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<RawBar>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DataError::NetworkUnreachable("connection refused".into()))
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn transport_failure_degrades_and_is_not_cached() {
        let provider = Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(SeriesCache::new());
        let fetcher = SeriesFetcher::new("BTC-USD", provider.clone(), cache.clone());
        let range = DateRange::new(d(1), d(10)).unwrap();

        let first = fetcher.fetch(range);
        assert!(first.series.is_empty());
        assert!(matches!(first.issue, Some(FetchIssue::FetchFailed(_))));
        assert!(cache.is_empty());

        fetcher.fetch(range);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn inverted_dates_rejected() {
        let provider = Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        });
        let fetcher = SeriesFetcher::new("BTC-USD", provider.clone(), Arc::new(SeriesCache::new()));

        let err = fetcher.fetch_dates(d(5), d(1)).unwrap_err();
        assert!(matches!(err, ValidationError::InvertedRange { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fetch_issue_messages_are_user_facing() {
        assert_eq!(
            FetchIssue::DataUnavailable.to_string(),
            "no data found for the selected range"
        );
        let failed = FetchIssue::from(DataError::Other("boom".into()));
        assert!(failed.to_string().starts_with("error fetching data"));
    }
}
