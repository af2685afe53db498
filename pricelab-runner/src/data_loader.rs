//! Provider selection and fetcher construction for the runner.
//!
//! One `SeriesCache` lives for the whole process. Fetchers are cheap and
//! share it, so switching symbol or provider never loses cached ranges.
//!
//! Synthetic data is a developer and offline mode. Series produced from it
//! are tagged `DataSource::Synthetic` and the report says so.

use std::sync::Arc;

use pricelab_core::data::{
    CircuitBreaker, DataError, DataProvider, SeriesCache, SeriesFetcher, SyntheticProvider,
    YahooProvider,
};

use crate::config::{DataConfig, ProviderKind};

/// Build the provider for `kind`.
///
/// Fails only if the HTTP client cannot be constructed.
pub fn build_provider(kind: ProviderKind) -> Result<Arc<dyn DataProvider>, DataError> {
    match kind {
        ProviderKind::Yahoo => {
            let breaker = Arc::new(CircuitBreaker::default_provider());
            Ok(Arc::new(YahooProvider::new(breaker)?))
        }
        ProviderKind::Synthetic => {
            tracing::warn!("using synthetic data; results are not real market prices");
            Ok(Arc::new(SyntheticProvider::new()))
        }
    }
}

/// Fetcher for the configured symbol and provider over a shared cache.
pub fn build_fetcher(
    config: &DataConfig,
    cache: Arc<SeriesCache>,
) -> Result<SeriesFetcher, DataError> {
    let provider = build_provider(config.provider)?;
    tracing::debug!(
        symbol = %config.symbol,
        provider = provider.name(),
        "built series fetcher"
    );
    Ok(SeriesFetcher::new(config.symbol.clone(), provider, cache))
}
