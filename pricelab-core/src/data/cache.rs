//! Process-lifetime memo of fetched series.
//!
//! Keyed by `(symbol, start, end)`. Entries are never invalidated or evicted:
//! a closed historical range does not change, and nothing here outlives the
//! process. Empty series are cached too, so a known-empty range does not hit
//! the network again.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{DateRange, PriceSeries};

/// Cache key for one fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, range: DateRange) -> Self {
        Self {
            symbol: symbol.into(),
            start: range.start(),
            end: range.end(),
        }
    }
}

/// Shared read-many/write-rarely series cache.
///
/// The lock is only held for the map operation itself, never across a fetch,
/// so a reader of one key is not held up by a slow download of another.
/// Concurrent first fetches of the same key both insert; the value is
/// deterministic for a fixed key, so last writer wins.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: RwLock<HashMap<CacheKey, Arc<PriceSeries>>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    // The map holds plain values; a panicking writer cannot leave it half-updated.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Arc<PriceSeries>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Arc<PriceSeries>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a cached series.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<PriceSeries>> {
        self.read().get(key).cloned()
    }

    /// Store a series under `key` and hand back the shared copy.
    pub fn put(&self, key: CacheKey, series: PriceSeries) -> Arc<PriceSeries> {
        let series = Arc::new(series);
        self.write().insert(key, Arc::clone(&series));
        series
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.read().contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
