//! Normalization of raw provider bars into a `PriceSeries`.
//!
//! Steps: drop bars outside the requested range, sort ascending, dedupe by
//! date with the last occurrence winning. Anomalies are counted, not removed.

use std::collections::HashSet;

use super::provider::RawBar;
use crate::domain::{Bar, DateRange, PriceSeries};

/// What normalization did to a raw batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub received: usize,
    pub out_of_range: usize,
    pub duplicates: usize,
    pub void_bars: usize,
    pub zero_volume: usize,
}

/// Normalize raw bars for `symbol` into an ascending, duplicate-free series
/// restricted to `range`.
pub fn normalize(
    symbol: &str,
    raw: Vec<RawBar>,
    range: DateRange,
) -> (PriceSeries, NormalizeReport) {
    let mut report = NormalizeReport {
        received: raw.len(),
        ..Default::default()
    };

    let mut seen = HashSet::with_capacity(raw.len());
    let mut bars = Vec::with_capacity(raw.len());

    for r in raw {
        if !range.contains(r.date) {
            report.out_of_range += 1;
            continue;
        }
        if !seen.insert(r.date) {
            report.duplicates += 1;
        }
        bars.push(Bar {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        });
    }

    let series = PriceSeries::from_unordered(symbol, bars);

    for bar in series.bars() {
        if bar.is_void() {
            report.void_bars += 1;
        }
        if bar.volume == 0.0 {
            report.zero_volume += 1;
        }
    }

    (series, report)
}
