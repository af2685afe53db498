//! PriceSeries: an ascending, duplicate-free sequence of bars.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bar::{Bar, Column};

/// Daily bars for one symbol, strictly increasing by date.
///
/// The only constructors normalize their input, so every `PriceSeries` in the
/// program satisfies the ordering invariant. Deserialization goes through
/// [`PriceSeries::from_unordered`] too. Downstream stages take it by shared
/// reference and never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeriesRepr")]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

#[derive(Deserialize)]
struct SeriesRepr {
    symbol: String,
    bars: Vec<Bar>,
}

impl From<SeriesRepr> for PriceSeries {
    fn from(repr: SeriesRepr) -> Self {
        Self::from_unordered(repr.symbol, repr.bars)
    }
}

impl PriceSeries {
    /// An empty series: the typed "no data" result.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Build a series from bars in any order.
    ///
    /// Bars are sorted ascending by date. When a date appears more than once
    /// the bar that came last in the input wins.
    pub fn from_unordered(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        // Stable sort keeps input order among equal dates, so "last" is well defined.
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Copy one column out as a contiguous vector.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.bars.iter().map(|b| b.value(column)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn sorts_ascending() {
        let series =
            PriceSeries::from_unordered("BTC-USD", vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0)]);
        assert_eq!(series.column(Column::Close), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn duplicate_dates_last_write_wins() {
        let series = PriceSeries::from_unordered(
            "BTC-USD",
            vec![bar(1, 1.0), bar(2, 2.0), bar(1, 10.0), bar(2, 20.0), bar(2, 200.0)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.column(Column::Close), vec![10.0, 200.0]);
    }

    #[test]
    fn empty_series_has_no_dates() {
        let series = PriceSeries::empty("BTC-USD");
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
        assert_eq!(series.last_date(), None);
        assert!(series.column(Column::Close).is_empty());
    }

    #[test]
    fn deserializing_normalizes_bar_order() {
        let raw = PriceSeries {
            symbol: "BTC-USD".into(),
            bars: vec![bar(2, 2.0), bar(1, 1.0), bar(2, 20.0)],
        };
        let json = serde_json::to_string(&raw).unwrap();
        let series: PriceSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.column(Column::Close), vec![1.0, 20.0]);
    }
}
