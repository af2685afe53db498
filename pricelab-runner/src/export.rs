//! CSV export of the augmented price table.
//!
//! Layout: `Date,Open,High,Low,Close,Volume` followed by one column per
//! derived series, in computation order. One row per bar. Numbers use the
//! shortest representation that parses back to the same `f64`. Undefined
//! values (`NaN`) are written as empty cells.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use pricelab_core::domain::{Column, PriceSeries};
use pricelab_core::indicators::DerivedColumn;

pub const CSV_MEDIA_TYPE: &str = "text/csv";

const DATE_HEADER: &str = "Date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Download file name for `symbol`'s export.
pub fn export_file_name(symbol: &str) -> String {
    format!("{symbol}_data.csv")
}

/// A parsed export: dates plus named numeric columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl ExportedTable {
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }
}

/// Serialize `series` and its derived columns to CSV bytes.
pub fn export_table(series: &PriceSeries, derived: &[DerivedColumn]) -> Result<Vec<u8>> {
    for column in derived {
        if column.len() != series.len() {
            bail!(
                "derived column {} has {} values but the series has {} bars",
                column.name,
                column.len(),
                series.len()
            );
        }
    }

    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![DATE_HEADER.to_string()];
    header.extend(Column::ALL.iter().map(|c| c.name().to_string()));
    header.extend(derived.iter().map(|c| c.name.clone()));
    wtr.write_record(&header)?;

    for (i, bar) in series.bars().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(bar.date.format(DATE_FORMAT).to_string());
        record.extend(Column::ALL.iter().map(|&c| format_value(bar.value(c))));
        record.extend(derived.iter().map(|c| format_value(c.values[i])));
        wtr.write_record(&record)?;
    }

    wtr.into_inner().context("failed to flush CSV writer")
}

/// Parse CSV bytes produced by [`export_table`].
pub fn import_table(bytes: &[u8]) -> Result<ExportedTable> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let headers = rdr.headers().context("failed to read CSV header")?.clone();

    match headers.get(0) {
        Some(DATE_HEADER) => {}
        other => bail!("expected first column '{DATE_HEADER}', found {other:?}"),
    }

    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV row {}", row + 1))?;
        let date_cell = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT)
            .with_context(|| format!("invalid date '{date_cell}' on row {}", row + 1))?;
        dates.push(date);

        for (col, column_values) in values.iter_mut().enumerate() {
            let cell = record.get(col + 1).unwrap_or_default();
            column_values.push(parse_value(cell).with_context(|| {
                format!("invalid number '{cell}' in column {} on row {}", names[col], row + 1)
            })?);
        }
    }

    Ok(ExportedTable {
        dates,
        columns: names.into_iter().zip(values).collect(),
    })
}

/// Write export bytes to `path`, creating parent directories.
pub fn write_export(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        // Display for f64 is the shortest round-trip form
        v.to_string()
    }
}

fn parse_value(cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    Ok(cell.parse::<f64>()?)
}
