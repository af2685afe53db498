//! Plain-text rendering of an [`AnalysisReport`] for terminal output.

use std::fmt::Write;

use pricelab_core::data::FetchIssue;
use pricelab_core::stats::ColumnStats;

use crate::pipeline::{AnalysisReport, ForecastSection};

const NO_DATA: &str = "No data found for the selected range.";

impl AnalysisReport {
    /// Render the report as a plain-text summary.
    pub fn render_text(&self) -> String {
        let mut out = String::with_capacity(4096);

        let _ = writeln!(
            out,
            "{} {} (source: {})",
            self.symbol, self.range, self.source
        );

        if self.has_data() {
            let _ = writeln!(out, "Data loaded for {} days.", self.days());
        } else {
            out.push_str(NO_DATA);
            out.push('\n');
            if let Some(FetchIssue::FetchFailed(e)) = &self.issue {
                let _ = writeln!(out, "Error fetching data: {e}");
            }
        }

        if self.has_data() {
            out.push('\n');
            self.render_stats(&mut out);
            out.push('\n');
            self.render_correlation(&mut out);
            out.push('\n');
            self.render_histogram(&mut out);
            out.push('\n');
            self.render_moving_averages(&mut out);
        }

        out.push('\n');
        self.render_forecast(&mut out);
        out
    }

    fn render_stats(&self, out: &mut String) {
        out.push_str("Descriptive statistics\n");
        let _ = write!(out, "{:<8}", "");
        for (column, _) in &self.stats.columns {
            let _ = write!(out, "{:>16}", column.name());
        }
        out.push('\n');

        let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.p25),
            ("50%", |s| s.p50),
            ("75%", |s| s.p75),
            ("max", |s| s.max),
        ];
        for (label, get) in rows {
            let _ = write!(out, "{label:<8}");
            for (_, stats) in &self.stats.columns {
                let _ = write!(out, "{:>16}", format_number(get(stats)));
            }
            out.push('\n');
        }
    }

    fn render_correlation(&self, out: &mut String) {
        out.push_str("Correlation\n");
        let _ = write!(out, "{:<8}", "");
        for name in self.correlation.names() {
            let _ = write!(out, "{name:>9}");
        }
        out.push('\n');
        for (name, row) in self.correlation.rows() {
            let _ = write!(out, "{name:<8}");
            for v in row {
                if v.is_nan() {
                    let _ = write!(out, "{:>9}", "-");
                } else {
                    let _ = write!(out, "{v:>9.3}");
                }
            }
            out.push('\n');
        }
    }

    fn render_histogram(&self, out: &mut String) {
        let h = &self.histogram;
        let _ = writeln!(
            out,
            "{} distribution ({} bins)",
            h.column.name(),
            h.counts.len()
        );
        let peak = h.counts.iter().copied().max().unwrap_or(0).max(1);
        for (lower, upper, count) in h.bins() {
            let bar = "#".repeat(count * 40 / peak);
            let _ = writeln!(out, "{lower:>12.2} - {upper:<12.2} {count:>5} {bar}");
        }
    }

    fn render_moving_averages(&self, out: &mut String) {
        out.push_str("Moving averages\n");
        for column in &self.derived {
            let last = column
                .values
                .last()
                .copied()
                .filter(|v| !v.is_nan())
                .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
            let _ = writeln!(
                out,
                "{:<8} {} of {} days defined, latest {last}",
                column.name,
                column.defined_count(),
                column.len()
            );
        }
        for note in &self.notes {
            let _ = writeln!(out, "note: {note}");
        }
    }

    fn render_forecast(&self, out: &mut String) {
        out.push_str("Forecast\n");
        match &self.forecast {
            ForecastSection::Ready {
                evaluation,
                points,
                anchor_date,
                ..
            } => {
                let _ = writeln!(out, "Mean Squared Error: {:.2}", evaluation.mse);
                let _ = writeln!(out, "R² Score: {:.2}", evaluation.r2);
                let _ = writeln!(out, "Anchor: {anchor_date}");
                let _ = writeln!(out, "{:<12}{:>18}", "Date", "Predicted Price");
                for p in points {
                    let _ = writeln!(out, "{:<12}{:>18.2}", p.date, p.predicted_close);
                }
            }
            ForecastSection::Unavailable { reason } => {
                let _ = writeln!(out, "Forecast unavailable: {reason}");
            }
        }
    }
}

fn format_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.4}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use pricelab_core::data::{SeriesCache, SeriesFetcher, SyntheticProvider};

    use crate::pipeline::{run_analysis, AnalysisRequest};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn render(start: NaiveDate, end: NaiveDate) -> String {
        let fetcher = SeriesFetcher::new(
            "BTC-USD",
            Arc::new(SyntheticProvider::weekdays_only()),
            Arc::new(SeriesCache::new()),
        );
        let request = AnalysisRequest::for_dates(start, end).unwrap();
        run_analysis(&fetcher, &request, d(2026, 10, 16))
            .unwrap()
            .render_text()
    }

    #[test]
    fn loaded_report_has_all_sections() {
        let text = render(d(2024, 1, 1), d(2024, 12, 31));
        assert!(text.contains("Data loaded for 262 days."));
        assert!(text.contains("Descriptive statistics"));
        assert!(text.contains("Correlation"));
        assert!(text.contains("Close distribution (30 bins)"));
        assert!(text.contains("SMA_20"));
        assert!(text.contains("Mean Squared Error: "));
        assert!(text.contains("R² Score: "));
        assert!(text.contains("Predicted Price"));
        assert!(text.contains("2026-10-22"));
    }

    #[test]
    fn empty_range_reports_no_data() {
        // a weekend
        let text = render(d(2024, 1, 6), d(2024, 1, 7));
        assert!(text.contains("No data found for the selected range."));
        assert!(!text.contains("Descriptive statistics"));
        assert!(text.contains("Forecast unavailable: insufficient data"));
    }
}
