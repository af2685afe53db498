//! Pipeline orchestration: fetch → statistics → moving averages → forecast.
//!
//! Only request validation can fail the run. Every later stage degrades its
//! own section of the report and lets the rest proceed, so an empty range
//! still produces a complete (if mostly empty) report.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use pricelab_core::data::{DataSource, FetchIssue, SeriesFetcher};
use pricelab_core::domain::{Column, DateRange, PriceSeries};
use pricelab_core::forecast::{
    Anchor, Evaluation, ForecastConfig, ForecastModel, ForecastPoint, RegressionModel,
};
use pricelab_core::indicators::{rolling_mean, DerivedColumn};
use pricelab_core::stats::{
    correlate, describe, histogram, CorrelationMatrix, DescriptiveStats, Histogram,
};
use pricelab_core::ValidationError;

/// Everything one analysis run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub range: DateRange,
    /// Rolling-mean windows over the close, in output order.
    pub windows: Vec<usize>,
    pub horizon_days: usize,
    pub anchor: Anchor,
    pub forecast: ForecastConfig,
    pub histogram_bins: usize,
}

impl AnalysisRequest {
    /// Request with the dashboard defaults for raw, unvalidated dates.
    pub fn for_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        Ok(Self {
            range: DateRange::new(start, end)?,
            windows: vec![20, 100],
            horizon_days: 7,
            anchor: Anchor::default(),
            forecast: ForecastConfig::default(),
            histogram_bins: 30,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.windows.contains(&0) {
            return Err(ValidationError::ZeroWindow);
        }
        if self.horizon_days == 0 {
            return Err(ValidationError::ZeroHorizon);
        }
        if self.histogram_bins == 0 {
            return Err(ValidationError::InvalidParameter(
                "histogram_bins must be at least 1".into(),
            ));
        }
        self.forecast
            .validate()
            .map_err(|e| ValidationError::InvalidParameter(e.to_string()))
    }
}

/// Forecast stage result.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastSection {
    Ready {
        evaluation: Evaluation,
        model: RegressionModel,
        points: Vec<ForecastPoint>,
        anchor_date: NaiveDate,
        /// Wall-clock anchor after the end of the analyzed range.
        anchor_detached: bool,
    },
    Unavailable {
        reason: String,
    },
}

impl ForecastSection {
    pub fn is_ready(&self) -> bool {
        matches!(self, ForecastSection::Ready { .. })
    }
}

/// Output of one run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub symbol: String,
    pub range: DateRange,
    pub source: DataSource,
    pub issue: Option<FetchIssue>,
    pub series: Arc<PriceSeries>,
    pub stats: DescriptiveStats,
    pub correlation: CorrelationMatrix,
    pub histogram: Histogram,
    pub derived: Vec<DerivedColumn>,
    pub forecast: ForecastSection,
    /// Stage-level notes (degraded columns and the like).
    pub notes: Vec<String>,
}

impl AnalysisReport {
    pub fn days(&self) -> usize {
        self.series.len()
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }
}

/// Run the full analysis for `request`.
///
/// `today` feeds the wall-clock forecast anchor.
pub fn run_analysis(
    fetcher: &SeriesFetcher,
    request: &AnalysisRequest,
    today: NaiveDate,
) -> Result<AnalysisReport, ValidationError> {
    request.validate()?;

    let outcome = fetcher.fetch(request.range);
    let series = outcome.series;
    let mut notes = Vec::new();

    if let Some(issue) = &outcome.issue {
        warn!(symbol = fetcher.symbol(), range = %request.range, %issue, "no usable data");
    }

    let stats = describe(&series);
    let correlation = correlate(&series);
    let histogram = histogram(&series, Column::Close, request.histogram_bins);

    let mut derived = Vec::with_capacity(request.windows.len());
    for &window in &request.windows {
        let column = rolling_mean(&series, Column::Close, window)?;
        if !series.is_empty() && window > series.len() {
            notes.push(format!(
                "{} is undefined: window of {window} days exceeds the {} days loaded",
                column.name,
                series.len()
            ));
        }
        derived.push(column);
    }

    let forecast = forecast_section(&series, request, today);
    if let ForecastSection::Unavailable { reason } = &forecast {
        warn!(symbol = fetcher.symbol(), %reason, "forecast unavailable");
    }

    info!(
        symbol = fetcher.symbol(),
        range = %request.range,
        bars = series.len(),
        source = %outcome.source,
        forecast = forecast.is_ready(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        symbol: fetcher.symbol().to_string(),
        range: request.range,
        source: outcome.source,
        issue: outcome.issue,
        series,
        stats,
        correlation,
        histogram,
        derived,
        forecast,
        notes,
    })
}

fn forecast_section(
    series: &PriceSeries,
    request: &AnalysisRequest,
    today: NaiveDate,
) -> ForecastSection {
    let evaluated = ForecastModel::new(request.forecast)
        .train(series)
        .and_then(|trained| trained.evaluate());
    let evaluated = match evaluated {
        Ok(e) => e,
        Err(e) => {
            return ForecastSection::Unavailable {
                reason: e.to_string(),
            }
        }
    };

    match evaluated.forecast(request.horizon_days, request.anchor, today) {
        Ok(points) => ForecastSection::Ready {
            evaluation: *evaluated.evaluation(),
            model: *evaluated.model(),
            points,
            anchor_date: request.anchor.resolve(series.last_date(), today),
            anchor_detached: request.anchor.is_detached(request.range.end(), today),
        },
        Err(e) => ForecastSection::Unavailable {
            reason: e.to_string(),
        },
    }
}
