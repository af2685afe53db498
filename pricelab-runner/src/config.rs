//! Serializable pipeline configuration.
//!
//! Loaded from TOML. Every section and field has a default, so an empty file
//! is a valid config that reproduces the dashboard defaults:
//!
//! ```toml
//! [data]
//! symbol = "BTC-USD"
//! provider = "yahoo"
//!
//! [analysis]
//! short_window = 20
//! long_window = 100
//! histogram_bins = 30
//!
//! [forecast]
//! horizon_days = 7
//! anchor = "wall_clock"
//! test_fraction = 0.2
//! seed = 42
//!
//! [logging]
//! level = "info"
//! ```

use std::ops::RangeInclusive;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricelab_core::domain::DateRange;
use pricelab_core::forecast::{Anchor, ForecastConfig};
use pricelab_core::ValidationError;

use crate::pipeline::AnalysisRequest;

/// Bounds of the dashboard sliders.
pub const SHORT_WINDOW_BOUNDS: RangeInclusive<usize> = 5..=50;
pub const LONG_WINDOW_BOUNDS: RangeInclusive<usize> = 50..=200;
pub const HORIZON_BOUNDS: RangeInclusive<usize> = 1..=30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfBounds {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Which data provider to fetch from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub symbol: String,
    pub provider: ProviderKind,
    /// Inclusive range start. Defaults to one year before `end`.
    pub start: Option<NaiveDate>,
    /// Inclusive range end. Defaults to today.
    pub end: Option<NaiveDate>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC-USD".to_string(),
            provider: ProviderKind::default(),
            start: None,
            end: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 100,
            histogram_bins: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub horizon_days: usize,
    pub anchor: Anchor,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        let model = ForecastConfig::default();
        Self {
            horizon_days: 7,
            anchor: Anchor::default(),
            test_fraction: model.test_fraction,
            seed: model.seed,
        }
    }
}

impl ForecastSettings {
    pub fn model_config(&self) -> ForecastConfig {
        ForecastConfig {
            test_fraction: self.test_fraction,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Full configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub forecast: ForecastSettings,
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check slider bounds and parameter domains.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.symbol.trim().is_empty() {
            return Err(ValidationError::InvalidParameter("symbol must not be empty".into()).into());
        }
        check_bounds("short_window", self.analysis.short_window, &SHORT_WINDOW_BOUNDS)?;
        check_bounds("long_window", self.analysis.long_window, &LONG_WINDOW_BOUNDS)?;
        check_bounds("horizon_days", self.forecast.horizon_days, &HORIZON_BOUNDS)?;
        if self.analysis.histogram_bins == 0 {
            let err = ValidationError::InvalidParameter("histogram_bins must be at least 1".into());
            return Err(err.into());
        }
        self.forecast
            .model_config()
            .validate()
            .map_err(|e| ValidationError::InvalidParameter(e.to_string()))?;
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            DateRange::new(start, end)?;
        }
        Ok(())
    }

    /// Resolve the analyzed range. Missing ends default to the trailing year
    /// ending today.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange, ValidationError> {
        match (self.data.start, self.data.end) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            (Some(start), None) => DateRange::new(start, today),
            (None, Some(end)) => Ok(DateRange::trailing_year(end)),
            (None, None) => Ok(DateRange::trailing_year(today)),
        }
    }

    /// Validate and build the request the pipeline runs.
    pub fn to_request(&self, today: NaiveDate) -> Result<AnalysisRequest, ConfigError> {
        self.validate()?;
        Ok(AnalysisRequest {
            range: self.date_range(today)?,
            windows: vec![self.analysis.short_window, self.analysis.long_window],
            horizon_days: self.forecast.horizon_days,
            anchor: self.forecast.anchor,
            forecast: self.forecast.model_config(),
            histogram_bins: self.analysis.histogram_bins,
        })
    }
}

fn check_bounds(
    field: &'static str,
    value: usize,
    bounds: &RangeInclusive<usize>,
) -> Result<(), ConfigError> {
    if bounds.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfBounds {
        field,
        value,
        min: *bounds.start(),
        max: *bounds.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_toml_gives_dashboard_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.data.symbol, "BTC-USD");
        assert_eq!(config.data.provider, ProviderKind::Yahoo);
        assert_eq!(config.analysis.short_window, 20);
        assert_eq!(config.analysis.long_window, 100);
        assert_eq!(config.analysis.histogram_bins, 30);
        assert_eq!(config.forecast.horizon_days, 7);
        assert_eq!(config.forecast.anchor, Anchor::WallClock);
        assert_eq!(config.forecast.test_fraction, 0.2);
        assert_eq!(config.forecast.seed, 42);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [data]
            symbol = "ETH-USD"
            provider = "synthetic"
            start = "2024-01-01"
            end = "2024-06-30"

            [forecast]
            anchor = "last_observed"
            "#,
        )
        .unwrap();
        assert_eq!(config.data.symbol, "ETH-USD");
        assert_eq!(config.data.provider, ProviderKind::Synthetic);
        assert_eq!(config.data.start, Some(d(2024, 1, 1)));
        assert_eq!(config.forecast.anchor, Anchor::LastObserved);
        assert_eq!(config.forecast.horizon_days, 7);
        assert_eq!(config.analysis.long_window, 100);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = PipelineConfig::default();
        config.data.start = Some(d(2023, 5, 1));
        config.forecast.seed = 7;
        let text = config.to_toml().unwrap();
        assert_eq!(PipelineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn slider_bounds_are_enforced() {
        let mut config = PipelineConfig::default();
        config.analysis.short_window = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfBounds {
                field: "short_window",
                ..
            })
        ));

        let mut config = PipelineConfig::default();
        config.analysis.long_window = 201;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.forecast.horizon_days = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.forecast.horizon_days = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_dates_fail_validation() {
        let mut config = PipelineConfig::default();
        config.data.start = Some(d(2024, 6, 1));
        config.data.end = Some(d(2024, 1, 1));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(ValidationError::InvertedRange { .. }))
        ));
    }

    #[test]
    fn bad_test_fraction_fails_validation() {
        let mut config = PipelineConfig::default();
        config.forecast.test_fraction = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_dates_default_to_trailing_year() {
        let today = d(2026, 10, 16);
        let range = PipelineConfig::default().date_range(today).unwrap();
        assert_eq!(range.end(), today);
        assert_eq!(range, DateRange::trailing_year(today));
    }

    #[test]
    fn request_carries_both_windows() {
        let request = PipelineConfig::default().to_request(d(2026, 10, 16)).unwrap();
        assert_eq!(request.windows, vec![20, 100]);
        assert_eq!(request.horizon_days, 7);
        assert_eq!(request.histogram_bins, 30);
    }

    #[test]
    fn unknown_provider_is_a_parse_error() {
        let err = PipelineConfig::from_toml("[data]\nprovider = \"bloomberg\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
