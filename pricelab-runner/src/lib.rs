//! PriceLab Runner: configuration, pipeline orchestration, export, reports.
//!
//! This crate builds on `pricelab-core` to provide:
//! - TOML configuration with dashboard defaults and slider bounds
//! - Provider selection over a process-wide series cache
//! - The analysis pipeline with per-stage degradation
//! - CSV export and import of the augmented table
//! - Plain-text report rendering

pub mod config;
pub mod data_loader;
pub mod export;
pub mod pipeline;
pub mod report;

pub use config::{ConfigError, PipelineConfig, ProviderKind};
pub use data_loader::{build_fetcher, build_provider};
pub use export::{
    export_file_name, export_table, import_table, write_export, ExportedTable, CSV_MEDIA_TYPE,
};
pub use pipeline::{run_analysis, AnalysisReport, AnalysisRequest, ForecastSection};
