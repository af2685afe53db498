//! PriceLab CLI: analyze and forecast a daily price series.
//!
//! Commands:
//! - `analyze`: fetch a range, print statistics and a forecast, optionally export CSV
//! - `config`: print the effective configuration as TOML

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pricelab_core::data::SeriesCache;
use pricelab_core::forecast::Anchor;
use pricelab_runner::{
    build_fetcher, export_file_name, export_table, run_analysis, write_export, ForecastSection,
    PipelineConfig, ProviderKind,
};

#[derive(Parser)]
#[command(
    name = "pricelab",
    about = "PriceLab: daily price analytics and linear-trend forecasting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a date range, print statistics and a forecast.
    Analyze(AnalyzeArgs),
    /// Print the effective configuration (file plus flags) as TOML.
    Config(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
struct AnalyzeArgs {
    /// Path to a TOML config file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start date (YYYY-MM-DD). Defaults to one year before the end date.
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Ticker symbol, e.g. BTC-USD.
    #[arg(long)]
    symbol: Option<String>,

    /// Short moving-average window in days (5-50).
    #[arg(long)]
    short_window: Option<usize>,

    /// Long moving-average window in days (50-200).
    #[arg(long)]
    long_window: Option<usize>,

    /// Forecast horizon in days (1-30).
    #[arg(long)]
    horizon: Option<usize>,

    /// Forecast start: wall-clock (today) or last-observed (end of the data).
    #[arg(long)]
    anchor: Option<Anchor>,

    /// Seed for the train/test split.
    #[arg(long)]
    seed: Option<u64>,

    /// Use the deterministic synthetic provider instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Directory to write `<symbol>_data.csv` into.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Load the config file (if any) and apply flag overrides.
    fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(start) = self.start {
            config.data.start = Some(start);
        }
        if let Some(end) = self.end {
            config.data.end = Some(end);
        }
        if let Some(symbol) = &self.symbol {
            config.data.symbol = symbol.clone();
        }
        if self.synthetic {
            config.data.provider = ProviderKind::Synthetic;
        }
        if let Some(w) = self.short_window {
            config.analysis.short_window = w;
        }
        if let Some(w) = self.long_window {
            config.analysis.long_window = w;
        }
        if let Some(h) = self.horizon {
            config.forecast.horizon_days = h;
        }
        if let Some(anchor) = self.anchor {
            config.forecast.anchor = anchor;
        }
        if let Some(seed) = self.seed {
            config.forecast.seed = seed;
        }
        Ok(config)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Config(args) => {
            let config = args.resolve_config()?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = args.resolve_config()?;
    init_tracing(&config.logging.level);

    let today = chrono::Local::now().date_naive();
    let request = config
        .to_request(today)
        .context("invalid analysis parameters")?;

    let cache = Arc::new(SeriesCache::new());
    let fetcher = build_fetcher(&config.data, cache).context("failed to set up data provider")?;

    tracing::info!(
        symbol = %config.data.symbol,
        range = %request.range,
        provider = ?config.data.provider,
        "starting analysis"
    );

    let report = run_analysis(&fetcher, &request, today)?;

    if let ForecastSection::Ready {
        anchor_detached: true,
        anchor_date,
        ..
    } = &report.forecast
    {
        eprintln!(
            "warning: forecast starts at {anchor_date} but the data ends {}; \
             use --anchor last-observed to continue from the data",
            request.range.end()
        );
    }

    print!("{}", report.render_text());

    if let Some(dir) = &args.output {
        let path = export(dir, &report)?;
        println!("\nExported to: {}", path.display());
    }

    Ok(())
}

fn export(dir: &Path, report: &pricelab_runner::AnalysisReport) -> Result<PathBuf> {
    let bytes = export_table(&report.series, &report.derived)?;
    let path = dir.join(export_file_name(&report.symbol));
    write_export(&path, &bytes)?;
    Ok(path)
}
