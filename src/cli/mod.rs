//! Command-line parsing for the demand dashboard and forecaster.
//!
//! Argument parsing lives here; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{View, YearFilter};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "demand", version, about = "Retail demand dashboard and per-category sales forecaster")]
pub struct Cli {
    /// Sales dataset CSV (default: $DEMAND_DATASET, then dataset/fashion_demand_forecasting_dataset.csv).
    #[arg(long, global = true, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at info level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    Dashboard(DashboardArgs),
    /// Print every dashboard panel as a text table.
    Report(ReportArgs),
    /// Forecast daily units sold for one product category.
    Forecast(ForecastArgs),
    /// Plot a previously exported forecast JSON.
    Plot(PlotArgs),
}

/// Which panels and which year to start from.
#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    /// Panel set to show.
    #[arg(long, value_enum, default_value_t = View::Overview)]
    pub view: View,

    /// Year filter: `all` or a year present in the data.
    #[arg(long, default_value = "all", value_parser = parse_year_filter)]
    pub year: YearFilter,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub dashboard: DashboardArgs,

    /// Export the panel tables to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Category to forecast; prompts interactively when omitted.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the predicted series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the forecast (fit diagnostics + series) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved forecast.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Forecast JSON produced by `demand forecast --export-json`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

fn parse_year_filter(s: &str) -> Result<YearFilter, String> {
    s.parse()
}
