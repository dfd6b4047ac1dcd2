//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - loads the dataset once
//! - dispatches to the dashboard, report, forecast, or plot command

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, DashboardArgs, ForecastArgs, PlotArgs, ReportArgs};
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;

/// Entry point for the `demand` binary.
pub fn run() -> Result<(), AppError> {
    // `demand` and `demand --year 2023` behave like `demand dashboard ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    let target = match cli.command {
        Command::Dashboard(_) => LogTarget::Silent,
        _ => LogTarget::Stderr,
    };
    crate::logging::init(cli.verbose, cli.log_file.as_deref(), target)?;

    let data = crate::config::resolve_dataset_path(cli.data);
    match cli.command {
        Command::Dashboard(args) => handle_dashboard(data, args),
        Command::Report(args) => handle_report(data, args),
        Command::Forecast(args) => handle_forecast(data, args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_dashboard(data: PathBuf, args: DashboardArgs) -> Result<(), AppError> {
    let dataset = crate::io::load_dataset(&data)?;
    crate::tui::run(&dataset, args.view, args.year)
}

fn handle_report(data: PathBuf, args: ReportArgs) -> Result<(), AppError> {
    let dataset = crate::io::load_dataset(&data)?;
    let view = args.dashboard.view;

    let mut dashboard = crate::filter::Dashboard::new(&dataset, view);
    dashboard.select(args.dashboard.year)?;

    println!("{}", crate::report::format_dataset_summary(&dataset));
    println!("{}", crate::report::format_view(view, dashboard.filter(), dashboard.panels()));

    if let Some(path) = &args.export {
        crate::io::write_panels_csv(path, dashboard.panels())?;
        info!(path = %path.display(), "wrote report CSV");
    }
    Ok(())
}

fn handle_forecast(data: PathBuf, args: ForecastArgs) -> Result<(), AppError> {
    let dataset = crate::io::load_dataset(&data)?;

    let category = match args.category {
        Some(category) => category,
        None => match crate::cli::prompt::prompt_for_category(dataset.categories())? {
            Some(category) => category,
            None => {
                println!("Canceled.");
                return Ok(());
            }
        },
    };

    let Some(series) = pipeline::run_forecast(&dataset, &category)? else {
        println!("No sales records for '{category}'; nothing to forecast.");
        return Ok(());
    };

    println!("{}", crate::report::format_forecast_summary(&series));
    if !args.no_plot {
        println!("{}", crate::plot::render_forecast_plot(&series, args.width, args.height));
    }

    if let Some(path) = &args.export {
        crate::io::write_forecast_csv(path, &series)?;
        info!(path = %path.display(), "wrote forecast CSV");
    }
    if let Some(path) = &args.export_json {
        crate::io::write_forecast_json(path, &series, &dataset)?;
        info!(path = %path.display(), "wrote forecast JSON");
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let doc = crate::io::read_forecast_json(&args.forecast)?;
    println!("{}", crate::plot::render_forecast_plot(&doc.series, args.width, args.height));
    Ok(())
}

/// Rewrite argv so `demand` defaults to `demand dashboard`.
///
/// Rules:
/// - `demand`                          -> `demand dashboard`
/// - `demand --year 2023 ...`          -> `demand dashboard --year 2023 ...`
/// - `demand --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("dashboard".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "dashboard" | "report" | "forecast" | "plot");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "dashboard".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_dashboard() {
        assert_eq!(rewrite_args(args(&["demand"])), args(&["demand", "dashboard"]));
    }

    #[test]
    fn leading_flags_go_to_dashboard() {
        assert_eq!(
            rewrite_args(args(&["demand", "--year", "2023"])),
            args(&["demand", "dashboard", "--year", "2023"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        let cases: [&[&str]; 3] = [
            &["demand", "forecast"],
            &["demand", "--help"],
            &["demand", "plot", "--forecast", "f.json"],
        ];
        for v in cases {
            assert_eq!(rewrite_args(args(v)), args(v));
        }
    }
}
