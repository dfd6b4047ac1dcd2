//! Formatted terminal output.
//!
//! Formatting lives in one place so the aggregation and forecasting code
//! stays free of presentation concerns.

use crate::aggregate::PanelOutput;
use crate::domain::{ForecastSeries, SummaryTable, View, YearFilter};
use crate::io::Dataset;

/// One-paragraph description of the loaded dataset.
pub fn format_dataset_summary(dataset: &Dataset) -> String {
    let stats = dataset.stats();
    let range = match (stats.first_date, stats.last_date) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "empty".to_string(),
    };
    let years: Vec<String> = dataset.years().iter().map(|y| y.to_string()).collect();

    let mut out = String::new();
    out.push_str(&format!("Dataset: {}\n", dataset.source().display()));
    out.push_str(&format!("Records: n={} | dates={range}\n", stats.n_records));
    out.push_str(&format!("Years: {}\n", years.join(", ")));
    out.push_str(&format!("Categories: {}\n", dataset.categories().join(", ")));
    out.push_str(&format!("Brands: {}\n", dataset.brands().len()));
    out
}

/// Render every panel of a view as text tables.
pub fn format_view(view: View, filter: YearFilter, panels: &[PanelOutput]) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", view.display_name()));
    out.push_str(&format!("Year: {}\n", filter.label()));
    for panel in panels {
        out.push('\n');
        out.push_str(&format_panel(panel));
    }
    out
}

/// Render one panel: title line, then its table (or a no-data note).
pub fn format_panel(panel: &PanelOutput) -> String {
    let mut out = String::new();
    out.push_str(&panel.title);
    out.push('\n');

    if panel.table.is_empty() {
        out.push_str("  (no data for this selection)\n");
        return out;
    }

    let value_label = panel.panel.value_label();
    match &panel.table {
        SummaryTable::Series(points) => {
            push_row(&mut out, format!("{:<12} {:>14}", "date", value_label));
            push_row(&mut out, format!("{:-<12} {:-<14}", "", ""));
            for p in points {
                push_row(&mut out, format!("{:<12} {:>14.2}", p.date, p.value));
            }
        }
        SummaryTable::Groups(groups) => {
            push_row(&mut out, format!("{:<24} {:>14}", "key", value_label));
            push_row(&mut out, format!("{:-<24} {:-<14}", "", ""));
            for g in groups {
                push_row(&mut out, format!("{:<24} {:>14.2}", truncate(&g.key, 24), g.value));
            }
        }
        SummaryTable::Shares(shares) => {
            push_row(&mut out, format!("{:<24} {:>14} {:>8}", "key", value_label, "share"));
            push_row(&mut out, format!("{:-<24} {:-<14} {:-<8}", "", "", ""));
            for s in shares {
                push_row(
                    &mut out,
                    format!(
                        "{:<24} {:>14.2} {:>7.1}%",
                        truncate(&s.key, 24),
                        s.value,
                        s.fraction * 100.0
                    ),
                );
            }
        }
        SummaryTable::Scatter(points) => {
            push_row(&mut out, format!("{:>10} {:>12} {:<16}", "price", "units_sold", "category"));
            push_row(&mut out, format!("{:->10} {:->12} {:-<16}", "", "", ""));
            for p in points {
                push_row(
                    &mut out,
                    format!("{:>10.2} {:>12.2} {:<16}", p.price, p.units_sold, truncate(&p.category, 16)),
                );
            }
        }
    }
    out
}

/// Fit diagnostics plus the first and last predicted days.
pub fn format_forecast_summary(series: &ForecastSeries) -> String {
    let fit = &series.fit;
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    let mut out = String::new();
    out.push_str(&format!("=== Forecast: {} ===\n", series.category));
    out.push_str(&format!(
        "History: {} .. {} ({} distinct dates)\n",
        series.first_observed, series.last_observed, fit.n_dates
    ));
    out.push_str(&format!("Horizon: {} days\n", series.horizon_days));
    out.push_str(&format!(
        "Seasonality: weekly={} yearly={}\n",
        yes_no(fit.weekly),
        yes_no(fit.yearly)
    ));
    out.push_str(&format!(
        "Trend: changepoints={} penalty={}\n",
        fit.n_changepoints, fit.changepoint_penalty
    ));
    out.push_str(&format!("RMSE: {:.3} units\n", fit.rmse));

    let mut future = series.future();
    if let Some(first) = future.next() {
        let last = future.last().unwrap_or(first);
        out.push_str("\nPredicted units sold:\n");
        for p in [first, last] {
            out.push_str(&format!(
                "  {}  yhat={:.2}  [{:.2}, {:.2}]\n",
                p.date, p.yhat, p.yhat_lower, p.yhat_upper
            ));
        }
    }
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
