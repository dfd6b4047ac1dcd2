//! Export forecasts and dashboard tables to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::aggregate::PanelOutput;
use crate::domain::{ForecastSeries, SummaryTable};
use crate::error::AppError;

/// Write a forecast series to a CSV file.
pub fn write_forecast_csv(path: &Path, series: &ForecastSeries) -> Result<(), AppError> {
    let mut wtr = create(path)?;
    write_forecast_rows(&mut wtr, series)
        .and_then(|_| wtr.flush().map_err(csv::Error::from))
        .map_err(|e| AppError::input(format!("Failed to write forecast CSV '{}': {e}", path.display())))
}

fn write_forecast_rows<W: Write>(wtr: &mut csv::Writer<W>, series: &ForecastSeries) -> csv::Result<()> {
    wtr.write_record(["date", "yhat", "yhat_lower", "yhat_upper", "trend", "seasonal", "observed", "is_future"])?;
    for p in &series.points {
        wtr.write_record([
            p.date.to_string(),
            format!("{:.4}", p.yhat),
            format!("{:.4}", p.yhat_lower),
            format!("{:.4}", p.yhat_upper),
            format!("{:.4}", p.trend),
            format!("{:.4}", p.seasonal),
            p.observed.map(|v| format!("{v:.4}")).unwrap_or_default(),
            p.is_future.to_string(),
        ])?;
    }
    Ok(())
}

/// Write every panel's table to one long-format CSV file.
///
/// Columns: `panel,key,value,share,category`. Date series use the date as
/// key; the scatter uses price as key and units sold as value.
pub fn write_panels_csv(path: &Path, panels: &[PanelOutput]) -> Result<(), AppError> {
    let mut wtr = create(path)?;
    write_panel_rows(&mut wtr, panels)
        .and_then(|_| wtr.flush().map_err(csv::Error::from))
        .map_err(|e| AppError::input(format!("Failed to write report CSV '{}': {e}", path.display())))
}

fn write_panel_rows<W: Write>(wtr: &mut csv::Writer<W>, panels: &[PanelOutput]) -> csv::Result<()> {
    wtr.write_record(["panel", "key", "value", "share", "category"])?;
    for panel in panels {
        let id = panel.panel.id();
        match &panel.table {
            SummaryTable::Series(points) => {
                for p in points {
                    wtr.write_record([id, &p.date.to_string(), &format!("{:.4}", p.value), "", ""])?;
                }
            }
            SummaryTable::Groups(groups) => {
                for g in groups {
                    wtr.write_record([id, &g.key, &format!("{:.4}", g.value), "", ""])?;
                }
            }
            SummaryTable::Shares(shares) => {
                for s in shares {
                    wtr.write_record([
                        id,
                        &s.key,
                        &format!("{:.4}", s.value),
                        &format!("{:.6}", s.fraction),
                        "",
                    ])?;
                }
            }
            SummaryTable::Scatter(points) => {
                for p in points {
                    wtr.write_record([
                        id,
                        &format!("{:.4}", p.price),
                        &format!("{:.4}", p.units_sold),
                        "",
                        &p.category,
                    ])?;
                }
            }
        }
    }
    Ok(())
}

fn create(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    Ok(writer(file))
}

/// CSV writer with `\n` line endings; quoting is left to the `csv` crate.
fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::aggregate::compute_view;
    use crate::domain::{SalesRecord, View, YearFilter};

    fn render_panels(panels: &[PanelOutput]) -> String {
        let mut buf = Vec::new();
        {
            let mut wtr = writer(&mut buf);
            write_panel_rows(&mut wtr, panels).unwrap();
            wtr.flush().unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn panel_rows_cover_every_table() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let records = vec![SalesRecord::new(d, "Dress", "Brand, Inc", 12.5, 4.0, 9.0, 50.0)];
        let panels = compute_view(View::Shares, &records, YearFilter::All);

        assert_eq!(
            render_panels(&panels),
            concat!(
                "panel,key,value,share,category\n",
                "category-share,Dress,4.0000,1.000000,\n",
                "brand-share,\"Brand, Inc\",4.0000,1.000000,\n",
            )
        );
    }

    #[test]
    fn keys_with_quotes_and_line_breaks_are_quoted() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let records = vec![
            SalesRecord::new(d, "Dress", "Say \"Hi\"", 1.0, 1.0, 1.0, 1.0),
            SalesRecord::new(d, "Dress", "Carriage\rReturn", 1.0, 1.0, 1.0, 1.0),
        ];
        let panels = compute_view(View::Shares, &records, YearFilter::All);
        let text = render_panels(&panels);

        assert!(text.contains("brand-share,\"Carriage\rReturn\",1.0000,0.500000,\n"), "{text:?}");
        assert!(text.contains("brand-share,\"Say \"\"Hi\"\"\",1.0000,0.500000,\n"), "{text:?}");

        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let keys: Vec<String> = rdr.records().map(|r| r.unwrap()[1].to_string()).collect();
        assert!(keys.contains(&"Carriage\rReturn".to_string()));
    }
}
