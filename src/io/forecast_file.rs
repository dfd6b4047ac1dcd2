//! Read/write forecast JSON files.
//!
//! Forecast JSON is the "portable" representation of a forecast run:
//! - the category and observed history range
//! - fit diagnostics (changepoints, seasonalities, penalty, RMSE)
//! - the full predicted series, for re-plotting with `demand plot`
//!
//! The schema is defined by `domain::ForecastFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{ForecastFile, ForecastSeries};
use crate::error::AppError;
use crate::io::ingest::Dataset;

/// Name written into the `tool` field.
pub const TOOL_NAME: &str = "demand";

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, series: &ForecastSeries, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    let doc = ForecastFile {
        tool: TOOL_NAME.to_string(),
        dataset: dataset.source().display().to_string(),
        series: series.clone(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::input(format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    let doc: ForecastFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid forecast JSON: {e}")))?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::SalesRecord;
    use crate::forecast::{ForecastConfig, forecast};

    #[test]
    fn saved_forecast_reads_back() {
        let d = |m, day| NaiveDate::from_ymd_opt(2023, m, day).unwrap();
        let dataset = Dataset::from_records(
            "mem.csv",
            vec![
                SalesRecord::new(d(1, 1), "Dress", "Zara", 10.0, 3.0, 1.0, 30.0),
                SalesRecord::new(d(1, 2), "Dress", "Zara", 10.0, 4.0, 1.0, 40.0),
            ],
        );
        let series = forecast(&dataset, "Dress", &ForecastConfig::default())
            .unwrap()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dress.json");
        write_forecast_json(&path, &series, &dataset).unwrap();

        let doc = read_forecast_json(&path).unwrap();
        assert_eq!(doc.tool, TOOL_NAME);
        assert_eq!(doc.dataset, "mem.csv");
        assert_eq!(doc.series.category, "Dress");
        assert_eq!(doc.series.points.len(), series.points.len());
        assert_eq!(doc.series.last_observed, d(1, 2));
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(read_forecast_json(&path).unwrap_err().exit_code(), 2);
    }
}
