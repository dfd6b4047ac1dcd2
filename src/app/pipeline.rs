//! Shared forecast workflow used by the CLI and tests.
//!
//! Category validation -> daily series -> model fit -> predicted series,
//! with `ForecastError` mapped to the process exit codes.

use tracing::info;

use crate::domain::ForecastSeries;
use crate::error::AppError;
use crate::forecast::{ForecastConfig, forecast};
use crate::io::Dataset;

/// Forecast one category with the default model settings.
///
/// `Ok(None)` means the category is known but has no records.
pub fn run_forecast(dataset: &Dataset, category: &str) -> Result<Option<ForecastSeries>, AppError> {
    run_forecast_with(dataset, category, &ForecastConfig::default())
}

pub fn run_forecast_with(
    dataset: &Dataset,
    category: &str,
    config: &ForecastConfig,
) -> Result<Option<ForecastSeries>, AppError> {
    info!(category, horizon_days = config.horizon_days, "forecast requested");
    let series = forecast(dataset, category, config)?;
    Ok(series)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::SalesRecord;

    fn dataset() -> Dataset {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        Dataset::from_records(
            "mem.csv",
            vec![
                SalesRecord::new(d(2023, 1, 1), "Dress", "Zara", 20.0, 10.0, 3.0, 200.0),
                SalesRecord::new(d(2023, 1, 1), "Shirt", "H&M", 10.0, 5.0, 4.0, 50.0),
                SalesRecord::new(d(2024, 1, 1), "Dress", "Zara", 20.0, 7.0, 2.0, 140.0),
            ],
        )
    }

    #[test]
    fn errors_map_to_exit_codes() {
        let unknown = run_forecast(&dataset(), "Hat").unwrap_err();
        assert_eq!(unknown.exit_code(), 2);
        assert!(unknown.message().contains("Dress, Shirt"));

        assert_eq!(run_forecast(&dataset(), "Shirt").unwrap_err().exit_code(), 3);
    }

    #[test]
    fn known_category_forecasts() {
        let series = run_forecast(&dataset(), "Dress").unwrap().unwrap();
        assert_eq!(series.future().count(), 90);
    }
}
