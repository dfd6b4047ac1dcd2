//! Per-category demand forecasting.
//!
//! Responsibilities:
//!
//! - validate the category against the dataset's known set
//! - collapse the category's records into a daily unit-sales series
//! - fit the additive trend + seasonality model (`fitter`)
//! - predict every history date plus a fixed horizon of calendar days
//!
//! The model is fitted fresh on every call; nothing is cached between
//! categories or invocations.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use crate::domain::{ForecastFit, ForecastPoint, ForecastSeries, SalesRecord};
use crate::error::ForecastError;
use crate::io::Dataset;

pub mod design;
pub mod fitter;

pub use design::*;
pub use fitter::*;

/// Days predicted beyond the last observed date.
pub const FORECAST_HORIZON_DAYS: u32 = 90;

/// Model and search settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub horizon_days: u32,
    /// Upper bound on trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history (by date count) eligible for changepoints.
    pub changepoint_range: f64,
    pub weekly_order: usize,
    pub yearly_order: usize,
    pub weekly_min_span_days: i64,
    pub yearly_min_span_days: i64,
    /// Ridge weight on Fourier coefficients (scaled-y units).
    pub seasonality_penalty: f64,
    /// Ridge weights on changepoint deltas tried by the holdout search.
    pub penalty_grid: Vec<f64>,
    /// Changepoint ridge weight when the search is skipped.
    pub default_penalty: f64,
    pub holdout_fraction: f64,
    pub min_dates_for_holdout: usize,
    /// Coverage of the `yhat_lower..yhat_upper` band.
    pub interval_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: FORECAST_HORIZON_DAYS,
            n_changepoints: 25,
            changepoint_range: 0.8,
            weekly_order: 3,
            yearly_order: 10,
            weekly_min_span_days: 14,
            yearly_min_span_days: 730,
            seasonality_penalty: 0.1,
            penalty_grid: vec![0.1, 1.0, 10.0, 100.0],
            default_penalty: 10.0,
            holdout_fraction: 0.2,
            min_dates_for_holdout: 10,
            interval_width: 0.8,
        }
    }
}

/// Forecast one category of the dataset.
///
/// The category must match one of `dataset.categories()` exactly.
/// `Ok(None)` means the category has no records.
pub fn forecast(
    dataset: &Dataset,
    category: &str,
    config: &ForecastConfig,
) -> Result<Option<ForecastSeries>, ForecastError> {
    if !dataset.has_category(category) {
        return Err(ForecastError::UnknownCategory {
            category: category.to_string(),
            valid: dataset.categories().to_vec(),
        });
    }
    forecast_records(dataset.records(), category, config)
}

/// Forecast `category` from an arbitrary record slice.
pub fn forecast_records(
    records: &[SalesRecord],
    category: &str,
    config: &ForecastConfig,
) -> Result<Option<ForecastSeries>, ForecastError> {
    let series = daily_series(records, category);
    if series.is_empty() {
        warn!(category, "no records for category");
        return Ok(None);
    }
    if series.len() < 2 {
        return Err(ForecastError::InsufficientData {
            category: category.to_string(),
            distinct_dates: series.len(),
        });
    }

    let dates: Vec<NaiveDate> = series.iter().map(|(d, _)| *d).collect();
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let first_observed = dates[0];
    let last_observed = dates[dates.len() - 1];

    let model = fitter::fit(&dates, &values, config)?;
    info!(
        category,
        n_dates = dates.len(),
        changepoints = model.layout.changepoints().len(),
        penalty = model.changepoint_penalty,
        rmse = model.rmse,
        "fitted forecast model"
    );

    let z = z_score(config.interval_width);
    let n_hist = dates.len() as f64;
    let mut points = Vec::with_capacity(dates.len() + config.horizon_days as usize);

    for (&date, &observed) in dates.iter().zip(&values) {
        let p = model.predict(date);
        let half = z * model.rmse;
        points.push(ForecastPoint {
            date,
            yhat: p.yhat,
            yhat_lower: p.yhat - half,
            yhat_upper: p.yhat + half,
            trend: p.trend,
            seasonal: p.seasonal,
            observed: Some(observed),
            is_future: false,
        });
    }

    for h in 1..=config.horizon_days {
        let date = last_observed
            .checked_add_days(Days::new(u64::from(h)))
            .ok_or_else(|| ForecastError::Solve(format!("date overflow {h} days after {last_observed}")))?;
        let p = model.predict(date);
        // Band widens with distance from the last observation.
        let half = z * model.rmse * (1.0 + f64::from(h) / n_hist).sqrt();
        points.push(ForecastPoint {
            date,
            yhat: p.yhat,
            yhat_lower: p.yhat - half,
            yhat_upper: p.yhat + half,
            trend: p.trend,
            seasonal: p.seasonal,
            observed: None,
            is_future: true,
        });
    }

    Ok(Some(ForecastSeries {
        category: category.to_string(),
        first_observed,
        last_observed,
        horizon_days: config.horizon_days,
        fit: ForecastFit {
            n_dates: dates.len(),
            n_changepoints: model.layout.changepoints().len(),
            weekly: model.layout.has_seasonality("weekly"),
            yearly: model.layout.has_seasonality("yearly"),
            changepoint_penalty: model.changepoint_penalty,
            rmse: model.rmse,
        },
        points,
    }))
}

/// Sum `units_sold` per distinct date for one category, ascending.
///
/// Days without records are absent, not zero.
pub fn daily_series(records: &[SalesRecord], category: &str) -> Vec<(NaiveDate, f64)> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records.iter().filter(|r| r.category == category) {
        *sums.entry(r.date).or_insert(0.0) += r.units_sold;
    }
    sums.into_iter().collect()
}

/// Two-sided normal quantile for common interval widths.
fn z_score(width: f64) -> f64 {
    match width {
        x if x >= 0.99 => 2.576,
        x if x >= 0.95 => 1.96,
        x if x >= 0.90 => 1.645,
        x if x >= 0.80 => 1.282,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, category: &str, units: f64) -> SalesRecord {
        SalesRecord::new(date, category, "Zara", 10.0, units, 1.0, units * 10.0)
    }

    fn scenario() -> Dataset {
        Dataset::from_records(
            "mem.csv",
            vec![
                rec(d(2023, 1, 1), "Dress", 10.0),
                rec(d(2023, 1, 1), "Shirt", 5.0),
                rec(d(2024, 1, 1), "Dress", 7.0),
            ],
        )
    }

    #[test]
    fn unknown_category_lists_known_set() {
        let err = forecast(&scenario(), "Hat", &ForecastConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ForecastError::UnknownCategory {
                category: "Hat".to_string(),
                valid: vec!["Dress".to_string(), "Shirt".to_string()],
            }
        );
    }

    #[test]
    fn category_match_is_exact() {
        assert!(matches!(
            forecast(&scenario(), "dress", &ForecastConfig::default()),
            Err(ForecastError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn single_sale_date_is_insufficient() {
        let err = forecast(&scenario(), "Shirt", &ForecastConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientData {
                category: "Shirt".to_string(),
                distinct_dates: 1,
            }
        );
    }

    #[test]
    fn same_day_records_count_as_one_date() {
        let records = vec![rec(d(2023, 1, 1), "Dress", 1.0), rec(d(2023, 1, 1), "Dress", 2.0)];
        let err = forecast_records(&records, "Dress", &ForecastConfig::default()).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { distinct_dates: 1, .. }));
    }

    #[test]
    fn absent_category_in_records_is_no_data() {
        let records = vec![rec(d(2023, 1, 1), "Dress", 1.0)];
        assert_eq!(forecast_records(&records, "Hat", &ForecastConfig::default()), Ok(None));
    }

    #[test]
    fn output_dates_increase_and_end_at_horizon() {
        let series = forecast(&scenario(), "Dress", &ForecastConfig::default())
            .unwrap()
            .unwrap();

        assert!(series.points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series.points.first().unwrap().date, d(2023, 1, 1));
        assert_eq!(series.points.last().unwrap().date, d(2024, 1, 1) + Days::new(90));
        assert_eq!(series.history().count(), 2);
        assert_eq!(series.future().count(), 90);
        assert!(series.points.iter().all(|p| p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper));
    }

    #[test]
    fn missing_days_are_not_filled_with_zeros() {
        let records = vec![
            rec(d(2023, 1, 1), "Dress", 10.0),
            rec(d(2023, 1, 5), "Dress", 10.0),
            rec(d(2023, 1, 9), "Dress", 10.0),
        ];
        let series = forecast_records(&records, "Dress", &ForecastConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(series.history().count(), 3);
        for p in series.points.iter() {
            assert!((p.yhat - 10.0).abs() < 1e-6, "{} -> {}", p.date, p.yhat);
        }
    }

    #[test]
    fn daily_series_sums_per_date() {
        let records = vec![
            rec(d(2023, 1, 2), "Dress", 3.0),
            rec(d(2023, 1, 1), "Dress", 1.0),
            rec(d(2023, 1, 2), "Dress", 4.0),
            rec(d(2023, 1, 2), "Shirt", 100.0),
        ];
        assert_eq!(
            daily_series(&records, "Dress"),
            vec![(d(2023, 1, 1), 1.0), (d(2023, 1, 2), 7.0)]
        );
    }

    #[test]
    fn three_irregular_dates_fit_without_weekly_terms() {
        let records = vec![
            rec(d(2023, 1, 1), "Dress", 10.0),
            rec(d(2023, 1, 3), "Dress", 50.0),
            rec(d(2023, 1, 20), "Dress", 5.0),
        ];
        let series = forecast_records(&records, "Dress", &ForecastConfig::default())
            .unwrap()
            .unwrap();
        assert!(!series.fit.weekly);
        assert!(series.points.iter().all(|p| p.seasonal == 0.0));
    }
}
