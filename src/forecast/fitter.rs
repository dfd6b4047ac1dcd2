//! Fitting routines for the additive trend + seasonality model.
//!
//! Given:
//! - ascending, distinct history dates `d_i`
//! - observed daily units `y_i`
//! - a candidate grid of changepoint penalties
//!
//! we solve, for each penalty:
//! - a ridge-regularized least squares problem on a training prefix
//! - the RMSE on the held-out suffix
//!
//! and refit the full history with the best (lowest holdout RMSE) penalty.

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::debug;

use super::ForecastConfig;
use super::design::ModelLayout;
use crate::error::ForecastError;
use crate::math::solve_ridge;

/// A solved model on a fixed layout.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub layout: ModelLayout,
    /// Coefficients in scaled-y units.
    pub coefficients: Vec<f64>,
    /// Divisor applied to y before fitting.
    pub y_scale: f64,
    pub changepoint_penalty: f64,
    /// In-sample RMSE in original units.
    pub rmse: f64,
}

/// Model prediction for one date, split into components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub yhat: f64,
    pub trend: f64,
    pub seasonal: f64,
}

impl FittedModel {
    pub fn predict(&self, date: NaiveDate) -> Prediction {
        let mut row = vec![0.0; self.layout.n_columns()];
        self.layout.fill_row(date, &mut row);

        let dot = |cols: std::ops::Range<usize>| -> f64 {
            cols.map(|j| row[j] * self.coefficients[j]).sum::<f64>() * self.y_scale
        };
        let trend = dot(self.layout.trend_columns());
        let seasonal = dot(self.layout.seasonal_columns());

        Prediction {
            yhat: trend + seasonal,
            trend,
            seasonal,
        }
    }
}

/// Candidate evaluation result (for diagnostics).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    penalty: f64,
    holdout_rmse: f64,
}

/// Select a changepoint penalty and fit the full history.
///
/// Needs at least two dates; fewer is a `Solve` error rather than a panic.
pub fn fit(dates: &[NaiveDate], values: &[f64], config: &ForecastConfig) -> Result<FittedModel, ForecastError> {
    if dates.len() < 2 {
        return Err(ForecastError::Solve(format!(
            "need at least 2 distinct dates to fit, got {}",
            dates.len()
        )));
    }
    if dates.len() != values.len() {
        return Err(ForecastError::Solve("dates/values length mismatch".to_string()));
    }
    let penalty = select_penalty(dates, values, config);
    let layout = ModelLayout::new(dates, config);
    fit_with_penalty(layout, dates, values, penalty, config.seasonality_penalty)
}

/// Fit a fixed layout with the given ridge penalties.
pub fn fit_with_penalty(
    layout: ModelLayout,
    dates: &[NaiveDate],
    values: &[f64],
    changepoint_penalty: f64,
    seasonality_penalty: f64,
) -> Result<FittedModel, ForecastError> {
    if dates.len() != values.len() {
        return Err(ForecastError::Solve("dates/values length mismatch".to_string()));
    }

    let n = dates.len();
    let p = layout.n_columns();

    // Scale y so penalties mean the same thing for a 5-unit and a 5000-unit series.
    let max_abs = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for (i, &date) in dates.iter().enumerate() {
        layout.fill_row(date, &mut row);
        for (j, &v) in row.iter().enumerate() {
            x[(i, j)] = v;
        }
    }
    let y = DVector::from_iterator(n, values.iter().map(|v| v / y_scale));

    let mut penalties = vec![0.0; p];
    for j in layout.changepoint_columns() {
        penalties[j] = changepoint_penalty;
    }
    for j in layout.seasonal_columns() {
        penalties[j] = seasonality_penalty;
    }

    let beta = solve_ridge(&x, &y, &penalties)
        .ok_or_else(|| ForecastError::Solve("least squares system is ill-conditioned".to_string()))?;

    let mut model = FittedModel {
        layout,
        coefficients: beta.iter().copied().collect(),
        y_scale,
        changepoint_penalty,
        rmse: 0.0,
    };
    model.rmse = rmse(&model, dates, values);
    Ok(model)
}

fn rmse(model: &FittedModel, dates: &[NaiveDate], values: &[f64]) -> f64 {
    if dates.is_empty() {
        return 0.0;
    }
    let sse: f64 = dates
        .iter()
        .zip(values)
        .map(|(&d, &y)| {
            let r = y - model.predict(d).yhat;
            r * r
        })
        .sum();
    (sse / dates.len() as f64).sqrt()
}

/// Pick the changepoint penalty by holdout RMSE on the most recent dates.
///
/// Short histories skip the search and use `config.default_penalty`.
fn select_penalty(dates: &[NaiveDate], values: &[f64], config: &ForecastConfig) -> f64 {
    let n = dates.len();
    if n < config.min_dates_for_holdout || config.penalty_grid.is_empty() {
        return config.default_penalty;
    }

    let n_holdout = ((n as f64 * config.holdout_fraction).round() as usize).max(1);
    let n_train = n - n_holdout;
    if n_train < 2 {
        return config.default_penalty;
    }

    let (train_dates, test_dates) = dates.split_at(n_train);
    let (train_values, test_values) = values.split_at(n_train);
    let train_layout = ModelLayout::new(train_dates, config);

    // Evaluate candidates in parallel; each fit only reads the shared slices.
    let mut candidates: Vec<Candidate> = config
        .penalty_grid
        .par_iter()
        .filter_map(|&penalty| {
            let model = fit_with_penalty(
                train_layout.clone(),
                train_dates,
                train_values,
                penalty,
                config.seasonality_penalty,
            )
            .ok()?;
            let holdout_rmse = rmse(&model, test_dates, test_values);
            holdout_rmse.is_finite().then_some(Candidate { penalty, holdout_rmse })
        })
        .collect();

    // Lowest error wins; on ties prefer the stronger penalty (smoother trend).
    candidates.sort_by(|a, b| {
        a.holdout_rmse
            .partial_cmp(&b.holdout_rmse)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.penalty.partial_cmp(&a.penalty).unwrap_or(std::cmp::Ordering::Equal))
    });

    for c in &candidates {
        debug!(penalty = c.penalty, holdout_rmse = c.holdout_rmse, "changepoint penalty candidate");
    }

    candidates
        .first()
        .map(|c| c.penalty)
        .unwrap_or(config.default_penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
    }

    #[test]
    fn linear_series_is_recovered() {
        let dates = days(2);
        let values = [10.0, 20.0];
        let model = fit(&dates, &values, &ForecastConfig::default()).unwrap();
        assert!(model.rmse < 1e-9, "rmse={}", model.rmse);

        let next = model.predict(dates[1] + chrono::Days::new(1));
        assert!((next.yhat - 30.0).abs() < 1e-6, "yhat={}", next.yhat);
        assert_eq!(next.seasonal, 0.0);
    }

    #[test]
    fn weekly_pattern_is_captured() {
        let dates = days(8 * 7);
        let pattern = [5.0, 5.0, 5.0, 5.0, 5.0, 20.0, 20.0];
        let values: Vec<f64> = (0..dates.len()).map(|i| 50.0 + pattern[i % 7]).collect();

        let model = fit(&dates, &values, &ForecastConfig::default()).unwrap();
        assert!(model.layout.has_seasonality("weekly"));

        // Weekend uplift survives into the extrapolation.
        let last = *dates.last().unwrap();
        let weekday = model.predict(last + chrono::Days::new(1)).yhat;
        let weekend = model.predict(last + chrono::Days::new(6)).yhat;
        assert!(weekend > weekday + 5.0, "weekday={weekday} weekend={weekend}");
    }

    #[test]
    fn constant_zero_series_fits_flat() {
        let dates = days(12);
        let values = vec![0.0; 12];
        let model = fit(&dates, &values, &ForecastConfig::default()).unwrap();
        assert!(model.predict(dates[11] + chrono::Days::new(30)).yhat.abs() < 1e-9);
    }

    #[test]
    fn short_input_is_an_error_not_a_panic() {
        let config = ForecastConfig::default();
        assert!(matches!(fit(&[], &[], &config), Err(ForecastError::Solve(_))));
        assert!(matches!(fit(&days(1), &[3.0], &config), Err(ForecastError::Solve(_))));
        assert!(matches!(fit(&days(3), &[1.0, 2.0], &config), Err(ForecastError::Solve(_))));
    }
}
