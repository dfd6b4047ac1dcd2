//! Design matrix layout for the additive forecast model.
//!
//! Columns, in order:
//!
//! - `1` (intercept) and `t` (base growth), with `t` the history scaled to [0, 1]
//! - one hinge `max(0, t - s_j)` per trend changepoint `s_j`
//! - `sin(2πkd/P)`, `cos(2πkd/P)` for each seasonality of period `P` days and
//!   `k = 1..=order`, with `d` the absolute day number
//!
//! Seasonal terms use absolute days rather than scaled time so that their
//! phase does not depend on where the history happens to start.

use std::f64::consts::PI;
use std::ops::Range;

use chrono::NaiveDate;
use tracing::debug;

use super::ForecastConfig;

/// A Fourier seasonality block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    pub period_days: f64,
    pub order: usize,
}

impl Seasonality {
    pub fn width(&self) -> usize {
        2 * self.order
    }
}

/// Column layout derived from a set of history dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLayout {
    origin: NaiveDate,
    span_days: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
}

impl ModelLayout {
    /// Build the layout for ascending, distinct `dates`.
    ///
    /// An empty slice gives a bare intercept + growth layout.
    pub fn new(dates: &[NaiveDate], config: &ForecastConfig) -> Self {
        let (Some(&origin), Some(&last)) = (dates.first(), dates.last()) else {
            return Self {
                origin: NaiveDate::default(),
                span_days: 1.0,
                changepoints: Vec::new(),
                seasonalities: Vec::new(),
            };
        };
        let span = (last - origin).num_days();
        let span_days = span.max(1) as f64;

        let mut layout = Self {
            origin,
            span_days,
            changepoints: Vec::new(),
            seasonalities: Vec::new(),
        };

        layout.changepoints = changepoint_indices(dates.len(), config.n_changepoints, config.changepoint_range)
            .into_iter()
            .map(|idx| layout.scaled_time(dates[idx]))
            .collect();

        let candidates = [
            (
                Seasonality {
                    name: "weekly",
                    period_days: 7.0,
                    order: config.weekly_order,
                },
                config.weekly_min_span_days,
            ),
            (
                Seasonality {
                    name: "yearly",
                    period_days: 365.25,
                    order: config.yearly_order,
                },
                config.yearly_min_span_days,
            ),
        ];
        for (season, min_span) in candidates {
            if season.order == 0 || span < min_span {
                continue;
            }
            // Each Fourier block needs more observations than it has columns.
            if dates.len() <= season.width() {
                debug!(
                    seasonality = season.name,
                    n_dates = dates.len(),
                    columns = season.width(),
                    "too few observations, seasonality skipped"
                );
                continue;
            }
            layout.seasonalities.push(season);
        }

        layout
    }

    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    pub fn has_seasonality(&self, name: &str) -> bool {
        self.seasonalities.iter().any(|s| s.name == name)
    }

    pub fn n_columns(&self) -> usize {
        2 + self.changepoints.len() + self.seasonalities.iter().map(Seasonality::width).sum::<usize>()
    }

    /// Intercept, growth and changepoint columns.
    pub fn trend_columns(&self) -> Range<usize> {
        0..2 + self.changepoints.len()
    }

    pub fn changepoint_columns(&self) -> Range<usize> {
        2..2 + self.changepoints.len()
    }

    pub fn seasonal_columns(&self) -> Range<usize> {
        self.trend_columns().end..self.n_columns()
    }

    /// Days since the first history date, scaled so the last history date is 1.
    pub fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64 / self.span_days
    }

    /// Fill one design row for `date`.
    ///
    /// # Panics
    /// Panics if `out.len() != self.n_columns()`.
    pub fn fill_row(&self, date: NaiveDate, out: &mut [f64]) {
        assert_eq!(out.len(), self.n_columns(), "design row width mismatch");

        let t = self.scaled_time(date);
        out[0] = 1.0;
        out[1] = t;
        for (j, &s) in self.changepoints.iter().enumerate() {
            out[2 + j] = (t - s).max(0.0);
        }

        let day = absolute_day(date);
        let mut col = self.trend_columns().end;
        for season in &self.seasonalities {
            for k in 1..=season.order {
                let angle = 2.0 * PI * k as f64 * day / season.period_days;
                out[col] = angle.sin();
                out[col + 1] = angle.cos();
                col += 2;
            }
        }
    }
}

/// Days since 1970-01-01.
fn absolute_day(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}

/// History indices used as changepoints.
///
/// Candidates are spread evenly over the first `range` fraction of the
/// history; the first date is never a changepoint. The count is capped so
/// there is at least one history date per changepoint.
fn changepoint_indices(n_dates: usize, max_changepoints: usize, range: f64) -> Vec<usize> {
    let hist_size = ((n_dates as f64) * range).floor() as usize;
    let n_cp = max_changepoints.min(hist_size.saturating_sub(1));
    if n_cp == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    (1..=n_cp)
        .map(|i| (last * i as f64 / n_cp as f64).round() as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
    }

    #[test]
    fn two_dates_give_plain_linear_trend() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let layout = ModelLayout::new(&days(start, 2), &ForecastConfig::default());
        assert!(layout.changepoints().is_empty());
        assert_eq!(layout.n_columns(), 2);
        assert_eq!(layout.scaled_time(start + chrono::Days::new(1)), 1.0);
    }

    #[test]
    fn seasonalities_follow_history_span() {
        let config = ForecastConfig::default();
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

        let short = ModelLayout::new(&days(start, 10), &config);
        assert!(!short.has_seasonality("weekly"));

        let month = ModelLayout::new(&days(start, 30), &config);
        assert!(month.has_seasonality("weekly"));
        assert!(!month.has_seasonality("yearly"));

        let long = ModelLayout::new(&days(start, 800), &config);
        assert!(long.has_seasonality("yearly"));
        assert_eq!(
            long.n_columns(),
            2 + config.n_changepoints + 2 * config.weekly_order + 2 * config.yearly_order
        );
    }

    #[test]
    fn changepoints_stay_in_leading_range_and_increase() {
        let idx = changepoint_indices(100, 25, 0.8);
        assert_eq!(idx.len(), 25);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        assert!(idx[0] > 0);
        assert_eq!(*idx.last().unwrap(), 79);

        assert_eq!(changepoint_indices(5, 25, 0.8), vec![1, 2, 3]);
        assert!(changepoint_indices(2, 25, 0.8).is_empty());
    }

    #[test]
    fn hinge_columns_are_zero_before_changepoint() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let dates = days(start, 20);
        let layout = ModelLayout::new(&dates, &ForecastConfig::default());
        let mut row = vec![0.0; layout.n_columns()];
        layout.fill_row(start, &mut row);
        assert_eq!(row[0], 1.0);
        assert_eq!(row[1], 0.0);
        assert!(row[layout.changepoint_columns()].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn sparse_history_gets_no_seasonality() {
        let d = |day| NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
        let layout = ModelLayout::new(&[d(1), d(3), d(20)], &ForecastConfig::default());
        assert!(!layout.has_seasonality("weekly"));
        assert_eq!(layout.seasonal_columns().len(), 0);

        // Seven observations are enough for the 6 weekly columns.
        let config = ForecastConfig {
            weekly_min_span_days: 6,
            ..ForecastConfig::default()
        };
        let weekly = ModelLayout::new(&days(d(1), 7), &config);
        assert!(weekly.has_seasonality("weekly"));
    }

    #[test]
    fn empty_history_does_not_panic() {
        let layout = ModelLayout::new(&[], &ForecastConfig::default());
        assert_eq!(layout.n_columns(), 2);
        assert!(layout.changepoints().is_empty());
    }
}
