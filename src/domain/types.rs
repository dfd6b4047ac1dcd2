//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the aggregation and forecasting code
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One row of the source dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub units_sold: f64,
    pub stock_levels: f64,
    /// Taken as-is from the source; not checked against `price * units_sold`.
    pub revenue: f64,
    /// Calendar year of `date`, derived once at load.
    pub year: i32,
}

impl SalesRecord {
    /// Build a record, deriving `year` from `date`.
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        brand: impl Into<String>,
        price: f64,
        units_sold: f64,
        stock_levels: f64,
        revenue: f64,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            brand: brand.into(),
            price,
            units_sold,
            stock_levels,
            revenue,
            year: date.year(),
        }
    }

    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::UnitsSold => self.units_sold,
            Measure::Revenue => self.revenue,
            Measure::StockLevels => self.stock_levels,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Category => &self.category,
            Dimension::Brand => &self.brand,
        }
    }
}

/// The single active year constraint of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

impl YearFilter {
    pub fn matches(self, year: i32) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(y) => y == year,
        }
    }

    /// Label used in panel titles and the selector.
    pub fn label(self) -> String {
        match self {
            YearFilter::All => "All Years".to_string(),
            YearFilter::Year(y) => y.to_string(),
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => write!(f, "all"),
            YearFilter::Year(y) => write!(f, "{y}"),
        }
    }
}

impl FromStr for YearFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(YearFilter::All);
        }
        s.parse::<i32>()
            .map(YearFilter::Year)
            .map_err(|_| format!("Invalid year '{s}'. Expected `all` or a year such as 2023."))
    }
}

/// Numeric column summed by an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    UnitsSold,
    Revenue,
    StockLevels,
}

impl Measure {
    pub fn label(self) -> &'static str {
        match self {
            Measure::UnitsSold => "Units_Sold",
            Measure::Revenue => "Revenue",
            Measure::StockLevels => "Stock_Levels",
        }
    }
}

/// Categorical column used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category,
    Brand,
}

impl Dimension {
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Category => "Category",
            Dimension::Brand => "Brand",
        }
    }
}

/// How a summary table is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Pie,
}

/// Which dashboard view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum View {
    /// Sales, category, price/demand, stock and revenue panels.
    #[default]
    Overview,
    /// Category and brand share panels.
    Shares,
}

impl View {
    pub fn toggle(self) -> Self {
        match self {
            View::Overview => View::Shares,
            View::Shares => View::Overview,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            View::Overview => "Fashion Demand Forecasting Dashboard",
            View::Shares => "Fashion Demand Forecasting - Pie Chart Dashboard",
        }
    }
}

/// Sum of a measure on one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Sum of a measure for one category/brand.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSum {
    pub key: String,
    pub value: f64,
}

/// A group sum together with its fraction of the table total.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub key: String,
    pub value: f64,
    pub fraction: f64,
}

/// One unaggregated record projected for the price/demand scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub price: f64,
    pub units_sold: f64,
    pub category: String,
}

/// A chart-ready projection of the (filtered) record set.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryTable {
    Series(Vec<DatePoint>),
    Groups(Vec<GroupSum>),
    Shares(Vec<Share>),
    Scatter(Vec<ScatterPoint>),
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        match self {
            SummaryTable::Series(v) => v.len(),
            SummaryTable::Groups(v) => v.len(),
            SummaryTable::Shares(v) => v.len(),
            SummaryTable::Scatter(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One predicted day of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub seasonal: f64,
    /// Observed daily units for history dates; `None` in the extension.
    pub observed: Option<f64>,
    pub is_future: bool,
}

/// Diagnostics of the fitted forecast model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFit {
    pub n_dates: usize,
    pub n_changepoints: usize,
    pub weekly: bool,
    pub yearly: bool,
    pub changepoint_penalty: f64,
    /// In-sample RMSE in units sold.
    pub rmse: f64,
}

/// Fitted history plus the forward extension for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub category: String,
    pub first_observed: NaiveDate,
    pub last_observed: NaiveDate,
    pub horizon_days: u32,
    pub fit: ForecastFit,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn history(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| !p.is_future)
    }

    pub fn future(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.is_future)
    }
}

/// A saved forecast file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub dataset: String,
    pub series: ForecastSeries,
}
