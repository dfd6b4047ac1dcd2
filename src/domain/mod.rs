//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the loaded dataset row (`SalesRecord`) and the year filter (`YearFilter`)
//! - aggregation outputs (`SummaryTable` and its row types)
//! - forecast outputs (`ForecastSeries`, `ForecastPoint`, `ForecastFile`)

pub mod types;

pub use types::*;
