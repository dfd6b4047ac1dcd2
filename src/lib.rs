//! `fashion-demand` library crate.
//!
//! The binary (`demand`) is a thin wrapper around this library so that:
//!
//! - aggregation and forecasting are testable without a terminal
//! - the dashboard, report, and forecast commands share one data path

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
