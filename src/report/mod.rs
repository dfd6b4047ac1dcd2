//! Text rendering of dashboard panels and forecasts.

pub mod format;

pub use format::*;
