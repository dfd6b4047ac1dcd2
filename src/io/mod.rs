//! Input/output helpers.
//!
//! - CSV ingest into an immutable `Dataset` (`ingest`)
//! - forecast and report exports (CSV) (`export`)
//! - forecast JSON read/write (`forecast_file`)

pub mod export;
pub mod forecast_file;
pub mod ingest;

pub use export::*;
pub use forecast_file::*;
pub use ingest::*;
