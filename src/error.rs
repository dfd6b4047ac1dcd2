//! Error types.
//!
//! `AppError` is the process-level error: it carries the exit code the binary
//! should terminate with. Library code that callers may want to branch on
//! (e.g. the forecast shell re-prompting on an unknown category) returns a
//! typed error instead and converts into `AppError` at the edge.

use thiserror::Error;

/// Exit code for bad input: unreadable dataset, unknown category, bad flags.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for valid input that does not carry enough history to model.
pub const EXIT_INSUFFICIENT_DATA: u8 = 3;
/// Exit code for terminal and numerical runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Shorthand for a dataset/usage error (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the forecasting engine.
///
/// A category with no records at all is *not* an error; see
/// `forecast::forecast_records`, which signals it with `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("Invalid product '{category}'. Please choose from: {}", .valid.join(", "))]
    UnknownCategory { category: String, valid: Vec<String> },

    #[error(
        "Not enough history to forecast '{category}': {distinct_dates} distinct sale date(s), need at least 2."
    )]
    InsufficientData { category: String, distinct_dates: usize },

    #[error("Forecast model could not be solved: {0}")]
    Solve(String),
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let code = match &err {
            ForecastError::UnknownCategory { .. } => EXIT_INPUT,
            ForecastError::InsufficientData { .. } => EXIT_INSUFFICIENT_DATA,
            ForecastError::Solve(_) => EXIT_RUNTIME,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_lists_valid_set() {
        let err = ForecastError::UnknownCategory {
            category: "Hat".to_string(),
            valid: vec!["Dress".to_string(), "Shirt".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid product 'Hat'. Please choose from: Dress, Shirt"
        );
        assert_eq!(AppError::from(err).exit_code(), EXIT_INPUT);
    }

    #[test]
    fn insufficient_data_maps_to_its_own_exit_code() {
        let err = ForecastError::InsufficientData {
            category: "Dress".to_string(),
            distinct_dates: 1,
        };
        assert_eq!(AppError::from(err).exit_code(), EXIT_INSUFFICIENT_DATA);
    }
}
