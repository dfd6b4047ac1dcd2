//! Dataset location.
//!
//! Resolution order: `--data`, then `DEMAND_DATASET` (a `.env` file is
//! loaded first), then [`DEFAULT_DATASET_PATH`].

use std::path::PathBuf;

/// Environment variable naming the dataset CSV.
pub const DATASET_ENV: &str = "DEMAND_DATASET";

pub const DEFAULT_DATASET_PATH: &str = "dataset/fashion_demand_forecasting_dataset.csv";

/// Resolve the dataset path for this invocation.
pub fn resolve_dataset_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    dotenvy::dotenv().ok();
    pick(None, std::env::var(DATASET_ENV).ok())
}

fn pick(flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    flag.or_else(|| env.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env() {
        let path = pick(Some(PathBuf::from("a.csv")), Some("b.csv".to_string()));
        assert_eq!(path, PathBuf::from("a.csv"));
    }

    #[test]
    fn env_beats_default() {
        assert_eq!(pick(None, Some("b.csv".to_string())), PathBuf::from("b.csv"));
    }

    #[test]
    fn blank_env_falls_back_to_default() {
        assert_eq!(pick(None, Some("  ".to_string())), PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(pick(None, None), PathBuf::from(DEFAULT_DATASET_PATH));
    }

    #[test]
    fn explicit_flag_is_used_verbatim() {
        assert_eq!(resolve_dataset_path(Some(PathBuf::from("x.csv"))), PathBuf::from("x.csv"));
    }
}
