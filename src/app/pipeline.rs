//! Shared dataset loading used by every command:
//! resolve path -> ingest CSV -> dataset-wide aggregates

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::DatasetAggregates;
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_incidents};
use crate::stats::dataset_aggregates;

/// Environment variable naming the dataset CSV (also read from `.env`).
pub const DATASET_ENV: &str = "AVS_DATASET";
/// Dataset path used when neither the flag nor the environment names one.
pub const DEFAULT_DATASET: &str = "data/dataset.csv";

/// Loaded records plus the dataset-wide aggregates every scorer needs.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub ingest: IngestedData,
    pub context: DatasetAggregates,
}

/// `--data`, then `AVS_DATASET` (process env or `.env`), then the default path.
pub fn resolve_dataset_path(flag: Option<&Path>) -> PathBuf {
    dotenvy::dotenv().ok();
    choose_dataset_path(flag, std::env::var(DATASET_ENV).ok())
}

fn choose_dataset_path(flag: Option<&Path>, env_value: Option<String>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    match env_value {
        Some(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => PathBuf::from(DEFAULT_DATASET),
    }
}

/// Ingest the dataset and compute its aggregates.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let ingest = load_incidents(path)?;
    let context = dataset_aggregates(&ingest.records);
    info!(
        max_year = context.max_year,
        seasons = context.season_counts.len(),
        days = context.day_counts.len(),
        "computed dataset aggregates"
    );
    Ok(Dataset { ingest, context })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_env() {
        let path = choose_dataset_path(Some(Path::new("flag.csv")), Some("env.csv".to_string()));
        assert_eq!(path, PathBuf::from("flag.csv"));
    }

    #[test]
    fn env_then_default() {
        assert_eq!(choose_dataset_path(None, Some(" env.csv ".to_string())), PathBuf::from("env.csv"));
        assert_eq!(choose_dataset_path(None, Some(String::new())), PathBuf::from(DEFAULT_DATASET));
        assert_eq!(choose_dataset_path(None, None), PathBuf::from(DEFAULT_DATASET));
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_dataset(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
