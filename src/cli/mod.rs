//! Command-line parsing for the aviation safety analytics tool.
//!
//! Argument parsing and command dispatch stay separate from the scoring and
//! statistics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::analysis::{DEFAULT_Z_THRESHOLD, MAX_FORECAST_YEARS};
use crate::domain::{DayOfWeek, EntityKind, Season};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "avs", version, about = "Aviation incident safety scores and risk estimates")]
pub struct Cli {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Dataset location shared by every command.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Incident CSV (falls back to `AVS_DATASET`, then `data/dataset.csv`).
    #[arg(long, global = true, value_name = "CSV")]
    pub data: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Safety score and grade for one operator or aircraft type.
    Score(ScoreArgs),
    /// Safety ranking of the entities with the most incidents.
    Rank(RankArgs),
    /// Print a ranking previously exported with `rank --export-json`.
    Show(ShowArgs),
    /// Relative risk of a hypothetical flight.
    Risk(RiskArgs),
    /// Forecast yearly incident counts with a quadratic trend.
    Trend(TrendArgs),
    /// Years with unusually many incidents or fatalities.
    Anomalies(AnomalyArgs),
    /// Seasonal, day-of-week and decade breakdowns.
    Stats(StatsArgs),
    /// Headline facts about the dataset (default command).
    Insights,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Operator name or aircraft type, exactly as it appears in the dataset.
    pub entity: String,

    /// Whether `entity` is an operator or an aircraft type.
    #[arg(long, value_enum, default_value_t = EntityKind::Operator)]
    pub kind: EntityKind,
}

#[derive(Debug, Args, Clone)]
pub struct RankArgs {
    #[arg(long, value_enum, default_value_t = EntityKind::Operator)]
    pub kind: EntityKind,

    /// Rank the N entities with the most incidents.
    #[arg(long, default_value_t = 15)]
    pub top: usize,

    /// Export the ranking to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the ranking (with metadata) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Ranking JSON produced by `avs rank --export-json`.
    #[arg(long, value_name = "JSON")]
    pub ranking: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct RiskArgs {
    /// Operator to assess; omit for the dataset average.
    #[arg(long)]
    pub operator: Option<String>,

    #[arg(long, value_enum)]
    pub season: Season,

    #[arg(long, value_enum)]
    pub day: DayOfWeek,
}

#[derive(Debug, Args, Clone)]
pub struct TrendArgs {
    /// Number of years to forecast after the last observed year.
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u16).range(1..=i64::from(MAX_FORECAST_YEARS))
    )]
    pub years: u16,
}

#[derive(Debug, Args, Clone)]
pub struct AnomalyArgs {
    /// Absolute z-score above which a year is flagged.
    #[arg(long, default_value_t = DEFAULT_Z_THRESHOLD)]
    pub threshold: f64,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    /// First year to include.
    #[arg(long)]
    pub from: Option<i32>,

    /// Last year to include.
    #[arg(long)]
    pub to: Option<i32>,
}
