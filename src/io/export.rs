//! Export safety rankings.
//!
//! CSV is meant for spreadsheets; JSON carries the ranking metadata as well and
//! is the hand-off format for an external presentation layer.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{EntityKind, SafetyScoreResult};
use crate::error::AppError;
use crate::score::SafetyRanking;

/// A saved ranking file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingFile {
    pub tool: String,
    pub kind: EntityKind,
    pub max_year: i32,
    pub entries: Vec<SafetyScoreResult>,
}

/// Write one CSV row per ranked entity, safest first.
pub fn write_ranking_csv(path: &Path, ranking: &SafetyRanking) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_ranking_csv_to(file, ranking)
}

/// CSV writer over any sink (used by tests).
pub fn write_ranking_csv_to<W: std::io::Write>(sink: W, ranking: &SafetyRanking) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    for (idx, entry) in ranking.entries.iter().enumerate() {
        writer
            .serialize(CsvRow::new(idx + 1, entry))
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the ranking with metadata as pretty JSON.
pub fn write_ranking_json(path: &Path, ranking: &SafetyRanking) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let payload = RankingFile {
        tool: "avs".to_string(),
        kind: ranking.kind,
        max_year: ranking.max_year,
        entries: ranking.entries.clone(),
    };

    serde_json::to_writer_pretty(file, &payload)
        .map_err(|e| AppError::input(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// Read a ranking JSON file written by [`write_ranking_json`].
pub fn read_ranking_json(path: &Path) -> Result<RankingFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open ranking JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid ranking JSON: {e}")))
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    entity: &'a str,
    safety_score: String,
    grade: &'static str,
    total_incidents: u64,
    total_fatalities: u64,
    fatality_rate_percent: String,
}

impl<'a> CsvRow<'a> {
    fn new(rank: usize, entry: &'a SafetyScoreResult) -> Self {
        Self {
            rank,
            entity: &entry.entity_name,
            safety_score: format!("{:.2}", entry.score),
            grade: entry.grade.as_str(),
            total_incidents: entry.total_incidents,
            total_fatalities: entry.total_fatalities,
            fatality_rate_percent: format!("{:.2}", entry.fatality_rate_percent),
        }
    }
}
