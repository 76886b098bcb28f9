//! CSV ingest and normalization.
//!
//! This module turns the raw incident export into clean `IncidentRecord`s:
//!
//! - **Strict schema** for the columns every analysis needs (exit code 2)
//! - **Row-level validation**: rows with unusable dates are skipped and reported
//! - **Lenient values**: missing/invalid counts become `0`, missing text a placeholder
//!   (`Location` and the other descriptive columns are not read)
//! - **Encoding fallback**: fields that are not valid UTF-8 are decoded as Latin-1

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::ByteRecord;
use tracing::{info, warn};

use crate::domain::{IncidentRecord, Season};
use crate::error::AppError;

const UNKNOWN: &str = "Unknown";
const NO_SUMMARY: &str = "No details available";

const REQUIRED_COLUMNS: [&str; 3] = ["date", "operator", "type"];

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized records plus bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<IncidentRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }
}

/// Load and normalize an incident CSV from disk.
pub fn load_incidents(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open dataset '{}': {e}", path.display())))?;
    let data = read_incidents(file)?;
    info!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used(),
        skipped = data.row_errors.len(),
        "loaded incident dataset"
    );
    Ok(data)
}

/// Load and normalize incidents from any reader.
pub fn read_incidents<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .byte_headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.byte_records().enumerate() {
        // +2: header line, then 1-based numbering.
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&row, &header_map) {
            Ok(record) => records.push(record),
            Err(message) => {
                warn!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::no_data("No valid incident rows remain after normalization."));
    }

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &ByteRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(&decode_field(name)), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::input(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn parse_row(row: &ByteRecord, header_map: &HashMap<String, usize>) -> Result<IncidentRecord, String> {
    let raw_date = get_optional(row, header_map, "date").ok_or_else(|| "Missing `Date` value.".to_string())?;
    let date = parse_date(&raw_date)?;

    let year = date.year();
    let month = date.month();

    Ok(IncidentRecord {
        year,
        month,
        day_of_week: date.weekday().into(),
        season: Season::from_month(month),
        decade: year.div_euclid(10) * 10,

        operator: text_or(row, header_map, "operator", UNKNOWN),
        aircraft_type: text_or(row, header_map, "type", UNKNOWN),
        summary: text_or(row, header_map, "summary", NO_SUMMARY),

        aboard: count_or_zero(row, header_map, "aboard"),
        fatalities: count_or_zero(row, header_map, "fatalities"),
        ground: count_or_zero(row, header_map, "ground"),
    })
}

fn get_optional<'a>(row: &'a ByteRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<Cow<'a, str>> {
    let idx = header_map.get(name)?;
    let field = decode_field(row.get(*idx)?);
    if field.trim().is_empty() { None } else { Some(field) }
}

fn text_or(row: &ByteRecord, header_map: &HashMap<String, usize>, name: &str, fallback: &str) -> String {
    get_optional(row, header_map, name)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn count_or_zero(row: &ByteRecord, header_map: &HashMap<String, usize>, name: &str) -> f64 {
    get_optional(row, header_map, name)
        .and_then(|s| parse_opt_f64(&s))
        .unwrap_or(0.0)
}

/// UTF-8 if possible, otherwise Latin-1 (every byte maps to one code point).
fn decode_field(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The public crash export uses MM/DD/YYYY; ISO forms are accepted too.
    const FMTS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: MM/DD/YYYY, YYYY-MM-DD, YYYY/MM/DD."
    ))
}

fn parse_opt_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DayOfWeek;

    const SAMPLE: &str = "\u{feff}Date,Time,Location,Operator,Flight #,Route,Type,Registration,cn/In,Aboard,Fatalities,Ground,Summary
09/17/1908,17:18,\"Fort Myer, Virginia\",Military - U.S. Army,,Demonstration,Wright Flyer III,,1,2,1,0,\"During a demonstration flight, a U.S. Army flyer...\"
not-a-date,,Somewhere,Foo Air,,,DC-3,,,3,1,0,
1912-07-12,06:30,\"Atlantic City, New Jersey\",,,,Dirigible,,,5,,,
";

    #[test]
    fn parses_sample_rows_and_skips_bad_dates() {
        let data = read_incidents(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used(), 2);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 3);

        let first = &data.records[0];
        assert_eq!(first.year, 1908);
        assert_eq!(first.season, Season::Fall);
        assert_eq!(first.decade, 1900);
        assert_eq!(first.day_of_week, DayOfWeek::Thursday);
        assert_eq!(first.operator, "Military - U.S. Army");
        assert_eq!(first.aircraft_type, "Wright Flyer III");
        assert_eq!(first.aboard, 2.0);
        assert_eq!(first.fatalities, 1.0);
    }

    #[test]
    fn missing_values_get_defaults() {
        let data = read_incidents(SAMPLE.as_bytes()).unwrap();
        let second = &data.records[1];
        assert_eq!(second.operator, "Unknown");
        assert_eq!(second.fatalities, 0.0);
        assert_eq!(second.ground, 0.0);
        assert_eq!(second.aboard, 5.0);
        assert_eq!(second.summary, "No details available");
        assert_eq!(second.season, Season::Summer);
    }

    #[test]
    fn missing_required_column_is_input_error() {
        let err = read_incidents("Date,Operator\n01/01/2000,X\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("`type`"));
    }

    #[test]
    fn no_usable_rows_is_no_data_error() {
        let err = read_incidents("Date,Operator,Type\nnope,X,Y\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn latin1_fields_are_decoded() {
        let bytes: &[u8] = b"Date,Operator,Type\n01/02/1950,A\xe9ropostale,Latecoere\n";
        let data = read_incidents(bytes).unwrap();
        assert_eq!(data.records[0].operator, "A\u{e9}ropostale");
    }
}
