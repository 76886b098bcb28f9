//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - produced by ingest/aggregation
//! - consumed by the scorers
//! - exported to CSV/JSON for downstream presentation

use std::collections::BTreeMap;

use chrono::Weekday;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which entity an aggregate (and therefore a safety score) describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Airline / operator name.
    Operator,
    /// Aircraft type string (e.g. "Douglas DC-3").
    #[serde(rename = "type")]
    #[value(name = "type")]
    AircraftType,
}

impl EntityKind {
    pub fn display_name(self) -> &'static str {
        match self {
            EntityKind::Operator => "Operator",
            EntityKind::AircraftType => "Aircraft type",
        }
    }
}

/// Meteorological season derived from the incident month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Dec–Feb winter, Mar–May spring, Jun–Aug summer, everything else fall.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

/// Day of week, Monday first.
///
/// `chrono::Weekday` has no `ValueEnum`/`Ord`, so the CLI and the count maps use this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// A normalized incident row.
///
/// Numeric columns that were missing or unparsable upstream are already
/// coerced to `0.0`, and text columns to a placeholder.
#[derive(Debug, Clone)]
pub struct IncidentRecord {
    pub year: i32,
    pub month: u32,
    pub day_of_week: DayOfWeek,
    pub season: Season,
    pub decade: i32,

    pub operator: String,
    pub aircraft_type: String,
    pub summary: String,

    pub aboard: f64,
    pub fatalities: f64,
    pub ground: f64,
}

impl IncidentRecord {
    pub fn entity_name(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Operator => &self.operator,
            EntityKind::AircraftType => &self.aircraft_type,
        }
    }

    pub fn reason(&self) -> IncidentReason {
        IncidentReason::from_summary(&self.summary)
    }
}

/// Coarse incident cause inferred from keywords in the free-text summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncidentReason {
    Weather,
    Mechanical,
    HumanError,
    Fire,
    Other,
}

impl IncidentReason {
    pub const ALL: [IncidentReason; 5] = [
        IncidentReason::Weather,
        IncidentReason::Mechanical,
        IncidentReason::HumanError,
        IncidentReason::Fire,
        IncidentReason::Other,
    ];

    /// First matching rule wins: weather/storm, engine/mechanical, pilot/crew, fire.
    pub fn from_summary(summary: &str) -> Self {
        let text = summary.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));
        if mentions(&["weather", "storm"]) {
            IncidentReason::Weather
        } else if mentions(&["engine", "mechanical"]) {
            IncidentReason::Mechanical
        } else if mentions(&["pilot", "crew"]) {
            IncidentReason::HumanError
        } else if mentions(&["fire"]) {
            IncidentReason::Fire
        } else {
            IncidentReason::Other
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            IncidentReason::Weather => "Weather",
            IncidentReason::Mechanical => "Mechanical",
            IncidentReason::HumanError => "Human Error",
            IncidentReason::Fire => "Fire",
            IncidentReason::Other => "Other",
        }
    }
}

/// Pre-computed counts for one entity.
///
/// `total_fatalities <= total_aboard` is not guaranteed; scorers clamp instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentAggregate {
    pub entity_name: String,
    pub total_incidents: u64,
    pub total_fatalities: f64,
    pub total_aboard: f64,
    /// One entry per incident (duplicates are meaningful).
    pub incident_years: Vec<i32>,
}

/// Letter grade for a safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// Short description of the band, for report legends.
    pub fn description(self) -> &'static str {
        match self {
            Grade::APlus => "Excellent safety record",
            Grade::A => "Very good safety record",
            Grade::B => "Good safety record",
            Grade::C => "Average safety record",
            Grade::D => "Below average safety record",
            Grade::F => "Poor safety record",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyScoreResult {
    pub entity_name: String,
    /// `[0, 100]`, higher is safer.
    pub score: f64,
    pub grade: Grade,
    pub total_incidents: u64,
    pub total_fatalities: u64,
    /// `[0, 100]`.
    pub fatality_rate_percent: f64,
    pub avg_fatalities_per_incident: f64,
}

/// Result of scoring an entity: either a score or the explicit "no data" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored(SafetyScoreResult),
    NoData { entity_name: String },
}

impl ScoreOutcome {
    pub fn scored(&self) -> Option<&SafetyScoreResult> {
        match self {
            ScoreOutcome::Scored(result) => Some(result),
            ScoreOutcome::NoData { .. } => None,
        }
    }

    pub fn into_scored(self) -> Option<SafetyScoreResult> {
        match self {
            ScoreOutcome::Scored(result) => Some(result),
            ScoreOutcome::NoData { .. } => None,
        }
    }

    pub fn entity_name(&self) -> &str {
        match self {
            ScoreOutcome::Scored(result) => &result.entity_name,
            ScoreOutcome::NoData { entity_name } => entity_name,
        }
    }
}

/// Qualitative tier for a risk estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Low,
    Moderate,
    High,
}

impl RiskLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLabel::Low => "LOW",
            RiskLabel::Moderate => "MODERATE",
            RiskLabel::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite risk for a hypothetical flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    /// `[0, 100]`.
    pub total_risk: f64,
    pub label: RiskLabel,
    pub operator_factor: f64,
    pub seasonal_factor: f64,
    pub day_factor: f64,
}

/// Dataset-wide counts consumed by the risk estimator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetAggregates {
    /// Only seasons that occur in the data are present.
    pub season_counts: BTreeMap<Season, u64>,
    /// Only days that occur in the data are present.
    pub day_counts: BTreeMap<DayOfWeek, u64>,
    /// Latest year present in the whole dataset.
    pub max_year: i32,
}

/// Per-year totals.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyTotals {
    pub year: i32,
    pub incidents: u64,
    pub fatalities: f64,
    pub aboard: f64,
}
