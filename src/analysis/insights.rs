//! Headline facts about the dataset.
//!
//! Each insight is optional: facts that the data cannot support (e.g. no decade
//! of reference rows) are omitted rather than reported as zero.

use serde::Serialize;

use crate::domain::{EntityKind, IncidentRecord};
use crate::stats::{dataset_aggregates, day_counts, survival_rate, top_entities, yearly_totals};

/// A single data-driven fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub title: String,
    pub text: String,
}

impl Insight {
    fn new(title: &str, text: String) -> Self {
        Self {
            title: title.to_string(),
            text,
        }
    }
}

/// Minimum souls aboard for a "miracle survival" candidate.
const MIRACLE_MIN_ABOARD: f64 = 50.0;
/// Survival rate (percent) a miracle must exceed.
const MIRACLE_MIN_SURVIVAL: f64 = 90.0;

/// Generate insights in a fixed order.
pub fn generate_insights(records: &[IncidentRecord]) -> Vec<Insight> {
    let mut out = Vec::new();
    if records.is_empty() {
        return out;
    }

    let yearly = yearly_totals(records);
    // First minimum / first maximum by year, like an index scan.
    let safest = yearly.iter().reduce(|best, y| if y.incidents < best.incidents { y } else { best });
    let worst = yearly.iter().reduce(|best, y| if y.incidents > best.incidents { y } else { best });
    if let Some(y) = safest {
        out.push(Insight::new(
            "Safest Year",
            format!("{} had only {} incidents - the safest year on record.", y.year, y.incidents),
        ));
    }
    if let Some(y) = worst {
        out.push(Insight::new(
            "Most Dangerous Year",
            format!("{} recorded {} incidents - the highest in the dataset.", y.year, y.incidents),
        ));
    }

    if let Some(top) = top_entities(records, EntityKind::Operator, 1).first() {
        out.push(Insight::new(
            "Most Incidents",
            format!(
                "{} has the most recorded incidents with {}.",
                top.entity_name, top.total_incidents
            ),
        ));
    }

    let total_aboard: f64 = records.iter().map(|r| r.aboard).sum();
    let total_fatalities: f64 = records.iter().map(|r| r.fatalities).sum();
    out.push(Insight::new(
        "Overall Survival Rate",
        format!(
            "{:.1}% of people aboard survived.",
            survival_rate(total_aboard, total_fatalities)
        ),
    ));

    let days: Vec<(&'static str, u64)> = day_counts(records)
        .into_iter()
        .map(|(day, n)| (day.display_name(), n))
        .collect();
    let busiest = extreme_by_name(&days, Extreme::Most);
    let quietest = extreme_by_name(&days, Extreme::Fewest);
    if let (Some((busy_day, busy_n)), Some((quiet_day, quiet_n))) = (busiest, quietest) {
        out.push(Insight::new(
            "Day Pattern",
            format!("{busy_day} has the most incidents ({busy_n}), while {quiet_day} has the fewest ({quiet_n})."),
        ));
    }

    let seasons: Vec<(&'static str, u64)> = dataset_aggregates(records)
        .season_counts
        .into_iter()
        .map(|(season, n)| (season.display_name(), n))
        .collect();
    if let Some((season, n)) = extreme_by_name(&seasons, Extreme::Most) {
        out.push(Insight::new(
            "Seasonal Pattern",
            format!("{season} is the most dangerous season with {n} incidents."),
        ));
    }

    if let Some(improvement) = decade_improvement(records) {
        out.push(Insight::new(
            "Safety Improvement",
            format!("Incidents per year changed by {improvement:.1}% between the 1980s and 2000 onwards (positive = fewer)."),
        ));
    }

    let ground: f64 = records.iter().map(|r| r.ground).sum();
    out.push(Insight::new(
        "Ground Impact",
        format!("{} ground casualties recorded.", ground.trunc() as u64),
    ));

    let deadliest = records
        .iter()
        .reduce(|best, r| if r.fatalities > best.fatalities { r } else { best });
    if let Some(r) = deadliest {
        out.push(Insight::new(
            "Deadliest Incident",
            format!(
                "The deadliest incident had {} fatalities ({}, {}).",
                r.fatalities.trunc() as u64,
                r.operator,
                r.year
            ),
        ));
    }

    let miracle = records.iter().find(|r| {
        r.aboard > MIRACLE_MIN_ABOARD && survival_rate(r.aboard, r.fatalities) > MIRACLE_MIN_SURVIVAL
    });
    if let Some(r) = miracle {
        out.push(Insight::new(
            "Miracle Survival",
            format!(
                "{} out of {} survived - a {:.1}% survival rate.",
                (r.aboard - r.fatalities).trunc() as i64,
                r.aboard.trunc() as u64,
                survival_rate(r.aboard, r.fatalities)
            ),
        ));
    }

    out
}

#[derive(Clone, Copy)]
enum Extreme {
    Most,
    Fewest,
}

/// Highest or lowest count; ties go to the alphabetically first name.
fn extreme_by_name(entries: &[(&'static str, u64)], extreme: Extreme) -> Option<(&'static str, u64)> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|&(name, _)| name);
    sorted.into_iter().reduce(|best, e| {
        let better = match extreme {
            Extreme::Most => e.1 > best.1,
            Extreme::Fewest => e.1 < best.1,
        };
        if better { e } else { best }
    })
}

/// Percentage drop in incidents per year, 1980s vs 2000 onwards.
///
/// Both periods are divided by ten years regardless of coverage.
fn decade_improvement(records: &[IncidentRecord]) -> Option<f64> {
    let recent = records.iter().filter(|r| r.year >= 2000).count();
    let older = records.iter().filter(|r| (1980..1990).contains(&r.year)).count();
    if recent == 0 || older == 0 {
        return None;
    }
    let recent_avg = recent as f64 / 10.0;
    let older_avg = older as f64 / 10.0;
    Some((older_avg - recent_avg) / older_avg * 100.0)
}
