//! Formatted terminal output.
//!
//! Formatting lives in one place so the scoring/statistics code stays free of
//! presentation concerns and output changes are localized.

use crate::analysis::{Insight, TrendForecast, YearAnomaly};
use crate::domain::{EntityKind, Grade, IncidentAggregate, RiskEstimate, ScoreOutcome, YearlyTotals};
use crate::io::ingest::IngestedData;
use crate::io::export::RankingFile;
use crate::score::SafetyRanking;
use crate::stats::Breakdowns;

/// One-line dataset summary printed above every report.
pub fn format_dataset_header(data: &IngestedData, max_year: i32) -> String {
    let min_year = data.records.iter().map(|r| r.year).min().unwrap_or(max_year);
    let mut out = format!(
        "=== avs - Aviation Safety Analytics ===\nRecords: {} used / {} read | years {}-{}\n",
        data.rows_used(),
        data.rows_read,
        min_year,
        max_year
    );
    if !data.row_errors.is_empty() {
        out.push_str(&format!("Skipped rows: {}\n", data.row_errors.len()));
    }
    out
}

/// A single entity's score (or the no-data placeholder).
pub fn format_score(outcome: &ScoreOutcome, kind: EntityKind, aggregate: &IncidentAggregate) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}: {}\n", kind.display_name(), outcome.entity_name()));

    let Some(result) = outcome.scored() else {
        out.push_str("No data: no incidents recorded for this entity.\n");
        return out;
    };

    out.push_str(&format!(
        "Safety score: {:.2} / 100  (grade {} - {})\n",
        result.score,
        result.grade,
        result.grade.description()
    ));
    out.push_str(&format!("- incidents        : {}\n", result.total_incidents));
    out.push_str(&format!("- fatalities       : {}\n", result.total_fatalities));
    out.push_str(&format!("- aboard           : {}\n", aggregate.total_aboard.trunc() as u64));
    out.push_str(&format!("- fatality rate    : {:.2}%\n", result.fatality_rate_percent));
    out.push_str(&format!("- avg fatalities   : {:.2} per incident\n", result.avg_fatalities_per_incident));
    out
}

/// Ranking table, safest first.
pub fn format_ranking(ranking: &SafetyRanking) -> String {
    let mut out = format!("Safety ranking by {} (latest year {}):\n", ranking.kind.display_name().to_lowercase(), ranking.max_year);
    out.push_str(&ranking_table(
        ranking.entries.iter().map(|e| (e.entity_name.as_str(), e.score, e.grade, e.total_incidents, e.total_fatalities, e.fatality_rate_percent)),
    ));
    out.push('\n');
    out.push_str(&format_grade_legend());
    out
}

/// Ranking table from a previously exported JSON file.
pub fn format_ranking_file(file: &RankingFile) -> String {
    let mut out = format!(
        "Saved ranking by {} (latest year {}, written by {}):\n",
        file.kind.display_name().to_lowercase(),
        file.max_year,
        file.tool
    );
    out.push_str(&ranking_table(
        file.entries.iter().map(|e| (e.entity_name.as_str(), e.score, e.grade, e.total_incidents, e.total_fatalities, e.fatality_rate_percent)),
    ));
    out
}

fn ranking_table<'a>(rows: impl Iterator<Item = (&'a str, f64, Grade, u64, u64, f64)>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:<36} {:>8} {:<5} {:>9} {:>10} {:>9}",
        "#", "entity", "score", "grade", "incidents", "fatalities", "rate%"
    ));
    out.push('\n');
    out.push_str(&format!(
        "{:->4} {:-<36} {:->8} {:-<5} {:->9} {:->10} {:->9}",
        "", "", "", "", "", "", ""
    ));
    out.push('\n');

    for (idx, (name, score, grade, incidents, fatalities, rate)) in rows.enumerate() {
        out.push_str(&format!(
            "{:>4} {:<36} {:>8.2} {:<5} {:>9} {:>10} {:>9.2}",
            idx + 1,
            truncate(name, 36),
            score,
            grade.as_str(),
            incidents,
            fatalities,
            rate
        ));
        out.push('\n');
    }
    out
}

fn format_grade_legend() -> String {
    let mut out = String::from("Grades:");
    let bands = [
        (Grade::APlus, "90-100"),
        (Grade::A, "80-89"),
        (Grade::B, "70-79"),
        (Grade::C, "60-69"),
        (Grade::D, "50-59"),
        (Grade::F, "<50"),
    ];
    for (grade, band) in bands {
        out.push_str(&format!(" {} {band}", grade.as_str()));
    }
    out.push('\n');
    out
}

/// Risk estimate with its contributing factors.
pub fn format_risk(estimate: &RiskEstimate, operator: Option<&str>, season: &str, day: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Flight: operator={} | season={season} | day={day}\n",
        operator.unwrap_or("Average")
    ));
    out.push_str(&format!("Risk: {:.0}/100 - {} RISK\n", estimate.total_risk, estimate.label));
    out.push_str("Contributing factors:\n");
    out.push_str(&format!("- operator    : {:+.1} points\n", estimate.operator_factor));
    out.push_str(&format!("- seasonal    : {:+.1} points\n", estimate.seasonal_factor));
    out.push_str(&format!("- day of week : {:+.1} points\n", estimate.day_factor));
    out.push_str("Relative heuristic from historical records; not a flight safety assessment.\n");
    out
}

/// Trend fit summary plus forecast rows.
pub fn format_trend(trend: &TrendForecast, yearly: &[YearlyTotals]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Quadratic trend over {} years (R² = {:.3}), last observed {}:\n",
        yearly.len(),
        trend.fit.r_squared,
        trend.last_observed_year
    ));
    if let Some(last) = yearly.last() {
        out.push_str(&format!("  {} observed: {} incidents\n", last.year, last.incidents));
    }
    for p in &trend.forecast {
        out.push_str(&format!("  {} forecast: {:.1} incidents\n", p.year, p.predicted_incidents));
    }
    out
}

pub fn format_anomalies(anomalies: &[YearAnomaly], threshold: f64) -> String {
    let mut out = format!("Anomalous years (|z| > {threshold:.1}):\n");
    if anomalies.is_empty() {
        out.push_str("  none\n");
        return out;
    }
    out.push_str(&format!(
        "{:>6} {:>9} {:>10} {:>8} {:>8}  {}\n",
        "year", "incidents", "fatalities", "z_inc", "z_fat", "type"
    ));
    for a in anomalies {
        out.push_str(&format!(
            "{:>6} {:>9} {:>10} {:>8.2} {:>8.2}  {}\n",
            a.year,
            a.incidents,
            a.fatalities.trunc() as u64,
            a.incident_z,
            a.fatality_z,
            a.kind.as_str()
        ));
    }
    out
}

pub fn format_insights(insights: &[Insight]) -> String {
    let mut out = String::from("Insights:\n");
    for insight in insights {
        out.push_str(&format!("- {}: {}\n", insight.title, insight.text));
    }
    out
}

/// Seasonal, monthly, day-of-week, decade, reason and cost breakdowns.
pub fn format_breakdowns(b: &Breakdowns) -> String {
    let mut out = String::from("By season:\n");
    for s in &b.seasons {
        out.push_str(&format!(
            "  {:<7} {:>6} incidents {:>8} fatalities {:>6.1}% avg {:.1}/incident\n",
            s.season.display_name(),
            s.incidents,
            s.fatalities.trunc() as u64,
            s.percentage,
            s.avg_fatalities
        ));
    }

    out.push_str("\nBy month:\n");
    for m in &b.months {
        out.push_str(&format!(
            "  {:<3} {:>6} incidents {:>8} fatalities\n",
            m.abbrev(),
            m.incidents,
            m.fatalities.trunc() as u64
        ));
    }

    out.push_str("\nBy day of week:\n");
    for d in &b.days {
        out.push_str(&format!(
            "  {:<9} {:>6} incidents avg {:>6.1} fatalities survival {:>6.1}%\n",
            d.day.display_name(),
            d.incidents,
            d.avg_fatalities,
            d.survival_rate
        ));
    }

    out.push_str("\nBy decade:\n");
    for d in &b.decades {
        out.push_str(&format!(
            "  {}s {:>6} incidents {:>8} fatalities rate {:>6.2}% avg {:>6.1}  {}\n",
            d.decade,
            d.incidents,
            d.fatalities.trunc() as u64,
            d.fatality_rate,
            d.avg_fatalities,
            d.trend.as_str()
        ));
    }

    out.push_str("\nBy reason (summary keywords):\n");
    for r in &b.reasons {
        out.push_str(&format!(
            "  {:<11} {:>6} incidents {:>6.1}%\n",
            r.reason.display_name(),
            r.incidents,
            r.percentage
        ));
    }

    out.push_str("\nEstimated cost by operator (USD millions, >= 2 incidents):\n");
    if b.costs.is_empty() {
        out.push_str("  none\n");
    }
    for c in &b.costs {
        out.push_str(&format!(
            "  {:<36} {:>10.1} ({} incidents, {} fatalities, rate {:.1}%)\n",
            truncate(&c.operator, 36),
            c.cost_millions,
            c.incidents,
            c.fatalities.trunc() as u64,
            c.fatality_rate
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RiskLabel, SafetyScoreResult};

    #[test]
    fn score_report_handles_no_data() {
        let agg = IncidentAggregate {
            entity_name: "Ghost Air".to_string(),
            total_incidents: 0,
            total_fatalities: 0.0,
            total_aboard: 0.0,
            incident_years: vec![],
        };
        let outcome = ScoreOutcome::NoData {
            entity_name: "Ghost Air".to_string(),
        };
        let text = format_score(&outcome, EntityKind::Operator, &agg);
        assert!(text.contains("Operator: Ghost Air"));
        assert!(text.contains("No data"));
    }

    #[test]
    fn ranking_rows_are_numbered() {
        let ranking = SafetyRanking {
            kind: EntityKind::AircraftType,
            max_year: 2009,
            entries: vec![SafetyScoreResult {
                entity_name: "Douglas DC-3".to_string(),
                score: 12.5,
                grade: Grade::F,
                total_incidents: 334,
                total_fatalities: 4793,
                fatality_rate_percent: 82.1,
                avg_fatalities_per_incident: 14.35,
            }],
        };
        let text = format_ranking(&ranking);
        assert!(text.starts_with("Safety ranking by aircraft type"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("1 Douglas DC-3")));
    }

    #[test]
    fn risk_report_shows_signed_factors() {
        let estimate = RiskEstimate {
            total_risk: 56.0,
            label: RiskLabel::Moderate,
            operator_factor: 0.0,
            seasonal_factor: 6.0,
            day_factor: -2.5,
        };
        let text = format_risk(&estimate, None, "Winter", "Monday");
        assert!(text.contains("operator=Average"));
        assert!(text.contains("56/100 - MODERATE RISK"));
        assert!(text.contains("+6.0 points"));
        assert!(text.contains("-2.5 points"));
    }

    #[test]
    fn breakdowns_list_every_section() {
        use crate::stats::aggregate::tests::record;

        let mut records = vec![
            record("1990-03-05", "Alpha", 100.0, 10.0),
            record("1991-03-06", "Alpha", 50.0, 50.0),
        ];
        records[0].summary = "Engine fire after takeoff".to_string();
        let text = format_breakdowns(&crate::stats::breakdowns(&records));

        for heading in ["By season:", "By month:", "By day of week:", "By decade:", "By reason", "Estimated cost"] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.lines().any(|l| l.trim_start().starts_with("Mar") && l.contains("2 incidents")));
        assert!(text.lines().any(|l| l.trim_start().starts_with("Mechanical")));
        // 2 * 50 + 60 * 1.5
        assert!(text.contains("190.0"));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
