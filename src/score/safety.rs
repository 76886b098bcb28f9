//! Per-entity safety score.
//!
//! The score combines three capped subscores into a "raw" risk figure and
//! inverts it:
//!
//! ```text
//! incident = min(incidents / 50 * 100, 100)
//! fatality = min(fatality_rate_percent, 100)
//! severity = min(avg_fatalities_per_incident / 200 * 100, 100)
//! raw      = 0.3 * incident + 0.4 * fatality + 0.3 * severity
//! score    = max(0, 100 - raw) * recency_multiplier
//! ```
//!
//! `recency_multiplier` is a penalty: it stays `1.0` only when fewer than 30% of
//! the entity's incidents fall inside the last 20 years of the dataset, and
//! halves the score otherwise.
//!
//! Every division is guarded and every output is clamped; inconsistent
//! aggregates (fatalities above aboard, NaNs) never produce errors.

use tracing::debug;

use crate::domain::{Grade, IncidentAggregate, SafetyScoreResult, ScoreOutcome};

/// Weight of the incident-count subscore.
pub const INCIDENT_WEIGHT: f64 = 0.3;
/// Weight of the fatality-rate subscore.
pub const FATALITY_WEIGHT: f64 = 0.4;
/// Weight of the per-incident severity subscore.
pub const SEVERITY_WEIGHT: f64 = 0.3;

/// Incident count that saturates the incident subscore.
pub const INCIDENT_NORMALIZER: f64 = 50.0;
/// Fatality rate (percent) that saturates the fatality subscore.
pub const FATALITY_RATE_NORMALIZER: f64 = 100.0;
/// Average fatalities per incident that saturates the severity subscore.
pub const SEVERITY_NORMALIZER: f64 = 200.0;

/// Width of the recency window, counted back from the dataset's latest year.
pub const RECENCY_WINDOW_YEARS: i32 = 20;
/// Share of incidents inside the window below which no penalty applies.
pub const RECENT_SHARE_THRESHOLD: f64 = 0.3;
/// Multiplier applied when recent incidents are not rare.
pub const RECENCY_PENALTY: f64 = 0.5;

/// Upper bound of scores, subscores and percentages.
pub const SCORE_MAX: f64 = 100.0;

/// Intermediate figures of a score, exposed for reports and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub fatality_rate_percent: f64,
    pub avg_fatalities_per_incident: f64,
    pub incident_subscore: f64,
    pub fatality_subscore: f64,
    pub severity_subscore: f64,
    pub raw: f64,
    pub recent_count: usize,
    pub recency_multiplier: f64,
    pub score: f64,
}

/// Score an entity against the dataset's latest year.
///
/// Returns [`ScoreOutcome::NoData`] when the aggregate has no incidents.
pub fn score(aggregate: &IncidentAggregate, max_year_overall: i32) -> ScoreOutcome {
    let Some(breakdown) = breakdown(aggregate, max_year_overall) else {
        debug!(entity = %aggregate.entity_name, "no incidents; returning no-data sentinel");
        return ScoreOutcome::NoData {
            entity_name: aggregate.entity_name.clone(),
        };
    };

    debug!(
        entity = %aggregate.entity_name,
        raw = breakdown.raw,
        recent = breakdown.recent_count,
        score = breakdown.score,
        "scored entity"
    );

    ScoreOutcome::Scored(SafetyScoreResult {
        entity_name: aggregate.entity_name.clone(),
        score: breakdown.score,
        grade: grade_for(breakdown.score),
        total_incidents: aggregate.total_incidents,
        total_fatalities: whole_count(aggregate.total_fatalities),
        fatality_rate_percent: breakdown.fatality_rate_percent,
        avg_fatalities_per_incident: breakdown.avg_fatalities_per_incident,
    })
}

/// Compute all intermediate figures, or `None` for an entity without incidents.
pub fn breakdown(aggregate: &IncidentAggregate, max_year_overall: i32) -> Option<ScoreBreakdown> {
    if aggregate.total_incidents == 0 {
        return None;
    }

    let incidents = aggregate.total_incidents as f64;
    let fatalities = non_negative(aggregate.total_fatalities);
    let aboard = non_negative(aggregate.total_aboard);

    let fatality_rate = if aboard > 0.0 {
        fatalities / aboard * 100.0
    } else {
        0.0
    };
    let avg_fatalities = fatalities / incidents;

    let incident_subscore = capped(incidents / INCIDENT_NORMALIZER * 100.0);
    let fatality_subscore = capped(fatality_rate / FATALITY_RATE_NORMALIZER * 100.0);
    let severity_subscore = capped(avg_fatalities / SEVERITY_NORMALIZER * 100.0);

    let raw = INCIDENT_WEIGHT * incident_subscore
        + FATALITY_WEIGHT * fatality_subscore
        + SEVERITY_WEIGHT * severity_subscore;

    let recent_count = recent_incident_count(&aggregate.incident_years, max_year_overall);
    let recency_multiplier = recency_multiplier(recent_count, aggregate.total_incidents);

    let score = capped((SCORE_MAX - raw).max(0.0) * recency_multiplier);

    Some(ScoreBreakdown {
        fatality_rate_percent: capped(fatality_rate),
        avg_fatalities_per_incident: avg_fatalities,
        incident_subscore,
        fatality_subscore,
        severity_subscore,
        raw,
        recent_count,
        recency_multiplier,
        score,
    })
}

/// Number of incidents dated inside the recency window.
pub fn recent_incident_count(years: &[i32], max_year_overall: i32) -> usize {
    let cutoff = max_year_overall.saturating_sub(RECENCY_WINDOW_YEARS);
    years.iter().filter(|&&y| y >= cutoff).count()
}

/// `1.0` when `recent_count < 0.3 * total_incidents`, else the penalty.
pub fn recency_multiplier(recent_count: usize, total_incidents: u64) -> f64 {
    if (recent_count as f64) < RECENT_SHARE_THRESHOLD * total_incidents as f64 {
        1.0
    } else {
        RECENCY_PENALTY
    }
}

/// Map a score to its grade (inclusive lower bounds).
pub fn grade_for(score: f64) -> Grade {
    if score >= 90.0 {
        Grade::APlus
    } else if score >= 80.0 {
        Grade::A
    } else if score >= 70.0 {
        Grade::B
    } else if score >= 60.0 {
        Grade::C
    } else if score >= 50.0 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Clamp into `[0, 100]`; non-finite values collapse to 0.
fn capped(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, SCORE_MAX) } else { 0.0 }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn whole_count(v: f64) -> u64 {
    // Truncation matches how fractional fatality totals are displayed.
    non_negative(v).trunc() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn aggregate(incidents: u64, fatalities: f64, aboard: f64, years: Vec<i32>) -> IncidentAggregate {
        IncidentAggregate {
            entity_name: "Test Air".to_string(),
            total_incidents: incidents,
            total_fatalities: fatalities,
            total_aboard: aboard,
            incident_years: years,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let sum = INCIDENT_WEIGHT + FATALITY_WEIGHT + SEVERITY_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(INCIDENT_NORMALIZER, 50.0);
        assert_eq!(FATALITY_RATE_NORMALIZER, 100.0);
        assert_eq!(SEVERITY_NORMALIZER, 200.0);
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(grade_for(100.0), Grade::APlus);
        assert_eq!(grade_for(90.0), Grade::APlus);
        assert_eq!(grade_for(89.9), Grade::A);
        assert_eq!(grade_for(80.0), Grade::A);
        assert_eq!(grade_for(70.0), Grade::B);
        assert_eq!(grade_for(60.0), Grade::C);
        assert_eq!(grade_for(50.0), Grade::D);
        assert_eq!(grade_for(49.9), Grade::F);
        assert_eq!(grade_for(0.0), Grade::F);
    }

    #[test]
    fn zero_incidents_is_no_data() {
        let agg = aggregate(0, 0.0, 0.0, vec![]);
        let outcome = score(&agg, 2020);
        assert_eq!(
            outcome,
            ScoreOutcome::NoData {
                entity_name: "Test Air".to_string()
            }
        );
        assert!(breakdown(&agg, 2020).is_none());
    }

    #[test]
    fn zero_aboard_gives_zero_fatality_rate() {
        let agg = aggregate(3, 0.0, 0.0, vec![1950, 1951, 1952]);
        let result = score(&agg, 2020).into_scored().unwrap();
        assert_eq!(result.fatality_rate_percent, 0.0);
        assert!(result.score.is_finite());
    }

    #[test]
    fn recency_multiplier_direction() {
        // All incidents long before the window: no penalty.
        let old = aggregate(5, 10.0, 100.0, vec![1970, 1975, 1980, 1985, 1990]);
        let b = breakdown(&old, 2020).unwrap();
        assert_eq!(b.recent_count, 0);
        assert_eq!(b.recency_multiplier, 1.0);

        // All incidents recent: penalized.
        let recent = aggregate(5, 10.0, 100.0, vec![2019; 5]);
        let b = breakdown(&recent, 2020).unwrap();
        assert_eq!(b.recent_count, 5);
        assert_eq!(b.recency_multiplier, 0.5);
    }

    #[test]
    fn recency_window_is_inclusive() {
        assert_eq!(recent_incident_count(&[1999, 2000, 2001], 2020), 2);
        // 3 of 10 is not strictly below 30%.
        assert_eq!(recency_multiplier(3, 10), 0.5);
        assert_eq!(recency_multiplier(2, 10), 1.0);
    }

    #[test]
    fn end_to_end_example() {
        let agg = aggregate(10, 500.0, 600.0, vec![2019; 10]);
        let b = breakdown(&agg, 2019).unwrap();

        assert!((b.fatality_rate_percent - 83.333_333).abs() < 1e-4);
        assert!((b.avg_fatalities_per_incident - 50.0).abs() < 1e-12);
        assert!((b.incident_subscore - 20.0).abs() < 1e-12);
        assert!((b.fatality_subscore - 83.333_333).abs() < 1e-4);
        assert!((b.severity_subscore - 25.0).abs() < 1e-12);
        assert!((b.raw - 46.833_333).abs() < 1e-4);
        assert_eq!(b.recency_multiplier, 0.5);
        assert!((b.score - 26.583_333).abs() < 1e-4);

        let result = score(&agg, 2019).into_scored().unwrap();
        assert_eq!(result.grade, Grade::F);
        assert_eq!(result.total_incidents, 10);
        assert_eq!(result.total_fatalities, 500);
    }

    #[test]
    fn fatalities_exceeding_aboard_are_clamped() {
        let agg = aggregate(2, 900.0, 100.0, vec![1960, 1961]);
        let result = score(&agg, 2020).into_scored().unwrap();
        assert_eq!(result.fatality_rate_percent, 100.0);
        assert!((0.0..=100.0).contains(&result.score));
    }

    #[test]
    fn clean_record_scores_high() {
        let agg = aggregate(1, 0.0, 50.0, vec![1950]);
        let result = score(&agg, 2020).into_scored().unwrap();
        // raw = 0.3 * 2 = 0.6
        assert!((result.score - 99.4).abs() < 1e-9);
        assert_eq!(result.grade, Grade::APlus);
    }

    #[test]
    fn non_finite_inputs_do_not_leak() {
        let agg = aggregate(4, f64::NAN, f64::INFINITY, vec![2000; 4]);
        let result = score(&agg, 2010).into_scored().unwrap();
        assert!(result.score.is_finite());
        assert!(result.fatality_rate_percent.is_finite());
    }

    proptest! {
        #[test]
        fn score_and_rate_stay_in_bounds(
            incidents in 0u64..5_000,
            fatalities in 0.0f64..1.0e6,
            aboard in 0.0f64..1.0e6,
            years in proptest::collection::vec(1900i32..2030, 0..50),
            max_year in 1900i32..2030,
        ) {
            let agg = aggregate(incidents, fatalities, aboard, years);
            match score(&agg, max_year) {
                ScoreOutcome::Scored(result) => {
                    prop_assert!((0.0..=100.0).contains(&result.score));
                    prop_assert!((0.0..=100.0).contains(&result.fatality_rate_percent));
                    prop_assert_eq!(result.grade, grade_for(result.score));
                }
                ScoreOutcome::NoData { .. } => prop_assert_eq!(incidents, 0),
            }
        }
    }
}
