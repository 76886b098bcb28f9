//! Relative risk of a hypothetical flight.
//!
//! This is a heuristic, not a validated risk model:
//!
//! ```text
//! total = clamp(50 + operator_factor + seasonal_factor + day_factor, 0, 100)
//! operator_factor = (100 - safety_score) / 2            (0 without a score)
//! seasonal_factor = (count[s] - mean) / mean * 10       (0 if absent or mean == 0)
//! day_factor      = (count[d] - mean) / mean * 10       (same guards)
//! ```

use std::collections::BTreeMap;

use crate::domain::{DatasetAggregates, DayOfWeek, IncidentAggregate, RiskEstimate, RiskLabel, Season};
use crate::score::safety::{self, SCORE_MAX};

/// Neutral risk level every estimate starts from.
pub const BASE_RISK: f64 = 50.0;
/// Scale applied to the relative deviation of a season/day count from the mean.
pub const CALENDAR_FACTOR_SCALE: f64 = 10.0;
/// Totals strictly below this are `LOW`.
pub const LOW_RISK_CEILING: f64 = 40.0;
/// Totals strictly below this (and not `LOW`) are `MODERATE`.
pub const MODERATE_RISK_CEILING: f64 = 70.0;

/// Estimate risk for an optional operator, a season and a day of week.
///
/// `operator` is the operator's aggregate when one was requested; pass `None` for
/// the dataset-average case. An operator without incidents contributes nothing.
pub fn estimate_risk(
    operator: Option<&IncidentAggregate>,
    season: Season,
    day: DayOfWeek,
    context: &DatasetAggregates,
) -> RiskEstimate {
    let operator_factor = operator.map_or(0.0, |agg| operator_factor(agg, context.max_year));
    let seasonal_factor = calendar_factor(&context.season_counts, &season);
    let day_factor = calendar_factor(&context.day_counts, &day);

    compose(operator_factor, seasonal_factor, day_factor)
}

/// Combine already-computed factors into a clamped, labelled estimate.
pub fn compose(operator_factor: f64, seasonal_factor: f64, day_factor: f64) -> RiskEstimate {
    let sum = BASE_RISK + operator_factor + seasonal_factor + day_factor;
    let total_risk = if sum.is_finite() { sum.clamp(0.0, SCORE_MAX) } else { BASE_RISK };

    RiskEstimate {
        total_risk,
        label: label_for(total_risk),
        operator_factor,
        seasonal_factor,
        day_factor,
    }
}

pub fn label_for(total_risk: f64) -> RiskLabel {
    if total_risk < LOW_RISK_CEILING {
        RiskLabel::Low
    } else if total_risk < MODERATE_RISK_CEILING {
        RiskLabel::Moderate
    } else {
        RiskLabel::High
    }
}

fn operator_factor(aggregate: &IncidentAggregate, max_year: i32) -> f64 {
    match safety::score(aggregate, max_year).scored() {
        Some(result) => (SCORE_MAX - result.score) / 2.0,
        None => 0.0,
    }
}

/// Relative deviation of `key`'s count from the mean of all present counts.
fn calendar_factor<K: Ord>(counts: &BTreeMap<K, u64>, key: &K) -> f64 {
    let Some(&count) = counts.get(key) else {
        return 0.0;
    };
    let mean = counts.values().map(|&c| c as f64).sum::<f64>() / counts.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    (count as f64 - mean) / mean * CALENDAR_FACTOR_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_context() -> DatasetAggregates {
        DatasetAggregates {
            season_counts: Season::ALL.iter().map(|&s| (s, 25)).collect(),
            day_counts: DayOfWeek::ALL.iter().map(|&d| (d, 10)).collect(),
            max_year: 2009,
        }
    }

    #[test]
    fn neutral_inputs_give_base_risk() {
        let estimate = estimate_risk(None, Season::Summer, DayOfWeek::Friday, &even_context());
        assert_eq!(estimate.total_risk, 50.0);
        assert_eq!(estimate.label, RiskLabel::Moderate);
        assert_eq!(estimate.operator_factor, 0.0);
        assert_eq!(estimate.seasonal_factor, 0.0);
        assert_eq!(estimate.day_factor, 0.0);
    }

    #[test]
    fn total_is_clamped_to_range() {
        let high = compose(60.0, 10.0, 10.0);
        assert_eq!(high.total_risk, 100.0);
        assert_eq!(high.label, RiskLabel::High);
        assert_eq!(high.operator_factor, 60.0);

        let low = compose(0.0, -40.0, -30.0);
        assert_eq!(low.total_risk, 0.0);
        assert_eq!(low.label, RiskLabel::Low);
    }

    #[test]
    fn label_boundaries() {
        assert_eq!(label_for(39.99), RiskLabel::Low);
        assert_eq!(label_for(40.0), RiskLabel::Moderate);
        assert_eq!(label_for(69.99), RiskLabel::Moderate);
        assert_eq!(label_for(70.0), RiskLabel::High);
    }

    #[test]
    fn seasonal_and_day_factors_follow_relative_deviation() {
        let mut context = even_context();
        // mean = (40 + 20 + 20 + 20) / 4 = 25 → (40 - 25) / 25 * 10 = 6
        context.season_counts.insert(Season::Winter, 40);
        context.season_counts.insert(Season::Spring, 20);
        context.season_counts.insert(Season::Summer, 20);
        context.season_counts.insert(Season::Fall, 20);

        let estimate = estimate_risk(None, Season::Winter, DayOfWeek::Monday, &context);
        assert!((estimate.seasonal_factor - 6.0).abs() < 1e-12);
        assert!((estimate.total_risk - 56.0).abs() < 1e-12);

        let estimate = estimate_risk(None, Season::Spring, DayOfWeek::Monday, &context);
        assert!((estimate.seasonal_factor + 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_buckets_and_zero_means_contribute_nothing() {
        let mut context = DatasetAggregates::default();
        context.season_counts.insert(Season::Winter, 0);
        let estimate = estimate_risk(None, Season::Winter, DayOfWeek::Sunday, &context);
        assert_eq!(estimate.seasonal_factor, 0.0);
        assert_eq!(estimate.day_factor, 0.0);
        assert_eq!(estimate.total_risk, 50.0);
    }

    #[test]
    fn operator_factor_uses_safety_score() {
        let agg = IncidentAggregate {
            entity_name: "Test Air".to_string(),
            total_incidents: 10,
            total_fatalities: 500.0,
            total_aboard: 600.0,
            incident_years: vec![2009; 10],
        };
        let estimate = estimate_risk(Some(&agg), Season::Fall, DayOfWeek::Monday, &even_context());
        // score = 26.5833.. → factor = 36.7083..
        assert!((estimate.operator_factor - 36.708_333).abs() < 1e-4);
        assert_eq!(estimate.label, RiskLabel::High);
    }

    #[test]
    fn operator_without_incidents_contributes_nothing() {
        let agg = IncidentAggregate {
            entity_name: "Ghost Air".to_string(),
            total_incidents: 0,
            total_fatalities: 0.0,
            total_aboard: 0.0,
            incident_years: vec![],
        };
        let estimate = estimate_risk(Some(&agg), Season::Fall, DayOfWeek::Monday, &even_context());
        assert_eq!(estimate.operator_factor, 0.0);
        assert_eq!(estimate.total_risk, 50.0);
    }
}
