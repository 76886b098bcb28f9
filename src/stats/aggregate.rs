//! Aggregations over normalized incident records.
//!
//! Everything here is a plain group-by over `&[IncidentRecord]`; the scorers only
//! ever see the resulting counts.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{
    DatasetAggregates, DayOfWeek, EntityKind, IncidentAggregate, IncidentReason, IncidentRecord, Season,
    YearlyTotals,
};

/// Estimated cost per incident, in millions.
pub const COST_PER_INCIDENT_MILLIONS: f64 = 50.0;
/// Estimated cost per fatality, in millions.
pub const COST_PER_FATALITY_MILLIONS: f64 = 1.5;
/// Operators need at least this many incidents to appear in the cost table.
pub const COST_MIN_INCIDENTS: u64 = 2;
/// Rows kept in the cost table.
pub const COST_TOP_N: usize = 12;

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Per-season totals (all four seasons, zero-filled).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStats {
    pub season: Season,
    pub incidents: u64,
    pub fatalities: f64,
    pub aboard: f64,
    pub avg_fatalities: f64,
    /// Share of all incidents in the selection, in percent.
    pub percentage: f64,
}

/// Direction of the fatality rate compared to the previous decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecadeTrend {
    Stable,
    Improving,
    Worsening,
}

impl DecadeTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            DecadeTrend::Stable => "Stable",
            DecadeTrend::Improving => "Improving",
            DecadeTrend::Worsening => "Worsening",
        }
    }
}

/// Per-decade totals, ascending by decade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecadeStats {
    pub decade: i32,
    pub incidents: u64,
    pub fatalities: f64,
    pub aboard: f64,
    pub avg_fatalities: f64,
    pub fatality_rate: f64,
    pub trend: DecadeTrend,
}

/// Incidents per calendar month (1-based), zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthStats {
    pub month: u32,
    pub incidents: u64,
    pub fatalities: f64,
}

impl MonthStats {
    pub fn abbrev(&self) -> &'static str {
        month_abbrev(self.month)
    }
}

/// Per-weekday totals with survival rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub day: DayOfWeek,
    pub incidents: u64,
    pub fatalities: f64,
    pub aboard: f64,
    pub avg_fatalities: f64,
    pub survival_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonStats {
    pub reason: IncidentReason,
    pub incidents: u64,
    pub percentage: f64,
}

/// Rough financial impact of one operator's incidents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorCost {
    pub operator: String,
    pub incidents: u64,
    pub fatalities: f64,
    pub cost_millions: f64,
    pub fatality_rate: f64,
}

/// Everything the `stats` report prints for one selection of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdowns {
    pub seasons: Vec<SeasonStats>,
    pub months: Vec<MonthStats>,
    pub days: Vec<DayStats>,
    pub decades: Vec<DecadeStats>,
    pub reasons: Vec<ReasonStats>,
    pub costs: Vec<OperatorCost>,
}

/// Aggregate every record belonging to `name`.
///
/// An unknown name yields an aggregate with zero incidents.
pub fn aggregate_entity(records: &[IncidentRecord], kind: EntityKind, name: &str) -> IncidentAggregate {
    let mut agg = empty_aggregate(name);
    for r in records.iter().filter(|r| r.entity_name(kind) == name) {
        push_record(&mut agg, r);
    }
    agg
}

/// Aggregate all entities of one kind, most incidents first (ties by name).
pub fn entity_aggregates(records: &[IncidentRecord], kind: EntityKind) -> Vec<IncidentAggregate> {
    let mut by_name: HashMap<&str, IncidentAggregate> = HashMap::new();
    for r in records {
        let name = r.entity_name(kind);
        let agg = by_name.entry(name).or_insert_with(|| empty_aggregate(name));
        push_record(agg, r);
    }

    let mut out: Vec<IncidentAggregate> = by_name.into_values().collect();
    out.sort_by(|a, b| {
        b.total_incidents
            .cmp(&a.total_incidents)
            .then_with(|| a.entity_name.cmp(&b.entity_name))
    });
    out
}

/// The `n` entities with the most incidents.
pub fn top_entities(records: &[IncidentRecord], kind: EntityKind, n: usize) -> Vec<IncidentAggregate> {
    let mut all = entity_aggregates(records, kind);
    all.truncate(n);
    all
}

/// Season/day counts and the latest year, as consumed by the risk estimator.
pub fn dataset_aggregates(records: &[IncidentRecord]) -> DatasetAggregates {
    let mut season_counts = BTreeMap::new();
    for r in records {
        *season_counts.entry(r.season).or_insert(0) += 1;
    }

    DatasetAggregates {
        season_counts,
        day_counts: day_counts(records),
        max_year: records.iter().map(|r| r.year).max().unwrap_or(0),
    }
}

/// Incident counts per day of week (only days that occur).
pub fn day_counts(records: &[IncidentRecord]) -> BTreeMap<DayOfWeek, u64> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.day_of_week).or_insert(0) += 1;
    }
    counts
}

/// Per-year totals, ascending by year.
pub fn yearly_totals(records: &[IncidentRecord]) -> Vec<YearlyTotals> {
    let mut by_year: BTreeMap<i32, YearlyTotals> = BTreeMap::new();
    for r in records {
        let entry = by_year.entry(r.year).or_insert(YearlyTotals {
            year: r.year,
            incidents: 0,
            fatalities: 0.0,
            aboard: 0.0,
        });
        entry.incidents += 1;
        entry.fatalities += r.fatalities;
        entry.aboard += r.aboard;
    }
    by_year.into_values().collect()
}

/// Seasonal breakdown in Winter, Spring, Summer, Fall order.
pub fn season_breakdown(records: &[IncidentRecord]) -> Vec<SeasonStats> {
    let total = records.len() as f64;
    Season::ALL
        .iter()
        .map(|&season| {
            let (incidents, fatalities, aboard) = records
                .iter()
                .filter(|r| r.season == season)
                .fold((0u64, 0.0, 0.0), |(n, f, a), r| (n + 1, f + r.fatalities, a + r.aboard));
            SeasonStats {
                season,
                incidents,
                fatalities,
                aboard,
                // Zero-incident seasons divide by 1, leaving 0.
                avg_fatalities: fatalities / incidents.max(1) as f64,
                percentage: if total > 0.0 { incidents as f64 / total * 100.0 } else { 0.0 },
            }
        })
        .collect()
}

/// Decade breakdown with fatality-rate trend against the previous decade.
pub fn decade_breakdown(records: &[IncidentRecord]) -> Vec<DecadeStats> {
    let mut by_decade: BTreeMap<i32, (u64, f64, f64)> = BTreeMap::new();
    for r in records {
        let entry = by_decade.entry(r.decade).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += r.fatalities;
        entry.2 += r.aboard;
    }

    let mut out: Vec<DecadeStats> = Vec::with_capacity(by_decade.len());
    for (decade, (incidents, fatalities, aboard)) in by_decade {
        let fatality_rate = if aboard > 0.0 { fatalities / aboard * 100.0 } else { 0.0 };
        let trend = match out.last() {
            None => DecadeTrend::Stable,
            Some(prev) if fatality_rate < prev.fatality_rate => DecadeTrend::Improving,
            Some(_) => DecadeTrend::Worsening,
        };
        out.push(DecadeStats {
            decade,
            incidents,
            fatalities,
            aboard,
            avg_fatalities: fatalities / incidents as f64,
            fatality_rate,
            trend,
        });
    }
    out
}

/// Monthly incident and fatality pattern, January first.
pub fn monthly_breakdown(records: &[IncidentRecord]) -> Vec<MonthStats> {
    (1..=12u32)
        .map(|month| {
            let (incidents, fatalities) = records
                .iter()
                .filter(|r| r.month == month)
                .fold((0u64, 0.0), |(n, f), r| (n + 1, f + r.fatalities));
            MonthStats {
                month,
                incidents,
                fatalities,
            }
        })
        .collect()
}

/// Per-weekday breakdown, Monday first, zero-filled.
pub fn day_breakdown(records: &[IncidentRecord]) -> Vec<DayStats> {
    DayOfWeek::ALL
        .iter()
        .map(|&day| {
            let (incidents, fatalities, aboard) = records
                .iter()
                .filter(|r| r.day_of_week == day)
                .fold((0u64, 0.0, 0.0), |(n, f, a), r| (n + 1, f + r.fatalities, a + r.aboard));
            DayStats {
                day,
                incidents,
                fatalities,
                aboard,
                avg_fatalities: fatalities / incidents.max(1) as f64,
                survival_rate: survival_rate(aboard, fatalities),
            }
        })
        .collect()
}

/// Incident counts per inferred reason, most common first (ties in enum order).
///
/// Reasons with no incidents are left out.
pub fn reason_breakdown(records: &[IncidentRecord]) -> Vec<ReasonStats> {
    let mut counts: BTreeMap<IncidentReason, u64> = BTreeMap::new();
    for r in records {
        *counts.entry(r.reason()).or_insert(0) += 1;
    }

    let total = records.len() as f64;
    let mut out: Vec<ReasonStats> = counts
        .into_iter()
        .map(|(reason, incidents)| ReasonStats {
            reason,
            incidents,
            percentage: incidents as f64 / total * 100.0,
        })
        .collect();
    // Stable sort keeps enum order among equal counts.
    out.sort_by(|a, b| b.incidents.cmp(&a.incidents));
    out
}

/// Costliest operators: `incidents * 50 + fatalities * 1.5` (millions).
///
/// `Unknown` operators and operators with fewer than two incidents are skipped.
pub fn operator_costs(records: &[IncidentRecord], top_n: usize) -> Vec<OperatorCost> {
    let mut out: Vec<OperatorCost> = entity_aggregates(records, EntityKind::Operator)
        .into_iter()
        .filter(|agg| agg.entity_name != "Unknown" && agg.total_incidents >= COST_MIN_INCIDENTS)
        .map(|agg| OperatorCost {
            cost_millions: agg.total_incidents as f64 * COST_PER_INCIDENT_MILLIONS
                + agg.total_fatalities * COST_PER_FATALITY_MILLIONS,
            fatality_rate: if agg.total_aboard > 0.0 {
                agg.total_fatalities / agg.total_aboard * 100.0
            } else {
                0.0
            },
            incidents: agg.total_incidents,
            fatalities: agg.total_fatalities,
            operator: agg.entity_name,
        })
        .collect();

    out.sort_by(|a, b| {
        b.cost_millions
            .total_cmp(&a.cost_millions)
            .then_with(|| a.operator.cmp(&b.operator))
    });
    out.truncate(top_n);
    out
}

/// All `stats` breakdowns for one selection.
pub fn breakdowns(records: &[IncidentRecord]) -> Breakdowns {
    Breakdowns {
        seasons: season_breakdown(records),
        months: monthly_breakdown(records),
        days: day_breakdown(records),
        decades: decade_breakdown(records),
        reasons: reason_breakdown(records),
        costs: operator_costs(records, COST_TOP_N),
    }
}

/// `(aboard - fatalities) / aboard * 100`, 0 when nobody was aboard.
pub fn survival_rate(aboard: f64, fatalities: f64) -> f64 {
    if aboard > 0.0 {
        (aboard - fatalities) / aboard * 100.0
    } else {
        0.0
    }
}

/// Three-letter English month name; `"?"` outside 1..=12.
pub fn month_abbrev(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_ABBREVS.get(idx as usize))
        .copied()
        .unwrap_or("?")
}

/// Records whose year lies in `[from, to]` (either bound optional).
pub fn filter_years(records: &[IncidentRecord], from: Option<i32>, to: Option<i32>) -> Vec<IncidentRecord> {
    records
        .iter()
        .filter(|r| from.is_none_or(|y| r.year >= y) && to.is_none_or(|y| r.year <= y))
        .cloned()
        .collect()
}

fn empty_aggregate(name: &str) -> IncidentAggregate {
    IncidentAggregate {
        entity_name: name.to_string(),
        total_incidents: 0,
        total_fatalities: 0.0,
        total_aboard: 0.0,
        incident_years: Vec::new(),
    }
}

fn push_record(agg: &mut IncidentAggregate, r: &IncidentRecord) {
    agg.total_incidents += 1;
    agg.total_fatalities += r.fatalities;
    agg.total_aboard += r.aboard;
    agg.incident_years.push(r.year);
}
