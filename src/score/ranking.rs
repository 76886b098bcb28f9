//! Batch scoring: safety ranking of the most frequently involved entities.

use rayon::prelude::*;
use tracing::info;

use crate::domain::{EntityKind, IncidentRecord, SafetyScoreResult};
use crate::score::safety;
use crate::stats::top_entities;

/// Safety ranking for one entity kind, safest first.
#[derive(Debug, Clone)]
pub struct SafetyRanking {
    pub kind: EntityKind,
    pub max_year: i32,
    pub entries: Vec<SafetyScoreResult>,
}

/// Score the `top_n` entities with the most incidents and sort by score.
///
/// Entities are scored independently (parallel); ties are broken by name so the
/// output is deterministic.
pub fn rank_entities(records: &[IncidentRecord], kind: EntityKind, top_n: usize, max_year: i32) -> SafetyRanking {
    let aggregates = top_entities(records, kind, top_n);

    let mut entries: Vec<SafetyScoreResult> = aggregates
        .par_iter()
        .filter_map(|agg| safety::score(agg, max_year).into_scored())
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.entity_name.cmp(&b.entity_name))
    });

    info!(kind = kind.display_name(), scored = entries.len(), "ranked entities");

    SafetyRanking {
        kind,
        max_year,
        entries,
    }
}
