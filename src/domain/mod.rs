//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - calendar/entity enums shared by the CLI and the aggregations (`Season`, `DayOfWeek`, `EntityKind`)
//! - normalized incident records (`IncidentRecord`)
//! - scorer inputs and outputs (`IncidentAggregate`, `SafetyScoreResult`, `RiskEstimate`, ...)

pub mod types;

pub use types::*;
