//! Derived analyses on top of the yearly aggregates:
//!
//! - quadratic trend forecast (`trend`)
//! - z-score anomaly years (`anomaly`)
//! - headline facts about the dataset (`insights`)

pub mod anomaly;
pub mod insights;
pub mod trend;

pub use anomaly::*;
pub use insights::*;
pub use trend::*;
