//! Safety scores, flight risk estimates, and batch ranking.
//!
//! Both calculators are pure functions of their inputs; ranking fans them out
//! across entities with rayon.

pub mod ranking;
pub mod risk;
pub mod safety;

pub use ranking::*;
pub use risk::estimate_risk;
pub use safety::{grade_for, score};
