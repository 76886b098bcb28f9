//! Descriptive statistics over the incident dataset.

pub mod aggregate;

pub use aggregate::*;
