//! `aviation-safety` library crate.
//!
//! The binary (`avs`) is a thin wrapper around this library so that:
//!
//! - the scorers and statistics are testable without spawning processes
//! - a presentation layer (dashboard, notebook, service) can reuse them directly

pub mod analysis;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod report;
pub mod score;
pub mod stats;
