//! Reporting: formatted terminal output for every command.

pub mod format;

pub use format::*;
