//! Application error type and exit-code conventions.
//!
//! Exit codes:
//! - `2`: input/config problem (missing dataset, bad header, unwritable export)
//! - `3`: no usable data for the requested analysis
//! - `4`: internal or numerical failure

/// Bad input files, arguments, or export targets.
pub const EXIT_INPUT: u8 = 2;
/// Nothing left to analyze after ingest/filtering.
pub const EXIT_NO_DATA: u8 = 3;
/// A computation could not be completed.
pub const EXIT_INTERNAL: u8 = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(EXIT_NO_DATA, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EXIT_INTERNAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_carry_exit_codes() {
        assert_eq!(AppError::input("x").exit_code(), 2);
        assert_eq!(AppError::no_data("x").exit_code(), 3);
        assert_eq!(AppError::internal("x").exit_code(), 4);
        assert_eq!(AppError::input("bad header").to_string(), "bad header");
    }
}
