//! Engine error types
//!
//! The engine is total for anything sanitization can resolve. The only
//! errors are caller contract violations.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The edited date is not among the rows handed to the cascade
    #[error("Edited date {0} is not present in the cascade rows")]
    EditedDateMissing(NaiveDate),

    /// A date string could not be parsed as YYYY-MM-DD
    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Parse a YYYY-MM-DD date
pub fn parse_date(input: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| EngineError::InvalidDate {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
