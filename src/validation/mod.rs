//! Configuration Validation
//!
//! Gate for every configuration write. Validators never fail and never touch
//! their input: they return a `ValidationResult` and the caller decides
//! whether to persist.
//!
//! - **config**: scoring constants (ranges, ordering, advisory warnings)
//! - **dropdown**: the app-wide dropdown taxonomy and its reserved keys
//! - **habit**: habit and vice definitions against the rest of the catalog

mod config;
mod dropdown;
mod habit;

pub use config::{validate_config, VALID_CORRELATION_WINDOWS};
pub use dropdown::{
    seed_dropdown_options, validate_dropdown_options, RESERVED_DROPDOWN_KEYS,
    SEED_DROPDOWN_OPTIONS,
};
pub use habit::{validate_habit_config, HabitContext};

use serde::Serialize;

/// One problem found by a validator
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field (or `field.key`) the issue is about
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of a validation pass
///
/// `valid` is false exactly when `errors` is non-empty; warnings never block.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Fold another result into this one
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.valid = self.errors.is_empty();
        self
    }

    /// A passing result with nothing to report
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Collects issues while rules run
#[derive(Debug, Default)]
pub(crate) struct Report {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Report {
    pub(crate) fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub(crate) fn finish(self) -> ValidationResult {
        ValidationResult {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
