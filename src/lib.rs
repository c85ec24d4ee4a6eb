//! # Lifescore
//!
//! Scoring core of a personal life tracker: turns each day's habit and vice
//! entries into a score, keeps streaks consistent when past days are edited,
//! and relates habits to outcomes.
//!
//! ## Features
//!
//! - **Daily scoring**: weighted habits, capped vice penalty, streak bonus
//! - **Streak cascade**: minimal forward rescoring after an edit
//! - **Correlations**: Pearson r between each habit and the final score
//! - **Validation**: gatekeeping for every configuration write
//!
//! ## Modules
//!
//! - [`engine`]: Scoring, cascade and correlation
//! - [`validation`]: Config, dropdown and habit validators
//! - [`config`]: TOML configuration with seed defaults
//! - [`import`]: CSV daily log import
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lifescore::config::Config;
//! use lifescore::engine::{compute_cascade, CatalogInputBuilder};
//! use lifescore::import::DailyLogImporter;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let builder = CatalogInputBuilder::new(&config.habits, config.scoring.clone());
//!
//!     // Load history
//!     let log = DailyLogImporter::new().import(Path::new("daily_log.csv"))?;
//!
//!     // Rescore an edited day and everything its streak reaches
//!     let edited = lifescore::engine::parse_date("2026-03-01")?;
//!     let updates = compute_cascade(edited, &log.rows, &config.scoring, &builder)?;
//!
//!     println!("{} days need updating", updates.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod import;
pub mod validation;

// Re-export top-level types for convenience
pub use engine::{
    compute_cascade, compute_correlations, compute_scores, CascadeUpdate, CatalogInputBuilder,
    CorrelationResult, DailyLogRow, EngineError, EngineResult, HabitCategory, HabitDefinition,
    ScoringConfig, ScoringInput, ScoringInputBuilder, ScoringOutput,
};

pub use validation::{
    validate_config, validate_dropdown_options, validate_habit_config, HabitContext,
    ValidationIssue, ValidationResult,
};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};

pub use import::{DailyLogImport, DailyLogImporter, ImportError, ImportResult};
