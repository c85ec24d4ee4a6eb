//! Lifescore Engine
//!
//! Pure scoring core. Nothing here reads files or holds state; callers load
//! rows and habits, call in, and persist what comes back.
//!
//! - **types**: Core data structures (HabitDefinition, ScoringConfig, DailyLogRow)
//! - **scoring**: The five-score daily formula
//! - **input**: Resolving a row against the habit catalog
//! - **cascade**: Streak propagation after a past day is edited
//! - **correlations**: Habit vs. final score correlation
//! - **analytics**: Score trend, completion rates, vice frequency, weekday averages
//! - **error**: Error types
//!
//! # Data Flow
//!
//! ```text
//! Score a day:
//!   DailyLogRow → CatalogInputBuilder → ScoringInput → compute_scores → ScoringOutput
//!
//! Edit a past day:
//!   rows + edited date → compute_cascade → [CascadeUpdate] → caller persists
//! ```
//!
//! # Example
//!
//! ```rust
//! use lifescore::engine::*;
//! use chrono::NaiveDate;
//!
//! let habits = vec![
//!     HabitDefinition::good("gym", HabitCategory::Health, 3.0).id(1),
//!     HabitDefinition::vice("weed", 0.12, PenaltyMode::Flat).id(2),
//! ];
//! let builder = CatalogInputBuilder::new(&habits, ScoringConfig::default());
//!
//! let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//! let row = DailyLogRow::new(date).entry("gym", 1.0);
//! let scores = compute_scores(&builder.build(&row, -1));
//!
//! assert_eq!(scores.positive_score, 1.0);
//! assert_eq!(scores.streak, 0);
//! ```

pub mod analytics;
pub mod cascade;
pub mod correlations;
pub mod error;
pub mod input;
pub mod scoring;
pub mod types;

// Re-export commonly used types
pub use analytics::{
    day_of_week_averages, habit_completion_rates, score_trend, vice_frequency, DayOfWeekAverage,
    HabitCompletionRate, ScoreTrendPoint, ViceFrequency, MOVING_AVERAGE_DAYS,
};
pub use cascade::{compute_cascade, previous_streak_for, score_history};
pub use correlations::{
    compute_correlations, correlation_strength, pearson_correlation, rows_in_window,
    CorrelationFlag, CorrelationResult, MIN_SAMPLE_SIZE,
};
pub use error::{parse_date, EngineError, EngineResult};
pub use input::{resolve_habit_value, CatalogInputBuilder, ScoringInputBuilder};
pub use scoring::{
    category_multiplier, compute_base_score, compute_final_score, compute_max_weighted,
    compute_positive_score, compute_scores, compute_streak, compute_vice_penalty,
    phone_tier_penalty,
};
pub use types::{
    CascadeUpdate, DailyLogRow, DropdownWeights, EntryValue, HabitCategory, HabitDefinition,
    HabitValue, InputKind, PenaltyMode, Pool, ScoringConfig, ScoringInput, ScoringOutput,
    ViceValue,
};
