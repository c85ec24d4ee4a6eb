//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Any section left out of the file falls back to the seed configuration:
//! the default scoring constants, the 22 seed habits and vices, and the seed
//! dropdown taxonomy.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::{HabitCategory, HabitDefinition, PenaltyMode, ScoringConfig};
use crate::validation::{
    seed_dropdown_options, validate_config, validate_dropdown_options, validate_habit_config,
    HabitContext, ValidationResult,
};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default = "default_habits")]
    pub habits: Vec<HabitDefinition>,

    #[serde(default = "seed_dropdown_options")]
    pub dropdown_options: serde_json::Value,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The seed habit catalog: 13 good habits and 9 vices
pub fn default_habits() -> Vec<HabitDefinition> {
    use HabitCategory::*;

    let good = [
        HabitDefinition::good("schoolwork", Productivity, 3.0),
        HabitDefinition::good("personal_project", Productivity, 3.0),
        HabitDefinition::good("classes", Productivity, 2.0),
        HabitDefinition::good("job_search", Productivity, 2.0),
        HabitDefinition::good("gym", Health, 3.0),
        HabitDefinition::good("sleep_7_9h", Health, 2.0),
        HabitDefinition::good("wake_8am", Health, 1.0),
        HabitDefinition::good("supplements", Health, 1.0),
        HabitDefinition::good("meal_quality", Health, 3.0).dropdown([
            ("Poor", 0.0),
            ("Okay", 1.0),
            ("Good", 2.0),
            ("Great", 3.0),
        ]),
        HabitDefinition::good("stretching", Health, 1.0),
        HabitDefinition::good("meditate", Growth, 1.0),
        HabitDefinition::good("read", Growth, 1.0),
        HabitDefinition::good("social", Growth, 2.0).dropdown([
            ("None", 0.0),
            ("Brief/Text", 0.5),
            ("Casual Hangout", 1.0),
            ("Meaningful Connection", 2.0),
        ]),
    ];

    let vices = [
        HabitDefinition::vice("porn", 0.25, PenaltyMode::PerInstance),
        HabitDefinition::vice("masturbate", 0.10, PenaltyMode::Flat),
        HabitDefinition::vice("weed", 0.12, PenaltyMode::Flat),
        HabitDefinition::vice("skip_class", 0.08, PenaltyMode::Flat),
        HabitDefinition::vice("binged_content", 0.07, PenaltyMode::Flat),
        HabitDefinition::vice("gaming_1h", 0.06, PenaltyMode::Flat),
        HabitDefinition::vice("past_12am", 0.05, PenaltyMode::Flat),
        HabitDefinition::vice("late_wake", 0.03, PenaltyMode::Flat),
        HabitDefinition::vice("phone_use", 0.0, PenaltyMode::Tiered).number(),
    ];

    good.into_iter()
        .chain(vices)
        .enumerate()
        .map(|(i, habit)| habit.id(i as u32 + 1).sort_order(i as i64 + 1))
        .collect()
}

/// Give every habit without an id (0) the next free one
fn assign_habit_ids(habits: &mut [HabitDefinition]) {
    let mut next = habits.iter().map(|h| h.id).max().unwrap_or(0);
    for habit in habits.iter_mut().filter(|h| h.id == 0) {
        next += 1;
        habit.id = next;
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        assign_habit_ids(&mut config.habits);

        tracing::debug!(
            path = ?path,
            habits = config.habits.len(),
            "Parsed config file"
        );

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Standard config locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("lifescore").join("config.toml")),
            Some(PathBuf::from("./lifescore.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first existing file among `paths`, or the environment-only
    /// config when none exists
    ///
    /// A file that exists but cannot be read or parsed is an error rather
    /// than a silent fallback to the seed configuration.
    pub fn load_first(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match paths.iter().find(|p| p.exists()) {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                tracing::info!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    /// Load from default locations or environment, failing on a broken file
    pub fn try_load_default() -> Result<Self, ConfigError> {
        Self::load_first(&Self::default_paths())
    }

    /// Load from default locations or environment
    ///
    /// A broken config file is logged and replaced by the environment-only
    /// config. Use `try_load_default` to surface the error instead.
    pub fn load_default() -> Self {
        Self::try_load_default().unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            tracing::info!("Using default config with environment overrides");
            Self::from_env()
        })
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Logging overrides
        if let Ok(level) = std::env::var("LIFESCORE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LIFESCORE_LOG_FORMAT") {
            self.logging.format = format;
        }

        // Scoring overrides
        if let Ok(window) = std::env::var("LIFESCORE_CORRELATION_WINDOW") {
            match window.trim().parse() {
                Ok(days) => self.scoring.correlation_window_days = days,
                Err(_) => {
                    tracing::warn!(value = %window, "Ignoring non-numeric LIFESCORE_CORRELATION_WINDOW");
                }
            }
        }
    }

    /// Run every validator over the loaded configuration
    ///
    /// Habit issues are prefixed with the habit's name so they stay
    /// distinguishable in the merged result.
    pub fn validate(&self) -> ValidationResult {
        let context = HabitContext::new(&self.habits);

        let habits = self
            .habits
            .iter()
            .map(|habit| {
                let mut result = validate_habit_config(habit, &context);
                for issue in result.errors.iter_mut().chain(result.warnings.iter_mut()) {
                    issue.field = format!("habits.{}.{}", habit.name, issue.field);
                }
                result
            })
            .fold(ValidationResult::ok(), ValidationResult::merge);

        let mut dropdown = validate_dropdown_options(&self.dropdown_options);
        for issue in dropdown.errors.iter_mut().chain(dropdown.warnings.iter_mut()) {
            issue.field = format!("dropdown_options.{}", issue.field);
        }

        validate_config(&self.scoring).merge(habits).merge(dropdown)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            habits: default_habits(),
            dropdown_options: seed_dropdown_options(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Lifescore Configuration
#
# Environment variables override these settings:
# - LIFESCORE_LOG_LEVEL
# - LIFESCORE_LOG_FORMAT
# - LIFESCORE_CORRELATION_WINDOW

[scoring]
# Category multipliers (0 < m <= 10)
multiplier_productivity = 1.5
multiplier_health = 1.3
multiplier_growth = 1.0

# Share of the maximum weighted points that counts as a perfect day
target_fraction = 0.85

# Upper bound on the combined vice penalty
vice_cap = 0.40

# Base score needed to extend the streak
streak_threshold = 0.65

# Final score bonus per streak day, and its cap
streak_bonus_per_day = 0.01
max_streak_bonus = 0.10

# Phone tiers: minutes at which each tier starts, and its penalty
phone_t1_min = 61
phone_t2_min = 181
phone_t3_min = 301
phone_t1_penalty = 0.03
phone_t2_penalty = 0.07
phone_t3_penalty = 0.12

# Trailing days used for correlations: 0 (all), 30, 60, 90, 180 or 365
correlation_window_days = 90

# Habits and dropdown options default to the seed catalog when omitted.
# To customize, define every habit you want to track:
#
# [[habits]]
# id = 1
# name = "gym"
# pool = "good"
# category = "health"
# input_kind = "checkbox"
# points = 3
#
# [[habits]]
# id = 2
# name = "weed"
# pool = "vice"
# input_kind = "checkbox"
# penalty = 0.12
# penalty_mode = "flat"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
