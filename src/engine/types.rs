//! Core data types for the lifescore engine
//!
//! This module defines the types shared by every engine component:
//! - `HabitDefinition`: what a tracked habit or vice is and how it scores
//! - `ScoringConfig`: the tunable constants of the scoring formula
//! - `ScoringInput` / `ScoringOutput`: one day's resolved inputs and derived scores
//! - `DailyLogRow`: a persisted day with raw entries and stored scores
//! - `CascadeUpdate`: one day's change produced by a cascade

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which pool a habit belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    /// Earns points toward the positive score
    Good,
    /// Deducts from the day through the vice penalty
    Vice,
}

/// Category of a good habit, each with its own multiplier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HabitCategory {
    Productivity,
    Health,
    Growth,
}

impl HabitCategory {
    /// Get all categories for iteration
    pub fn all() -> &'static [HabitCategory] {
        &[
            HabitCategory::Productivity,
            HabitCategory::Health,
            HabitCategory::Growth,
        ]
    }
}

impl std::fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HabitCategory::Productivity => write!(f, "productivity"),
            HabitCategory::Health => write!(f, "health"),
            HabitCategory::Growth => write!(f, "growth"),
        }
    }
}

/// How a habit is entered for a day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Done / not done; earns full points when done
    Checkbox,
    /// Free numeric value used as-is
    Number,
    /// One label out of a fixed label→weight map
    Dropdown,
}

/// How a vice turns its daily entry into a penalty
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyMode {
    /// Fixed penalty when triggered at all
    Flat,
    /// Penalty multiplied by the number of occurrences
    PerInstance,
    /// Penalty chosen from the phone-minute tiers
    Tiered,
}

/// Ordered label → weight table of a dropdown habit
pub type DropdownWeights = BTreeMap<String, f64>;

/// Definition of a tracked habit or vice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitDefinition {
    /// Unique identifier (0 for a definition not yet persisted)
    #[serde(default)]
    pub id: u32,
    /// Machine name, also the key of the habit's entry in a daily log row
    pub name: String,
    /// Human-readable name
    #[serde(default)]
    pub display_name: String,
    pub pool: Pool,
    /// Required for good habits, absent for vices
    #[serde(default)]
    pub category: Option<HabitCategory>,
    pub input_kind: InputKind,
    /// Maximum credit for a good habit
    #[serde(default)]
    pub points: f64,
    /// Penalty per trigger (flat) or per occurrence (per-instance) for a vice
    #[serde(default)]
    pub penalty: f64,
    #[serde(default = "default_penalty_mode")]
    pub penalty_mode: PenaltyMode,
    /// Label weights, only for dropdown habits
    #[serde(default)]
    pub options: Option<DropdownWeights>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub retired_at: Option<DateTime<Utc>>,
}

fn default_penalty_mode() -> PenaltyMode {
    PenaltyMode::Flat
}

fn default_active() -> bool {
    true
}

impl HabitDefinition {
    /// Create a checkbox good habit
    pub fn good(name: impl Into<String>, category: HabitCategory, points: f64) -> Self {
        let name = name.into();
        Self {
            id: 0,
            display_name: name.clone(),
            name,
            pool: Pool::Good,
            category: Some(category),
            input_kind: InputKind::Checkbox,
            points,
            penalty: 0.0,
            penalty_mode: PenaltyMode::Flat,
            options: None,
            sort_order: 0,
            is_active: true,
            retired_at: None,
        }
    }

    /// Create a checkbox vice
    pub fn vice(name: impl Into<String>, penalty: f64, mode: PenaltyMode) -> Self {
        let name = name.into();
        Self {
            id: 0,
            display_name: name.clone(),
            name,
            pool: Pool::Vice,
            category: None,
            input_kind: InputKind::Checkbox,
            points: 0.0,
            penalty,
            penalty_mode: mode,
            options: None,
            sort_order: 0,
            is_active: true,
            retired_at: None,
        }
    }

    /// Builder method: set the identifier
    pub fn id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Builder method: set the sort order
    pub fn sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Builder method: make this a number habit
    pub fn number(mut self) -> Self {
        self.input_kind = InputKind::Number;
        self
    }

    /// Builder method: make this a dropdown habit with the given label weights
    pub fn dropdown<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.input_kind = InputKind::Dropdown;
        self.options = Some(options.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    /// Builder method: deactivate
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Builder method: retire at the given instant
    pub fn retired(mut self, at: DateTime<Utc>) -> Self {
        self.is_active = false;
        self.retired_at = Some(at);
        self
    }

    /// Active and never retired
    pub fn is_live(&self) -> bool {
        self.is_active && self.retired_at.is_none()
    }

    pub fn is_good(&self) -> bool {
        self.pool == Pool::Good
    }

    /// Look up a dropdown label's weight
    pub fn weight_of(&self, label: &str) -> Option<f64> {
        self.options.as_ref().and_then(|o| o.get(label).copied())
    }
}

/// Tunable constants of the scoring formula
///
/// Phone tier thresholds are whole minutes but carried as `f64` so they
/// compare directly against sanitized phone-minute input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    #[serde(default = "default_multiplier_productivity")]
    pub multiplier_productivity: f64,
    #[serde(default = "default_multiplier_health")]
    pub multiplier_health: f64,
    #[serde(default = "default_multiplier_growth")]
    pub multiplier_growth: f64,
    #[serde(default = "default_target_fraction")]
    pub target_fraction: f64,
    #[serde(default = "default_vice_cap")]
    pub vice_cap: f64,
    #[serde(default = "default_streak_threshold")]
    pub streak_threshold: f64,
    #[serde(default = "default_streak_bonus_per_day")]
    pub streak_bonus_per_day: f64,
    #[serde(default = "default_max_streak_bonus")]
    pub max_streak_bonus: f64,
    #[serde(default = "default_phone_t1_min")]
    pub phone_t1_min: f64,
    #[serde(default = "default_phone_t2_min")]
    pub phone_t2_min: f64,
    #[serde(default = "default_phone_t3_min")]
    pub phone_t3_min: f64,
    #[serde(default = "default_phone_t1_penalty")]
    pub phone_t1_penalty: f64,
    #[serde(default = "default_phone_t2_penalty")]
    pub phone_t2_penalty: f64,
    #[serde(default = "default_phone_t3_penalty")]
    pub phone_t3_penalty: f64,
    /// Trailing days used for correlations (0 = all history)
    #[serde(default = "default_correlation_window_days")]
    pub correlation_window_days: i64,
}

fn default_multiplier_productivity() -> f64 {
    1.5
}

fn default_multiplier_health() -> f64 {
    1.3
}

fn default_multiplier_growth() -> f64 {
    1.0
}

fn default_target_fraction() -> f64 {
    0.85
}

fn default_vice_cap() -> f64 {
    0.40
}

fn default_streak_threshold() -> f64 {
    0.65
}

fn default_streak_bonus_per_day() -> f64 {
    0.01
}

fn default_max_streak_bonus() -> f64 {
    0.10
}

fn default_phone_t1_min() -> f64 {
    61.0
}

fn default_phone_t2_min() -> f64 {
    181.0
}

fn default_phone_t3_min() -> f64 {
    301.0
}

fn default_phone_t1_penalty() -> f64 {
    0.03
}

fn default_phone_t2_penalty() -> f64 {
    0.07
}

fn default_phone_t3_penalty() -> f64 {
    0.12
}

fn default_correlation_window_days() -> i64 {
    90
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            multiplier_productivity: default_multiplier_productivity(),
            multiplier_health: default_multiplier_health(),
            multiplier_growth: default_multiplier_growth(),
            target_fraction: default_target_fraction(),
            vice_cap: default_vice_cap(),
            streak_threshold: default_streak_threshold(),
            streak_bonus_per_day: default_streak_bonus_per_day(),
            max_streak_bonus: default_max_streak_bonus(),
            phone_t1_min: default_phone_t1_min(),
            phone_t2_min: default_phone_t2_min(),
            phone_t3_min: default_phone_t3_min(),
            phone_t1_penalty: default_phone_t1_penalty(),
            phone_t2_penalty: default_phone_t2_penalty(),
            phone_t3_penalty: default_phone_t3_penalty(),
            correlation_window_days: default_correlation_window_days(),
        }
    }
}

/// A good habit's resolved value for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitValue {
    pub name: String,
    /// Credit earned today (0..=points for checkbox and dropdown habits)
    pub value: f64,
    pub points: f64,
    pub category: HabitCategory,
}

/// A vice's resolved state for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViceValue {
    pub name: String,
    pub triggered: bool,
    /// Occurrence count, only meaningful for per-instance vices
    pub count: Option<u32>,
    pub penalty_value: f64,
    pub penalty_mode: PenaltyMode,
}

/// Everything the scoring formula needs for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringInput {
    pub habit_values: Vec<HabitValue>,
    pub vice_values: Vec<ViceValue>,
    pub phone_minutes: f64,
    /// Streak of the previous day; -1 when no earlier day exists, 0 after a gap
    pub previous_streak: i32,
    pub config: ScoringConfig,
}

/// The five derived scores of a day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringOutput {
    pub positive_score: f64,
    pub vice_penalty: f64,
    pub base_score: f64,
    pub streak: u32,
    pub final_score: f64,
}

/// A raw daily entry: a number (checkbox, count, numeric habit) or a dropdown label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EntryValue {
    Number(f64),
    Label(String),
}

impl EntryValue {
    /// Numeric view of the entry, if it is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EntryValue::Number(n) => Some(*n),
            EntryValue::Label(_) => None,
        }
    }

    /// Label view of the entry, if it is one
    pub fn as_label(&self) -> Option<&str> {
        match self {
            EntryValue::Number(_) => None,
            EntryValue::Label(s) => Some(s.as_str()),
        }
    }
}

/// One persisted day: raw entries plus the scores stored the last time it was scored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLogRow {
    pub date: NaiveDate,
    /// Raw entries keyed by habit name
    #[serde(default)]
    pub entries: BTreeMap<String, EntryValue>,
    #[serde(default)]
    pub phone_minutes: f64,
    #[serde(default)]
    pub positive_score: Option<f64>,
    #[serde(default)]
    pub vice_penalty: Option<f64>,
    #[serde(default)]
    pub base_score: Option<f64>,
    #[serde(default)]
    pub streak: Option<u32>,
    #[serde(default)]
    pub final_score: Option<f64>,
}

impl DailyLogRow {
    /// Create an unscored row for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: BTreeMap::new(),
            phone_minutes: 0.0,
            positive_score: None,
            vice_penalty: None,
            base_score: None,
            streak: None,
            final_score: None,
        }
    }

    /// Builder method: add a numeric entry
    pub fn entry(mut self, habit: impl Into<String>, value: f64) -> Self {
        self.entries.insert(habit.into(), EntryValue::Number(value));
        self
    }

    /// Builder method: add a dropdown label entry
    pub fn label(mut self, habit: impl Into<String>, label: impl Into<String>) -> Self {
        self.entries.insert(habit.into(), EntryValue::Label(label.into()));
        self
    }

    /// Builder method: set phone minutes
    pub fn phone(mut self, minutes: f64) -> Self {
        self.phone_minutes = minutes;
        self
    }

    /// Builder method: store all five scores
    pub fn scored(mut self, scores: &ScoringOutput) -> Self {
        self.positive_score = Some(scores.positive_score);
        self.vice_penalty = Some(scores.vice_penalty);
        self.base_score = Some(scores.base_score);
        self.streak = Some(scores.streak);
        self.final_score = Some(scores.final_score);
        self
    }

    /// The stored scores, if all five are present
    pub fn stored_scores(&self) -> Option<ScoringOutput> {
        Some(ScoringOutput {
            positive_score: self.positive_score?,
            vice_penalty: self.vice_penalty?,
            base_score: self.base_score?,
            streak: self.streak?,
            final_score: self.final_score?,
        })
    }

    /// Numeric entry for a habit
    pub fn number(&self, habit: &str) -> Option<f64> {
        self.entries.get(habit).and_then(EntryValue::as_number)
    }
}

/// A day whose stored scores must change after a cascade
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CascadeUpdate {
    /// The edited day, fully rescored
    Edited { date: NaiveDate, scores: ScoringOutput },
    /// A later day whose streak chain changed
    Propagated {
        date: NaiveDate,
        streak: u32,
        final_score: f64,
    },
}

impl CascadeUpdate {
    pub fn date(&self) -> NaiveDate {
        match self {
            CascadeUpdate::Edited { date, .. } | CascadeUpdate::Propagated { date, .. } => *date,
        }
    }

    pub fn streak(&self) -> u32 {
        match self {
            CascadeUpdate::Edited { scores, .. } => scores.streak,
            CascadeUpdate::Propagated { streak, .. } => *streak,
        }
    }

    pub fn final_score(&self) -> f64 {
        match self {
            CascadeUpdate::Edited { scores, .. } => scores.final_score,
            CascadeUpdate::Propagated { final_score, .. } => *final_score,
        }
    }

    /// Full scores, present only for the edited day
    pub fn scores(&self) -> Option<&ScoringOutput> {
        match self {
            CascadeUpdate::Edited { scores, .. } => Some(scores),
            CascadeUpdate::Propagated { .. } => None,
        }
    }
}
