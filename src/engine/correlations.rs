//! Habit Correlations
//!
//! Pearson correlation between each live good habit and the day's final
//! score. Small or constant samples come back flagged instead of as a number.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::input::resolve_habit_value;
use super::types::{DailyLogRow, HabitDefinition, InputKind};

/// Fewer paired days than this is reported as insufficient data
pub const MIN_SAMPLE_SIZE: usize = 7;

/// Why a correlation has no meaningful coefficient
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationFlag {
    /// Every sampled habit value was identical
    ZeroVariance,
    /// Fewer than `MIN_SAMPLE_SIZE` paired days
    InsufficientData,
}

/// Correlation between one habit and the final score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationResult {
    /// Habit name
    pub habit: String,
    /// Pearson coefficient (-1 to 1), absent when the sample is too small
    pub r: Option<f64>,
    /// Number of paired days used
    pub n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<CorrelationFlag>,
}

impl CorrelationResult {
    /// Human-readable strength: "strong", "moderate", "weak", "negligible"
    pub fn strength(&self) -> Option<&'static str> {
        self.r.map(correlation_strength)
    }

    /// "positive" or "negative", absent for r = 0 or no coefficient
    pub fn direction(&self) -> Option<&'static str> {
        match self.r {
            Some(r) if r > 0.0 => Some("positive"),
            Some(r) if r < 0.0 => Some("negative"),
            _ => None,
        }
    }
}

/// Correlate every live good habit with the final score across `rows`
///
/// Results are sorted by |r| descending; habits without a coefficient sort last.
pub fn compute_correlations(
    rows: &[DailyLogRow],
    habits: &[HabitDefinition],
) -> Vec<CorrelationResult> {
    let mut results: Vec<CorrelationResult> = habits
        .iter()
        .filter(|h| h.is_live() && h.is_good())
        .map(|habit| correlate_habit(habit, rows))
        .collect();

    results.sort_by(|a, b| match (a.r, b.r) {
        (Some(ra), Some(rb)) => rb
            .abs()
            .partial_cmp(&ra.abs())
            .unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    tracing::debug!(
        habits = results.len(),
        rows = rows.len(),
        "Computed habit correlations"
    );

    results
}

/// The habit's raw daily value: the numeric entry for checkbox and number
/// habits, the label weight for dropdown habits
fn correlation_value(habit: &HabitDefinition, row: &DailyLogRow) -> Option<f64> {
    match habit.input_kind {
        InputKind::Checkbox | InputKind::Number => row.number(&habit.name).filter(|n| n.is_finite()),
        InputKind::Dropdown => resolve_habit_value(habit, row),
    }
}

fn correlate_habit(habit: &HabitDefinition, rows: &[DailyLogRow]) -> CorrelationResult {
    let (xs, ys): (Vec<f64>, Vec<f64>) = rows
        .iter()
        .filter_map(|row| {
            let x = correlation_value(habit, row)?;
            let y = row.final_score.filter(|y| y.is_finite())?;
            Some((x, y))
        })
        .unzip();

    let n = xs.len();

    if n < MIN_SAMPLE_SIZE {
        return CorrelationResult {
            habit: habit.name.clone(),
            r: None,
            n,
            flag: Some(CorrelationFlag::InsufficientData),
        };
    }

    if xs.iter().all(|x| *x == xs[0]) {
        return CorrelationResult {
            habit: habit.name.clone(),
            r: Some(0.0),
            n,
            flag: Some(CorrelationFlag::ZeroVariance),
        };
    }

    CorrelationResult {
        habit: habit.name.clone(),
        r: Some(pearson_correlation(&xs, &ys)),
        n,
        flag: None,
    }
}

/// Calculate Pearson correlation coefficient
///
/// Returns a value between -1 and 1:
/// - 1: perfect positive correlation
/// - 0: no correlation (also returned for degenerate input)
/// - -1: perfect negative correlation
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

    let r = numerator / denominator;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Convert correlation coefficient to human-readable strength
pub fn correlation_strength(r: f64) -> &'static str {
    let abs_r = r.abs();
    if abs_r > 0.7 {
        "strong"
    } else if abs_r > 0.5 {
        "moderate"
    } else if abs_r > 0.3 {
        "weak"
    } else {
        "negligible"
    }
}

/// Rows within the trailing `window_days` ending at `until` (inclusive)
///
/// A window of 0 (or less) keeps every row up to `until`, as does a window
/// reaching past the earliest representable date.
pub fn rows_in_window(rows: &[DailyLogRow], until: NaiveDate, window_days: i64) -> Vec<DailyLogRow> {
    let start = if window_days > 0 {
        Duration::try_days(window_days - 1).and_then(|span| until.checked_sub_signed(span))
    } else {
        None
    };

    rows.iter()
        .filter(|r| r.date <= until && start.map_or(true, |s| r.date >= s))
        .cloned()
        .collect()
}
