//! Habit definition rules

use super::{Report, ValidationResult};
use crate::engine::{HabitDefinition, InputKind, PenaltyMode, Pool};

const MAX_NAME_CHARS: usize = 50;
const MIN_HABIT_OPTIONS: usize = 2;
const MAX_HABIT_OPTIONS: usize = 10;
const MAX_LABEL_CHARS: usize = 50;

/// The catalog a candidate habit is checked against
#[derive(Debug, Clone, Copy)]
pub struct HabitContext<'a> {
    /// Every persisted habit, including the stored version of the candidate
    pub existing: &'a [HabitDefinition],
}

impl<'a> HabitContext<'a> {
    pub fn new(existing: &'a [HabitDefinition]) -> Self {
        Self { existing }
    }

    /// Persisted habits other than the one with `id` (id 0 is new and matches nothing)
    fn others(&self, id: u32) -> impl Iterator<Item = &'a HabitDefinition> + 'a {
        let existing: &'a [HabitDefinition] = self.existing;
        existing.iter().filter(move |h| id == 0 || h.id != id)
    }

    fn stored(&self, candidate: &HabitDefinition) -> Option<&'a HabitDefinition> {
        if candidate.id == 0 {
            return None;
        }
        self.existing.iter().find(|h| h.id == candidate.id)
    }
}

fn check_name(habit: &HabitDefinition, context: &HabitContext<'_>, report: &mut Report) {
    let name = habit.name.trim();
    if name.is_empty() {
        report.error("name", "must not be empty");
        return;
    }
    if name.chars().count() > MAX_NAME_CHARS {
        report.error("name", format!("must be at most {} characters", MAX_NAME_CHARS));
    }

    let lower = name.to_lowercase();
    if context.others(habit.id).any(|h| h.name.trim().to_lowercase() == lower) {
        report.error(
            "name",
            format!("a habit named '{}' already exists (case-insensitive)", habit.name),
        );
    }
}

fn check_good(habit: &HabitDefinition, report: &mut Report) {
    if habit.category.is_none() {
        report.error("category", "good habits need a category");
    }
    let points = habit.points;
    if !(points.is_finite() && points >= 1.0 && points.fract() == 0.0) {
        report.error("points", format!("must be a positive whole number (got {})", points));
    }
    if habit.penalty != 0.0 {
        report.error("penalty", "good habits must have penalty = 0");
    }
}

fn check_vice(habit: &HabitDefinition, context: &HabitContext<'_>, report: &mut Report) {
    if habit.category.is_some() {
        report.error("category", "vices must not have a category");
    }
    if habit.points != 0.0 {
        report.error("points", "vices must have points = 0");
    }

    match habit.penalty_mode {
        PenaltyMode::Flat | PenaltyMode::PerInstance => {
            let penalty = habit.penalty;
            if !(penalty.is_finite() && (0.0..=1.0).contains(&penalty)) {
                report.error("penalty", format!("must be >= 0 and <= 1.0 (got {})", penalty));
            }
        }
        PenaltyMode::Tiered => {
            if habit.penalty != 0.0 {
                report.error("penalty", "tiered vices take their penalty from phone tiers; must be 0");
            }
            // inactive or retired tiered vices do not take the slot
            let other_tiered = context.others(habit.id).any(|h| {
                h.pool == Pool::Vice && h.penalty_mode == PenaltyMode::Tiered && h.is_live()
            });
            if other_tiered {
                report.error("penalty_mode", "only one active tiered vice may exist");
            }
        }
    }
}

fn check_options(habit: &HabitDefinition, report: &mut Report) {
    let options = match (habit.input_kind, &habit.options) {
        (InputKind::Dropdown, Some(options)) => options,
        (InputKind::Dropdown, None) => {
            report.error("options", "dropdown habits need a label → weight map");
            return;
        }
        (_, Some(_)) => {
            report.error("options", "only dropdown habits may define options");
            return;
        }
        (_, None) => return,
    };

    if options.len() < MIN_HABIT_OPTIONS || options.len() > MAX_HABIT_OPTIONS {
        report.error(
            "options",
            format!(
                "must have between {} and {} entries (got {})",
                MIN_HABIT_OPTIONS,
                MAX_HABIT_OPTIONS,
                options.len()
            ),
        );
    }

    for (label, weight) in options {
        let chars = label.chars().count();
        if label.trim().is_empty() || chars > MAX_LABEL_CHARS {
            report.error(
                format!("options.{}", label),
                format!("label must be 1-{} characters", MAX_LABEL_CHARS),
            );
        }
        if !(weight.is_finite() && *weight >= 0.0) {
            report.error(
                format!("options.{}", label),
                format!("weight must be a non-negative number (got {})", weight),
            );
        }
    }

    let zeros = options.values().filter(|w| **w == 0.0).count();
    if zeros != 1 {
        report.error(
            "options",
            format!("exactly one option must have weight 0 (found {})", zeros),
        );
    }
}

/// Refuse to take the last live good habit out of scoring
fn check_last_good_habit(habit: &HabitDefinition, context: &HabitContext<'_>, report: &mut Report) {
    let stays_live_good = habit.is_good() && habit.is_live();
    let was_live_good = context
        .stored(habit)
        .is_some_and(|stored| stored.is_good() && stored.is_live());

    if was_live_good && !stays_live_good {
        let others_live_good = context.others(habit.id).any(|h| h.is_good() && h.is_live());
        if !others_live_good {
            report.error("is_active", "cannot deactivate the last active good habit");
        }
    }
}

/// Validate a habit definition against the rest of the catalog
pub fn validate_habit_config(habit: &HabitDefinition, context: &HabitContext<'_>) -> ValidationResult {
    let mut report = Report::default();

    check_name(habit, context, &mut report);
    match habit.pool {
        Pool::Good => check_good(habit, &mut report),
        Pool::Vice => check_vice(habit, context, &mut report),
    }
    check_options(habit, &mut report);
    check_last_good_habit(habit, context, &mut report);

    report.finish()
}
