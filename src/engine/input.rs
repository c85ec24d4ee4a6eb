//! Scoring Input Construction
//!
//! Resolves a persisted `DailyLogRow` into a `ScoringInput` against the habit
//! catalog. The cascade takes any `ScoringInputBuilder`, so tests can feed it
//! synthetic inputs without a catalog.

use super::types::{
    DailyLogRow, HabitDefinition, HabitValue, InputKind, PenaltyMode, Pool, ScoringConfig,
    ScoringInput, ViceValue,
};

/// Maps a row and the streak of the day before it to a scoring input
pub trait ScoringInputBuilder {
    fn build(&self, row: &DailyLogRow, previous_streak: i32) -> ScoringInput;
}

impl<F> ScoringInputBuilder for F
where
    F: Fn(&DailyLogRow, i32) -> ScoringInput,
{
    fn build(&self, row: &DailyLogRow, previous_streak: i32) -> ScoringInput {
        self(row, previous_streak)
    }
}

/// Builds scoring inputs from the live habits of a catalog
#[derive(Debug, Clone)]
pub struct CatalogInputBuilder {
    habits: Vec<HabitDefinition>,
    config: ScoringConfig,
}

impl CatalogInputBuilder {
    /// Only active, non-retired habits take part in scoring
    pub fn new(habits: &[HabitDefinition], config: ScoringConfig) -> Self {
        let mut habits: Vec<HabitDefinition> =
            habits.iter().filter(|h| h.is_live()).cloned().collect();
        habits.sort_by_key(|h| (h.pool == Pool::Vice, h.sort_order));
        Self { habits, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Resolved good-habit values for a row
    pub fn habit_values(&self, row: &DailyLogRow) -> Vec<HabitValue> {
        self.habits
            .iter()
            .filter(|h| h.pool == Pool::Good)
            .filter_map(|h| {
                // category is guaranteed by validation; skip rather than guess
                let category = h.category?;
                Some(HabitValue {
                    name: h.name.clone(),
                    value: resolve_habit_value(h, row).unwrap_or(0.0),
                    points: h.points,
                    category,
                })
            })
            .collect()
    }

    /// Resolved vice states for a row
    pub fn vice_values(&self, row: &DailyLogRow) -> Vec<ViceValue> {
        self.habits
            .iter()
            .filter(|h| h.pool == Pool::Vice)
            .map(|h| {
                let raw = row.number(&h.name).filter(|n| n.is_finite()).unwrap_or(0.0);
                match h.penalty_mode {
                    PenaltyMode::Flat => ViceValue {
                        name: h.name.clone(),
                        triggered: raw >= 1.0,
                        count: None,
                        penalty_value: h.penalty,
                        penalty_mode: PenaltyMode::Flat,
                    },
                    PenaltyMode::PerInstance => ViceValue {
                        name: h.name.clone(),
                        triggered: raw > 0.0,
                        count: Some(raw.max(0.0).floor() as u32),
                        penalty_value: h.penalty,
                        penalty_mode: PenaltyMode::PerInstance,
                    },
                    PenaltyMode::Tiered => ViceValue {
                        name: h.name.clone(),
                        triggered: false,
                        count: None,
                        penalty_value: 0.0,
                        penalty_mode: PenaltyMode::Tiered,
                    },
                }
            })
            .collect()
    }
}

impl ScoringInputBuilder for CatalogInputBuilder {
    fn build(&self, row: &DailyLogRow, previous_streak: i32) -> ScoringInput {
        ScoringInput {
            habit_values: self.habit_values(row),
            vice_values: self.vice_values(row),
            phone_minutes: row.phone_minutes,
            previous_streak,
            config: self.config.clone(),
        }
    }
}

/// A good habit's value for a row, if the row carries a usable entry
///
/// Checkbox habits earn their full points when the entry is at least 1.
/// Number habits use the raw value. Dropdown habits look the label up in
/// their weight table.
pub fn resolve_habit_value(habit: &HabitDefinition, row: &DailyLogRow) -> Option<f64> {
    let entry = row.entries.get(&habit.name)?;
    match habit.input_kind {
        InputKind::Checkbox => entry
            .as_number()
            .filter(|n| n.is_finite())
            .map(|n| if n >= 1.0 { habit.points } else { 0.0 }),
        InputKind::Number => entry.as_number().filter(|n| n.is_finite()),
        InputKind::Dropdown => entry.as_label().and_then(|label| habit.weight_of(label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::HabitCategory;
    use chrono::NaiveDate;

    fn catalog() -> Vec<HabitDefinition> {
        vec![
            HabitDefinition::good("gym", HabitCategory::Health, 3.0).sort_order(1),
            HabitDefinition::good("pages", HabitCategory::Growth, 2.0).number().sort_order(2),
            HabitDefinition::good("meal_quality", HabitCategory::Health, 3.0)
                .dropdown([("Poor", 0.0), ("Okay", 1.0), ("Good", 2.0), ("Great", 3.0)])
                .sort_order(3),
            HabitDefinition::good("old", HabitCategory::Growth, 1.0).inactive(),
            HabitDefinition::vice("weed", 0.12, PenaltyMode::Flat),
            HabitDefinition::vice("porn", 0.25, PenaltyMode::PerInstance),
            HabitDefinition::vice("phone_use", 0.0, PenaltyMode::Tiered),
        ]
    }

    fn row() -> DailyLogRow {
        DailyLogRow::new(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
    }

    #[test]
    fn test_checkbox_earns_full_points() {
        let builder = CatalogInputBuilder::new(&catalog(), ScoringConfig::default());
        let values = builder.habit_values(&row().entry("gym", 1.0));
        let gym = values.iter().find(|v| v.name == "gym").unwrap();
        assert_eq!(gym.value, 3.0);

        let values = builder.habit_values(&row().entry("gym", 0.0));
        assert_eq!(values.iter().find(|v| v.name == "gym").unwrap().value, 0.0);
    }

    #[test]
    fn test_number_and_dropdown_resolution() {
        let builder = CatalogInputBuilder::new(&catalog(), ScoringConfig::default());
        let values = builder.habit_values(&row().entry("pages", 1.5).label("meal_quality", "Good"));

        assert_eq!(values.iter().find(|v| v.name == "pages").unwrap().value, 1.5);
        assert_eq!(values.iter().find(|v| v.name == "meal_quality").unwrap().value, 2.0);
    }

    #[test]
    fn test_unknown_label_counts_zero() {
        let builder = CatalogInputBuilder::new(&catalog(), ScoringConfig::default());
        let values = builder.habit_values(&row().label("meal_quality", "Amazing"));
        assert_eq!(values.iter().find(|v| v.name == "meal_quality").unwrap().value, 0.0);
    }

    #[test]
    fn test_inactive_habits_excluded() {
        let builder = CatalogInputBuilder::new(&catalog(), ScoringConfig::default());
        let values = builder.habit_values(&row());
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.name != "old"));
        assert_eq!(values[0].name, "gym");
    }

    #[test]
    fn test_vice_resolution() {
        let builder = CatalogInputBuilder::new(&catalog(), ScoringConfig::default());
        let vices = builder.vice_values(&row().entry("weed", 1.0).entry("porn", 2.0).entry("phone_use", 1.0));

        let weed = vices.iter().find(|v| v.name == "weed").unwrap();
        assert!(weed.triggered);

        let porn = vices.iter().find(|v| v.name == "porn").unwrap();
        assert_eq!(porn.count, Some(2));

        let phone = vices.iter().find(|v| v.name == "phone_use").unwrap();
        assert!(!phone.triggered);
        assert_eq!(phone.penalty_value, 0.0);
    }

    #[test]
    fn test_build_carries_streak_and_phone() {
        let builder = CatalogInputBuilder::new(&catalog(), ScoringConfig::default());
        let input = builder.build(&row().phone(200.0), 4);
        assert_eq!(input.previous_streak, 4);
        assert_eq!(input.phone_minutes, 200.0);
        assert_eq!(input.habit_values.len(), 3);
        assert_eq!(input.vice_values.len(), 3);
    }

    #[test]
    fn test_closure_builder() {
        let builder = |_: &DailyLogRow, prev: i32| ScoringInput {
            habit_values: vec![],
            vice_values: vec![],
            phone_minutes: 0.0,
            previous_streak: prev,
            config: ScoringConfig::default(),
        };
        assert_eq!(builder.build(&row(), -1).previous_streak, -1);
    }
}
