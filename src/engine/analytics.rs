//! History Analytics
//!
//! Summaries over a span of daily log rows: the final-score trend with a
//! 7-day moving average, per-habit completion rates, vice frequency and
//! day-of-week averages. Callers pick the span (see `rows_in_window`).

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::types::{DailyLogRow, EntryValue, HabitCategory, HabitDefinition, InputKind, PenaltyMode, Pool};

/// Days in the trend's moving average
pub const MOVING_AVERAGE_DAYS: usize = 7;

/// Dropdown label that means the habit was not done
const NO_CREDIT_LABEL: &str = "None";

/// One day of the final-score trend
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreTrendPoint {
    pub date: NaiveDate,
    pub final_score: f64,
    /// Mean of this and the previous six scored days, absent until seven exist
    pub moving_avg_7d: Option<f64>,
}

/// How often a good habit was done
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HabitCompletionRate {
    pub habit: String,
    pub display_name: String,
    pub category: HabitCategory,
    /// `days_completed / total_days`
    pub rate: f64,
    pub days_completed: usize,
    pub total_days: usize,
}

/// On how many days a vice occurred (days, not instances)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ViceFrequency {
    pub vice: String,
    pub display_name: String,
    pub frequency: usize,
    pub total_days: usize,
}

/// Mean final score for one weekday
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayOfWeekAverage {
    /// 0 = Monday .. 6 = Sunday
    pub day: u32,
    pub avg_score: f64,
    pub count: usize,
}

fn stored_final(row: &DailyLogRow) -> Option<f64> {
    row.final_score.filter(|s| s.is_finite())
}

/// Final scores in date order with their trailing 7-day average
///
/// Days that were never scored are left out; the average runs over scored
/// days, not calendar days.
pub fn score_trend(rows: &[DailyLogRow]) -> Vec<ScoreTrendPoint> {
    let mut scored: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter_map(|r| Some((r.date, stored_final(r)?)))
        .collect();
    scored.sort_by_key(|(date, _)| *date);

    scored
        .iter()
        .enumerate()
        .map(|(i, (date, final_score))| {
            let moving_avg_7d = (i + 1 >= MOVING_AVERAGE_DAYS).then(|| {
                let window = &scored[i + 1 - MOVING_AVERAGE_DAYS..=i];
                window.iter().map(|(_, s)| s).sum::<f64>() / MOVING_AVERAGE_DAYS as f64
            });
            ScoreTrendPoint {
                date: *date,
                final_score: *final_score,
                moving_avg_7d,
            }
        })
        .collect()
}

fn is_completed(habit: &HabitDefinition, row: &DailyLogRow) -> bool {
    match (habit.input_kind, row.entries.get(&habit.name)) {
        (InputKind::Dropdown, Some(EntryValue::Label(label))) => {
            let label = label.trim();
            !label.is_empty() && label != NO_CREDIT_LABEL
        }
        (InputKind::Dropdown, _) => false,
        (_, Some(EntryValue::Number(n))) => *n > 0.0,
        (_, _) => false,
    }
}

fn occurred(vice: &HabitDefinition, row: &DailyLogRow) -> bool {
    match vice.penalty_mode {
        PenaltyMode::Tiered => row.phone_minutes > 0.0,
        PenaltyMode::Flat | PenaltyMode::PerInstance => row.number(&vice.name).is_some_and(|n| n > 0.0),
    }
}

fn live_in_pool(habits: &[HabitDefinition], pool: Pool) -> Vec<&HabitDefinition> {
    let mut selected: Vec<&HabitDefinition> = habits
        .iter()
        .filter(|h| h.pool == pool && h.is_live())
        .collect();
    selected.sort_by_key(|h| h.sort_order);
    selected
}

/// Completion rate of every live good habit over `rows`
///
/// Dropdown habits count a day when a label other than "None" was chosen;
/// other habits count a day when the entry is above 0. Empty when there
/// are no rows.
pub fn habit_completion_rates(
    rows: &[DailyLogRow],
    habits: &[HabitDefinition],
) -> Vec<HabitCompletionRate> {
    let total_days = rows.len();
    if total_days == 0 {
        return Vec::new();
    }

    let good = live_in_pool(habits, Pool::Good);
    tracing::debug!(days = total_days, habits = good.len(), "Computing completion rates");

    good.into_iter()
        .filter_map(|habit| {
            let category = habit.category?;
            let days_completed = rows.iter().filter(|r| is_completed(habit, r)).count();
            Some(HabitCompletionRate {
                habit: habit.name.clone(),
                display_name: habit.display_name.clone(),
                category,
                rate: days_completed as f64 / total_days as f64,
                days_completed,
                total_days,
            })
        })
        .collect()
}

/// Number of days each live vice occurred over `rows`
///
/// The tiered vice occurs on any day with phone use.
pub fn vice_frequency(rows: &[DailyLogRow], habits: &[HabitDefinition]) -> Vec<ViceFrequency> {
    let total_days = rows.len();
    if total_days == 0 {
        return Vec::new();
    }

    live_in_pool(habits, Pool::Vice)
        .into_iter()
        .map(|vice| ViceFrequency {
            vice: vice.name.clone(),
            display_name: vice.display_name.clone(),
            frequency: rows.iter().filter(|r| occurred(vice, r)).count(),
            total_days,
        })
        .collect()
}

/// Mean final score per weekday, Monday first; weekdays without a scored day are omitted
pub fn day_of_week_averages(rows: &[DailyLogRow]) -> Vec<DayOfWeekAverage> {
    let mut sums = [(0.0_f64, 0_usize); 7];

    for row in rows {
        if let Some(score) = stored_final(row) {
            let slot = &mut sums[row.date.weekday().num_days_from_monday() as usize];
            slot.0 += score;
            slot.1 += 1;
        }
    }

    sums.iter()
        .zip(0u32..)
        .filter(|((_, count), _)| *count > 0)
        .map(|((sum, count), day)| DayOfWeekAverage {
            day,
            avg_score: sum / *count as f64,
            count: *count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::tests::assert_close;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn scored_row(d: u32, final_score: f64) -> DailyLogRow {
        let mut row = DailyLogRow::new(day(d));
        row.final_score = Some(final_score);
        row
    }

    fn habits() -> Vec<HabitDefinition> {
        vec![
            HabitDefinition::good("gym", HabitCategory::Health, 3.0).sort_order(2),
            HabitDefinition::good("schoolwork", HabitCategory::Productivity, 3.0).sort_order(1),
            HabitDefinition::good("social", HabitCategory::Growth, 2.0)
                .dropdown([("None", 0.0), ("Brief/Text", 0.5), ("Casual Hangout", 1.0)])
                .sort_order(3),
            HabitDefinition::good("read", HabitCategory::Growth, 1.0).inactive(),
            HabitDefinition::vice("porn", 0.25, PenaltyMode::PerInstance).sort_order(10),
            HabitDefinition::vice("weed", 0.12, PenaltyMode::Flat).sort_order(11),
            HabitDefinition::vice("phone_use", 0.0, PenaltyMode::Tiered).sort_order(12),
            HabitDefinition::vice("gaming_1h", 0.06, PenaltyMode::Flat).retired(chrono::Utc::now()),
        ]
    }

    #[test]
    fn test_score_trend_empty() {
        assert!(score_trend(&[]).is_empty());
    }

    #[test]
    fn test_score_trend_moving_avg() {
        let rows: Vec<DailyLogRow> = (1..=10)
            .rev()
            .map(|d| scored_row(d, 0.50 + d as f64 * 0.05))
            .collect();
        let trend = score_trend(&rows);

        assert_eq!(trend.len(), 10);
        assert_eq!(trend[0].date, day(1));
        assert!(trend[..6].iter().all(|p| p.moving_avg_7d.is_none()));

        // (0.55 + 0.60 + ... + 0.85) / 7
        assert_close(trend[6].moving_avg_7d.unwrap(), 0.70, "day 7 average");
        assert_close(trend[9].moving_avg_7d.unwrap(), 0.85, "day 10 average");
    }

    #[test]
    fn test_score_trend_skips_unscored_days() {
        let mut rows: Vec<DailyLogRow> = (1..=7).map(|d| scored_row(d, 0.7)).collect();
        rows.insert(3, DailyLogRow::new(day(20)));
        rows[0].final_score = Some(f64::NAN);

        let trend = score_trend(&rows);
        assert_eq!(trend.len(), 6);
        assert!(trend.iter().all(|p| p.moving_avg_7d.is_none()));
    }

    #[test]
    fn test_habit_completion_rates_empty() {
        assert!(habit_completion_rates(&[], &habits()).is_empty());
    }

    #[test]
    fn test_habit_completion_rates_with_data() {
        let rows = vec![
            scored_row(1, 0.7).entry("gym", 1.0).label("social", "Casual Hangout"),
            scored_row(2, 0.6).entry("gym", 0.0).label("social", "None"),
            scored_row(3, 0.6).entry("schoolwork", 2.0).label("social", " "),
            scored_row(4, 0.6).entry("read", 1.0),
        ];
        let rates = habit_completion_rates(&rows, &habits());

        // live good habits in sort order
        let names: Vec<&str> = rates.iter().map(|r| r.habit.as_str()).collect();
        assert_eq!(names, vec!["schoolwork", "gym", "social"]);

        let gym = &rates[1];
        assert_eq!(gym.days_completed, 1);
        assert_eq!(gym.total_days, 4);
        assert_close(gym.rate, 0.25, "gym rate");
        assert_eq!(gym.category, HabitCategory::Health);

        assert_eq!(rates[0].days_completed, 1);
        assert_eq!(rates[2].days_completed, 1);
    }

    #[test]
    fn test_vice_frequency_counts_days_not_instances() {
        let rows = vec![
            scored_row(1, 0.7).entry("porn", 3.0).phone(120.0),
            scored_row(2, 0.8).entry("porn", 0.0).entry("weed", 1.0),
            scored_row(3, 0.8).entry("gaming_1h", 1.0),
        ];
        let frequency = vice_frequency(&rows, &habits());

        let names: Vec<&str> = frequency.iter().map(|v| v.vice.as_str()).collect();
        assert_eq!(names, vec!["porn", "weed", "phone_use"]);

        let porn = &frequency[0];
        assert_eq!(porn.frequency, 1);
        assert_eq!(porn.total_days, 3);
        assert_eq!(frequency[1].frequency, 1);
        assert_eq!(frequency[2].frequency, 1);
    }

    #[test]
    fn test_day_of_week_averages_monday_is_zero() {
        // 2026-02-16 is a Monday
        let rows = vec![scored_row(16, 0.8)];
        let averages = day_of_week_averages(&rows);

        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].day, 0);
        assert_close(averages[0].avg_score, 0.8, "monday average");
    }

    #[test]
    fn test_day_of_week_averages_group_and_order() {
        let rows = vec![
            scored_row(15, 0.4), // Sunday
            scored_row(16, 0.8), // Monday
            scored_row(23, 0.6), // Monday
            DailyLogRow::new(day(17)),
        ];
        let averages = day_of_week_averages(&rows);

        let days: Vec<u32> = averages.iter().map(|a| a.day).collect();
        assert_eq!(days, vec![0, 6]);
        assert_eq!(averages[0].count, 2);
        assert_close(averages[0].avg_score, 0.7, "monday average");
        assert_close(averages[1].avg_score, 0.4, "sunday average");
    }
}
