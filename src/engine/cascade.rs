//! Streak Cascade
//!
//! Editing a past day can change its streak, and every later streak in the
//! same unbroken chain depends on it. The cascade rescores the edited day in
//! full, then walks forward recomputing only `streak` and `final_score` until a
//! day's recomputed values equal what is already stored.
//!
//! ```text
//!   edited day ── rescore all five ──┐
//!                                    ▼
//!   next day: prev = last streak if consecutive, else 0 (gap)
//!             unscored?  → stop
//!             unchanged? → stop (chain re-converged)
//!             otherwise  → emit, continue
//! ```
//!
//! Callers apply the returned updates in one transaction.

use chrono::NaiveDate;

use super::error::{EngineError, EngineResult};
use super::input::ScoringInputBuilder;
use super::scoring::{compute_final_score, compute_scores, compute_streak};
use super::types::{CascadeUpdate, DailyLogRow, ScoringConfig, ScoringOutput};

/// True when `date` is the calendar day right after `prev`
fn is_next_day(prev: NaiveDate, date: NaiveDate) -> bool {
    prev.succ_opt() == Some(date)
}

fn streak_as_previous(streak: u32) -> i32 {
    i32::try_from(streak).unwrap_or(i32::MAX)
}

/// Previous-streak argument for scoring the day `date`
///
/// - no earlier row: `-1`
/// - earlier row that is not the day before: `0`
/// - the day before: its stored streak, `0` if it was never scored
pub fn previous_streak_for(prior: Option<&DailyLogRow>, date: NaiveDate) -> i32 {
    match prior {
        None => -1,
        Some(row) if is_next_day(row.date, date) => row.streak.map(streak_as_previous).unwrap_or(0),
        Some(_) => 0,
    }
}

/// Outcome of recomputing one later day during the walk
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    /// No stored base score to recompute from
    Unscored,
    /// Recomputed values equal the stored ones
    Converged,
    Changed { streak: u32, final_score: f64 },
}

fn step(row: &DailyLogRow, last_date: NaiveDate, last_streak: u32, config: &ScoringConfig) -> Step {
    let Some(base_score) = row.base_score else {
        return Step::Unscored;
    };

    let previous = if is_next_day(last_date, row.date) {
        streak_as_previous(last_streak)
    } else {
        0
    };

    let streak = compute_streak(base_score, previous, config.streak_threshold);
    let final_score = compute_final_score(
        base_score,
        streak,
        config.streak_bonus_per_day,
        config.max_streak_bonus,
    );

    if row.streak == Some(streak) && row.final_score == Some(final_score) {
        Step::Converged
    } else {
        Step::Changed { streak, final_score }
    }
}

/// Compute the updates an edit to `edited_date` requires
///
/// `rows` must contain the edited day, the row before it (when one exists),
/// and every later row the edit might reach. Order does not matter.
/// Returns the edited day first (only if its scores changed), followed by
/// later days in date order.
///
/// `config` drives the forward walk and must be the configuration `builder`
/// puts into its inputs; otherwise the edited day and the days after it are
/// scored under different streak rules.
pub fn compute_cascade<B>(
    edited_date: NaiveDate,
    rows: &[DailyLogRow],
    config: &ScoringConfig,
    builder: &B,
) -> EngineResult<Vec<CascadeUpdate>>
where
    B: ScoringInputBuilder + ?Sized,
{
    let mut sorted: Vec<&DailyLogRow> = rows.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let index = sorted
        .iter()
        .position(|r| r.date == edited_date)
        .ok_or(EngineError::EditedDateMissing(edited_date))?;

    let edited = sorted[index];
    let prior = index.checked_sub(1).map(|i| sorted[i]);
    let previous_streak = previous_streak_for(prior, edited_date);
    let input = builder.build(edited, previous_streak);
    debug_assert!(
        input.config.streak_threshold == config.streak_threshold
            && input.config.streak_bonus_per_day == config.streak_bonus_per_day
            && input.config.max_streak_bonus == config.max_streak_bonus,
        "builder and cascade disagree on streak configuration"
    );
    let scores = compute_scores(&input);
    let subsequent = &sorted[index + 1..];

    let edited_unchanged = edited.stored_scores() == Some(scores);

    if edited_unchanged {
        let Some(next) = subsequent.first() else {
            tracing::debug!(date = %edited_date, "Edited day unchanged, nothing after it");
            return Ok(Vec::new());
        };

        match step(next, edited_date, scores.streak, config) {
            Step::Converged | Step::Unscored => {
                tracing::debug!(date = %edited_date, "Edited day and its successor unchanged");
                return Ok(Vec::new());
            }
            Step::Changed { .. } => {}
        }
    }

    let mut updates = Vec::new();
    if !edited_unchanged {
        updates.push(CascadeUpdate::Edited {
            date: edited_date,
            scores,
        });
    }

    let mut last_date = edited_date;
    let mut last_streak = scores.streak;

    for row in subsequent {
        match step(row, last_date, last_streak, config) {
            Step::Unscored => {
                tracing::debug!(date = %row.date, "Cascade stopped at never-scored day");
                break;
            }
            Step::Converged => {
                tracing::debug!(date = %row.date, "Cascade converged");
                break;
            }
            Step::Changed { streak, final_score } => {
                updates.push(CascadeUpdate::Propagated {
                    date: row.date,
                    streak,
                    final_score,
                });
                last_date = row.date;
                last_streak = streak;
            }
        }
    }

    tracing::debug!(
        edited = %edited_date,
        updates = updates.len(),
        "Cascade computed"
    );

    Ok(updates)
}

/// Score a whole history from scratch, chaining streaks day to day
///
/// Stored scores are ignored; each day's previous streak comes from the
/// value just computed for the day before it.
pub fn score_history<B>(rows: &[DailyLogRow], builder: &B) -> Vec<(NaiveDate, ScoringOutput)>
where
    B: ScoringInputBuilder + ?Sized,
{
    let mut sorted: Vec<&DailyLogRow> = rows.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut scored: Vec<(NaiveDate, ScoringOutput)> = Vec::with_capacity(sorted.len());

    for row in sorted {
        let previous_streak = match scored.last() {
            None => -1,
            Some((date, out)) if is_next_day(*date, row.date) => streak_as_previous(out.streak),
            Some(_) => 0,
        };
        let out = compute_scores(&builder.build(row, previous_streak));
        scored.push((row.date, out));
    }

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::tests::assert_close;
    use crate::engine::types::{HabitCategory, HabitValue, ScoringInput};

    /// Target fraction 1 with one growth habit worth 1 point makes
    /// positive_score and base_score equal to the row's "base" entry.
    fn test_config() -> ScoringConfig {
        ScoringConfig {
            target_fraction: 1.0,
            ..ScoringConfig::default()
        }
    }

    fn builder(config: ScoringConfig) -> impl Fn(&DailyLogRow, i32) -> ScoringInput {
        move |row: &DailyLogRow, previous_streak: i32| ScoringInput {
            habit_values: vec![HabitValue {
                name: "base".to_string(),
                value: row.number("base").unwrap_or(0.0),
                points: 1.0,
                category: HabitCategory::Growth,
            }],
            vice_values: vec![],
            phone_minutes: 0.0,
            previous_streak,
            config: config.clone(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    /// A row whose raw entry is `base` and whose stored scores say (`stored_base`, `streak`)
    fn row(d: u32, base: f64, stored_base: f64, streak: u32) -> DailyLogRow {
        let config = test_config();
        DailyLogRow::new(day(d)).entry("base", base).scored(&ScoringOutput {
            positive_score: stored_base,
            vice_penalty: 0.0,
            base_score: stored_base,
            streak,
            final_score: compute_final_score(
                stored_base,
                streak,
                config.streak_bonus_per_day,
                config.max_streak_bonus,
            ),
        })
    }

    /// Row whose stored scores already match its entry
    fn consistent(d: u32, base: f64, streak: u32) -> DailyLogRow {
        row(d, base, base, streak)
    }

    fn run(edited: u32, rows: &[DailyLogRow]) -> Vec<CascadeUpdate> {
        let config = test_config();
        compute_cascade(day(edited), rows, &config, &builder(config.clone())).unwrap()
    }

    #[test]
    fn test_previous_streak_conventions() {
        let prior = consistent(1, 0.8, 4);
        assert_eq!(previous_streak_for(None, day(2)), -1);
        assert_eq!(previous_streak_for(Some(&prior), day(2)), 4);
        assert_eq!(previous_streak_for(Some(&prior), day(3)), 0);

        let unscored = DailyLogRow::new(day(1));
        assert_eq!(previous_streak_for(Some(&unscored), day(2)), 0);
    }

    #[test]
    fn test_previous_day_across_month_boundary() {
        let prior = consistent(28, 0.8, 2);
        let march_first = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(previous_streak_for(Some(&prior), march_first), 2);
    }

    #[test]
    fn test_missing_edited_date_is_an_error() {
        let config = test_config();
        let rows = vec![consistent(1, 0.8, 0)];
        let result = compute_cascade(day(5), &rows, &config, &builder(config.clone()));
        assert_eq!(result, Err(EngineError::EditedDateMissing(day(5))));
    }

    #[test]
    fn test_unchanged_edit_is_noop() {
        let rows = vec![
            consistent(1, 0.8, 0),
            consistent(2, 0.7, 1),
            consistent(3, 0.7, 2),
        ];
        assert!(run(2, &rows).is_empty());
        assert!(run(3, &rows).is_empty());
    }

    #[test]
    fn test_unchanged_edit_with_stale_successor_walks() {
        // day 3 was stored with a streak that no longer follows from day 2
        let rows = vec![
            consistent(1, 0.8, 0),
            consistent(2, 0.7, 1),
            consistent(3, 0.7, 5),
            consistent(4, 0.7, 3),
        ];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].date(), day(3));
        assert_eq!(updates[0].streak(), 2);
        assert!(updates[0].scores().is_none());
    }

    #[test]
    fn test_middle_day_reset_restarts_chain() {
        let rows = vec![
            consistent(1, 0.8, 0),
            row(2, 0.0, 0.7, 1),
            consistent(3, 0.7, 2),
        ];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 2);

        let edited = updates[0].scores().unwrap();
        assert_eq!(updates[0].date(), day(2));
        assert_eq!(edited.positive_score, 0.0);
        assert_eq!(edited.base_score, 0.0);
        assert_eq!(edited.streak, 0);
        assert_eq!(edited.final_score, 0.0);

        assert_eq!(updates[1].date(), day(3));
        assert_eq!(updates[1].streak(), 1);
        assert_close(updates[1].final_score(), 0.707, "day 3 final");
    }

    #[test]
    fn test_streak_break_propagates_down_chain() {
        let rows = vec![
            consistent(2, 0.8, 1),
            row(3, 0.60, 0.70, 2),
            consistent(4, 0.72, 3),
            consistent(5, 0.68, 4),
        ];
        let updates = run(3, &rows);

        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].streak(), 0);
        assert_close(updates[0].final_score(), 0.60, "day 3 final");
        assert_eq!(updates[1].streak(), 1);
        assert_close(updates[1].final_score(), 0.7272, "day 4 final");
        assert_eq!(updates[2].streak(), 2);
        assert_close(updates[2].final_score(), 0.6936, "day 5 final");
    }

    #[test]
    fn test_long_chain() {
        let rows = vec![
            consistent(1, 0.8, 0),
            row(2, 0.50, 0.75, 1),
            consistent(3, 0.70, 2),
            consistent(4, 0.72, 3),
            consistent(5, 0.68, 4),
            consistent(6, 0.66, 5),
        ];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 5);
        let streaks: Vec<u32> = updates.iter().map(|u| u.streak()).collect();
        assert_eq!(streaks, vec![0, 1, 2, 3, 4]);
        assert_close(updates[1].final_score(), 0.707, "day 3");
        assert_close(updates[2].final_score(), 0.7344, "day 4");
        assert_close(updates[3].final_score(), 0.7004, "day 5");
        assert_close(updates[4].final_score(), 0.6864, "day 6");
    }

    #[test]
    fn test_gap_isolates_later_days() {
        let rows = vec![
            consistent(1, 0.8, 0),
            row(2, 0.50, 0.75, 1),
            // 3 and 4 missing; day 5 was scored with the gap convention
            consistent(5, 0.70, 1),
            consistent(6, 0.68, 2),
        ];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].date(), day(2));
    }

    #[test]
    fn test_qualifying_day_after_gap_does_not_inherit() {
        let rows = vec![
            consistent(1, 0.8, 0),
            row(2, 0.9, 0.5, 0),
            // stale: stored as if it continued day 2's chain across the gap
            consistent(4, 0.8, 2),
        ];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].streak(), 1);
        assert_eq!(updates[1].date(), day(4));
        assert_eq!(updates[1].streak(), 1);
    }

    #[test]
    fn test_below_threshold_day_stops_cascade() {
        let rows = vec![
            consistent(1, 0.8, 0),
            row(2, 0.50, 0.75, 1),
            consistent(3, 0.70, 2),
            consistent(4, 0.40, 0),
            consistent(5, 0.72, 1),
        ];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].date(), day(3));
        assert_eq!(updates[1].streak(), 1);
    }

    #[test]
    fn test_unscored_day_halts_walk() {
        let mut unscored = DailyLogRow::new(day(3)).entry("base", 0.9);
        unscored.streak = Some(2);
        let rows = vec![
            consistent(1, 0.8, 0),
            row(2, 0.1, 0.8, 1),
            unscored,
            consistent(4, 0.8, 3),
        ];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].date(), day(2));
    }

    #[test]
    fn test_first_day_edit_uses_day_one_convention() {
        let rows = vec![row(1, 0.9, 0.2, 0), consistent(2, 0.2, 0)];
        let updates = run(1, &rows);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].streak(), 0);
        assert_close(updates[0].final_score(), 0.9, "day 1 final");
    }

    #[test]
    fn test_never_scored_edited_day_is_emitted() {
        let rows = vec![consistent(1, 0.8, 0), DailyLogRow::new(day(2)).entry("base", 0.9)];
        let updates = run(2, &rows);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].streak(), 1);
        assert!(updates[0].scores().is_some());
    }

    #[test]
    fn test_rows_sorted_before_walk() {
        let rows = vec![
            consistent(3, 0.7, 2),
            row(2, 0.0, 0.7, 1),
            consistent(1, 0.8, 0),
        ];
        let updates = run(2, &rows);

        let dates: Vec<NaiveDate> = updates.iter().map(|u| u.date()).collect();
        assert_eq!(dates, vec![day(2), day(3)]);
    }

    #[test]
    fn test_score_history_chains_streaks() {
        let rows = vec![
            DailyLogRow::new(day(5)).entry("base", 0.9),
            DailyLogRow::new(day(1)).entry("base", 0.9),
            DailyLogRow::new(day(2)).entry("base", 0.9),
            DailyLogRow::new(day(3)).entry("base", 0.9),
            DailyLogRow::new(day(6)).entry("base", 0.1),
        ];
        let scored = score_history(&rows, &builder(test_config()));

        let streaks: Vec<u32> = scored.iter().map(|(_, s)| s.streak).collect();
        assert_eq!(streaks, vec![0, 1, 2, 1, 0]);
        assert_eq!(scored[0].0, day(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "disagree on streak configuration")]
    fn test_mismatched_builder_config_is_caught() {
        let rows = vec![consistent(1, 0.8, 0), consistent(2, 0.8, 1)];
        let walk_config = ScoringConfig {
            streak_threshold: 0.9,
            ..test_config()
        };
        let _ = compute_cascade(day(1), &rows, &walk_config, &builder(test_config()));
    }
}
