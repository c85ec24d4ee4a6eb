//! Daily Scoring
//!
//! Turns one day's resolved habit and vice values into five scores:
//!
//! ```text
//! max_weighted   = Σ points × multiplier(category)
//! positive_score = min(1, Σ value × multiplier / (max_weighted × target_fraction))
//! vice_penalty   = min(vice_cap, flat + per_instance + phone_tier)
//! base_score     = positive_score × (1 − vice_penalty)
//! streak         = previous_streak + 1 if base_score ≥ threshold, else 0
//! final_score    = min(1, base_score × (1 + min(streak × bonus_per_day, max_bonus)))
//! ```

use super::types::{HabitCategory, HabitValue, PenaltyMode, ScoringConfig, ScoringInput, ScoringOutput, ViceValue};

/// Configured multiplier for a category
pub fn category_multiplier(category: HabitCategory, config: &ScoringConfig) -> f64 {
    match category {
        HabitCategory::Productivity => config.multiplier_productivity,
        HabitCategory::Health => config.multiplier_health,
        HabitCategory::Growth => config.multiplier_growth,
    }
}

/// Weighted sum of every habit's maximum points (0 for no habits)
pub fn compute_max_weighted(habits: &[HabitValue], config: &ScoringConfig) -> f64 {
    habits
        .iter()
        .map(|h| h.points * category_multiplier(h.category, config))
        .sum()
}

/// Weighted credit earned, normalized against the target and capped at 1
pub fn compute_positive_score(
    habits: &[HabitValue],
    max_weighted: f64,
    target_fraction: f64,
    config: &ScoringConfig,
) -> f64 {
    if max_weighted == 0.0 || target_fraction == 0.0 {
        return 0.0;
    }

    let target = max_weighted * target_fraction;
    let weighted_sum: f64 = habits
        .iter()
        .map(|h| h.value * category_multiplier(h.category, config))
        .sum();

    (weighted_sum / target).clamp(0.0, 1.0)
}

/// Phone minutes usable for tier lookup; anything non-finite or negative counts as 0
fn sanitize_phone_minutes(minutes: f64) -> f64 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes
    } else {
        0.0
    }
}

/// Penalty of the highest phone tier reached; tiers do not stack
pub fn phone_tier_penalty(phone_minutes: f64, config: &ScoringConfig) -> f64 {
    let minutes = sanitize_phone_minutes(phone_minutes);

    if minutes >= config.phone_t3_min {
        config.phone_t3_penalty
    } else if minutes >= config.phone_t2_min {
        config.phone_t2_penalty
    } else if minutes >= config.phone_t1_min {
        config.phone_t1_penalty
    } else {
        0.0
    }
}

/// Total vice deduction for the day, capped at `config.vice_cap`
pub fn compute_vice_penalty(vices: &[ViceValue], phone_minutes: f64, config: &ScoringConfig) -> f64 {
    let vice_sum: f64 = vices
        .iter()
        .map(|v| match v.penalty_mode {
            PenaltyMode::Flat if v.triggered => v.penalty_value,
            PenaltyMode::Flat => 0.0,
            PenaltyMode::PerInstance => f64::from(v.count.unwrap_or(0)) * v.penalty_value,
            // phone use is scored from minutes, not from the vice entry
            PenaltyMode::Tiered => 0.0,
        })
        .sum();

    let raw = vice_sum + phone_tier_penalty(phone_minutes, config);
    raw.clamp(0.0, config.vice_cap.max(0.0))
}

pub fn compute_base_score(positive_score: f64, vice_penalty: f64) -> f64 {
    positive_score * (1.0 - vice_penalty)
}

/// Next streak value
///
/// Pass `-1` when no earlier day exists (a qualifying first day is streak 0)
/// and `0` after a calendar gap (a qualifying day after a gap is streak 1).
pub fn compute_streak(base_score: f64, previous_streak: i32, streak_threshold: f64) -> u32 {
    if base_score >= streak_threshold {
        u32::try_from(previous_streak.saturating_add(1)).unwrap_or(0)
    } else {
        0
    }
}

/// Base score amplified by the capped streak bonus, never above 1
pub fn compute_final_score(
    base_score: f64,
    streak: u32,
    streak_bonus_per_day: f64,
    max_streak_bonus: f64,
) -> f64 {
    let bonus = (f64::from(streak) * streak_bonus_per_day).min(max_streak_bonus);
    (base_score * (1.0 + bonus)).min(1.0)
}

/// Compute all five scores for one day
pub fn compute_scores(input: &ScoringInput) -> ScoringOutput {
    let config = &input.config;

    let max_weighted = compute_max_weighted(&input.habit_values, config);
    let positive_score =
        compute_positive_score(&input.habit_values, max_weighted, config.target_fraction, config);
    let vice_penalty = compute_vice_penalty(&input.vice_values, input.phone_minutes, config);
    let base_score = compute_base_score(positive_score, vice_penalty);
    let streak = compute_streak(base_score, input.previous_streak, config.streak_threshold);
    let final_score = compute_final_score(
        base_score,
        streak,
        config.streak_bonus_per_day,
        config.max_streak_bonus,
    );

    ScoringOutput {
        positive_score,
        vice_penalty,
        base_score,
        streak,
        final_score,
    }
}
