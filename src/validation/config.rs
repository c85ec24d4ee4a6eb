//! Scoring configuration rules

use super::{Report, ValidationResult};
use crate::engine::ScoringConfig;

/// Allowed correlation windows in days (0 = all history)
pub const VALID_CORRELATION_WINDOWS: [i64; 6] = [0, 30, 60, 90, 180, 365];

const MINUTES_PER_DAY: f64 = 1440.0;

/// Lower bound of a range rule
#[derive(Debug, Clone, Copy)]
enum Lower {
    Exclusive(f64),
    Inclusive(f64),
}

/// A scalar field and the closed-above range it must fall in
struct RangeRule {
    field: &'static str,
    get: fn(&ScoringConfig) -> f64,
    lower: Lower,
    upper: f64,
}

impl RangeRule {
    fn check(&self, config: &ScoringConfig, report: &mut Report) {
        let value = (self.get)(config);
        let above_lower = match self.lower {
            Lower::Exclusive(min) => value > min,
            Lower::Inclusive(min) => value >= min,
        };

        // NaN fails both comparisons
        if !(value.is_finite() && above_lower && value <= self.upper) {
            let lower = match self.lower {
                Lower::Exclusive(min) => format!("> {}", min),
                Lower::Inclusive(min) => format!(">= {}", min),
            };
            report.error(
                self.field,
                format!("must be {} and <= {} (got {})", lower, self.upper, value),
            );
        }
    }
}

const RANGE_RULES: &[RangeRule] = &[
    RangeRule {
        field: "multiplier_productivity",
        get: |c| c.multiplier_productivity,
        lower: Lower::Exclusive(0.0),
        upper: 10.0,
    },
    RangeRule {
        field: "multiplier_health",
        get: |c| c.multiplier_health,
        lower: Lower::Exclusive(0.0),
        upper: 10.0,
    },
    RangeRule {
        field: "multiplier_growth",
        get: |c| c.multiplier_growth,
        lower: Lower::Exclusive(0.0),
        upper: 10.0,
    },
    RangeRule {
        field: "target_fraction",
        get: |c| c.target_fraction,
        lower: Lower::Exclusive(0.0),
        upper: 1.0,
    },
    RangeRule {
        field: "vice_cap",
        get: |c| c.vice_cap,
        lower: Lower::Inclusive(0.0),
        upper: 1.0,
    },
    RangeRule {
        field: "streak_threshold",
        get: |c| c.streak_threshold,
        lower: Lower::Inclusive(0.0),
        upper: 1.0,
    },
    RangeRule {
        field: "streak_bonus_per_day",
        get: |c| c.streak_bonus_per_day,
        lower: Lower::Inclusive(0.0),
        upper: 0.1,
    },
    RangeRule {
        field: "max_streak_bonus",
        get: |c| c.max_streak_bonus,
        lower: Lower::Inclusive(0.0),
        upper: 0.5,
    },
    RangeRule {
        field: "phone_t1_penalty",
        get: |c| c.phone_t1_penalty,
        lower: Lower::Inclusive(0.0),
        upper: 1.0,
    },
    RangeRule {
        field: "phone_t2_penalty",
        get: |c| c.phone_t2_penalty,
        lower: Lower::Inclusive(0.0),
        upper: 1.0,
    },
    RangeRule {
        field: "phone_t3_penalty",
        get: |c| c.phone_t3_penalty,
        lower: Lower::Inclusive(0.0),
        upper: 1.0,
    },
];

fn phone_thresholds(config: &ScoringConfig) -> [(&'static str, f64); 3] {
    [
        ("phone_t1_min", config.phone_t1_min),
        ("phone_t2_min", config.phone_t2_min),
        ("phone_t3_min", config.phone_t3_min),
    ]
}

fn phone_penalties(config: &ScoringConfig) -> [(&'static str, f64); 3] {
    [
        ("phone_t1_penalty", config.phone_t1_penalty),
        ("phone_t2_penalty", config.phone_t2_penalty),
        ("phone_t3_penalty", config.phone_t3_penalty),
    ]
}

/// Each value must be strictly greater than the one before it
fn check_ascending(values: &[(&'static str, f64)], label: &str, report: &mut Report) {
    for pair in values.windows(2) {
        let (lo_name, lo) = pair[0];
        let (hi_name, hi) = pair[1];
        // a NaN here is already reported by its range rule
        if lo.is_finite() && hi.is_finite() && lo >= hi {
            report.error(
                hi_name,
                format!("{} must be ascending: {} < {}", label, lo_name, hi_name),
            );
        }
    }
}

/// Validate a scoring configuration
pub fn validate_config(config: &ScoringConfig) -> ValidationResult {
    let mut report = Report::default();

    for rule in RANGE_RULES {
        rule.check(config, &mut report);
    }

    for (field, minutes) in phone_thresholds(config) {
        let whole = minutes.is_finite() && minutes.fract() == 0.0;
        if !(whole && (0.0..=MINUTES_PER_DAY).contains(&minutes)) {
            report.error(
                field,
                format!("must be a whole number of minutes in [0, 1440] (got {})", minutes),
            );
        }
    }

    if !VALID_CORRELATION_WINDOWS.contains(&config.correlation_window_days) {
        report.error(
            "correlation_window_days",
            "must be one of: 0, 30, 60, 90, 180, 365",
        );
    }

    check_ascending(&phone_thresholds(config), "Phone tiers", &mut report);
    check_ascending(&phone_penalties(config), "Phone penalties", &mut report);

    if config.max_streak_bonus < config.streak_bonus_per_day {
        report.warn(
            "max_streak_bonus",
            "is smaller than streak_bonus_per_day; the streak bonus caps out on day one",
        );
    }

    for (field, penalty) in phone_penalties(config) {
        if penalty >= config.vice_cap {
            report.warn(
                field,
                format!(
                    "alone meets or exceeds vice_cap ({}); other vices add nothing on such days",
                    config.vice_cap
                ),
            );
        }
    }

    report.finish()
}
