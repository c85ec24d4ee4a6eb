//! Dropdown taxonomy rules
//!
//! The app-wide dropdown options are a JSON object with a fixed key set.
//! Users may edit most lists; reserved lists feed analytics buckets and must
//! stay identical to their seed values.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Report, ValidationResult};

const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 50;
const MAX_OPTION_CHARS: usize = 100;

/// Every required key with its seed list
pub const SEED_DROPDOWN_OPTIONS: &[(&str, &[&str])] = &[
    (
        "study_subjects",
        &["Computer Science", "Mathematics", "Physics", "Writing", "Other"],
    ),
    (
        "study_types",
        &["Lecture Review", "Practice Problems", "Reading", "Lab Work", "Project Work", "Other"],
    ),
    ("study_locations", &["Home", "Library", "Campus", "Cafe", "Other"]),
    (
        "app_sources",
        &["LinkedIn", "Company Website", "Referral", "Job Board", "Recruiter", "Other"],
    ),
    (
        "relapse_time_options",
        &[
            "Early Morning (3-6am)",
            "Morning (6-9am)",
            "Late Morning (9am-12pm)",
            "Afternoon (12-5pm)",
            "Evening (5-9pm)",
            "Night (9pm-12am)",
            "Late Night (12-3am)",
        ],
    ),
    (
        "relapse_duration_options",
        &["< 5 minutes", "5-15 minutes", "15-30 minutes", "30-60 minutes", "1-2 hours", "2+ hours"],
    ),
    (
        "relapse_trigger_options",
        &["Boredom", "Stress", "Loneliness", "Anxiety", "Arousal", "Habit/Autopilot", "Other"],
    ),
    ("relapse_location_options", &["Bedroom", "Bathroom", "Living Room", "Other"]),
    ("relapse_device_options", &["Phone", "Laptop", "Tablet", "Other"]),
    (
        "relapse_activity_before_options",
        &["Scrolling Social Media", "Browsing", "Gaming", "Lying in Bed", "Studying", "Other"],
    ),
    (
        "relapse_emotional_state_options",
        &["Bored", "Stressed", "Lonely", "Anxious", "Sad", "Restless", "Other"],
    ),
    (
        "relapse_resistance_technique_options",
        &["None", "Cold Shower", "Exercise", "Left the Room", "Called Someone", "Meditation", "Other"],
    ),
    (
        "urge_technique_options",
        &["Cold Shower", "Exercise", "Left the Room", "Called Someone", "Meditation", "Deep Breathing", "Other"],
    ),
    (
        "urge_duration_options",
        &["< 5 minutes", "5-15 minutes", "15-30 minutes", "30-60 minutes", "1+ hours"],
    ),
    ("urge_pass_options", &["Yes - completely", "Yes - mostly", "No (relapsed)"]),
];

/// Keys whose lists must equal their seed values
pub const RESERVED_DROPDOWN_KEYS: &[&str] = &[
    "relapse_time_options",
    "relapse_duration_options",
    "urge_duration_options",
    "urge_pass_options",
];

fn seed_for(key: &str) -> Option<&'static [&'static str]> {
    SEED_DROPDOWN_OPTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, values)| *values)
}

/// The seed taxonomy as a JSON object
pub fn seed_dropdown_options() -> Value {
    let map: Map<String, Value> = SEED_DROPDOWN_OPTIONS
        .iter()
        .map(|(key, values)| {
            let list = values.iter().map(|v| Value::String(v.to_string())).collect();
            (key.to_string(), Value::Array(list))
        })
        .collect();
    Value::Object(map)
}

fn check_list(key: &str, value: &Value, report: &mut Report) {
    let Some(items) = value.as_array() else {
        report.error(key, "must be an array of strings");
        return;
    };

    if items.len() < MIN_OPTIONS || items.len() > MAX_OPTIONS {
        report.error(
            key,
            format!(
                "must have between {} and {} options (got {})",
                MIN_OPTIONS,
                MAX_OPTIONS,
                items.len()
            ),
        );
    }

    let mut seen = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            report.error(format!("{}[{}]", key, i), "must be a string");
            continue;
        };
        if text.trim().is_empty() {
            report.error(format!("{}[{}]", key, i), "must not be empty");
        } else if text.chars().count() > MAX_OPTION_CHARS {
            report.error(
                format!("{}[{}]", key, i),
                format!("must be at most {} characters", MAX_OPTION_CHARS),
            );
        }
        if !seen.insert(text) {
            report.error(format!("{}[{}]", key, i), format!("duplicate option '{}'", text));
        }
    }

    if RESERVED_DROPDOWN_KEYS.contains(&key) {
        if let Some(seed) = seed_for(key) {
            let matches_seed = items.len() == seed.len()
                && items.iter().zip(seed).all(|(item, s)| item.as_str() == Some(*s));
            if !matches_seed {
                report.error(key, "is reserved and must keep its default options");
            }
        }
    }
}

/// Validate a dropdown-options document
pub fn validate_dropdown_options(raw: &Value) -> ValidationResult {
    let mut report = Report::default();

    let Some(object) = raw.as_object() else {
        report.error("dropdown_options", "must be a JSON object");
        return report.finish();
    };

    for (key, _) in SEED_DROPDOWN_OPTIONS {
        if !object.contains_key(*key) {
            report.error(*key, "required key is missing");
        }
    }

    for (key, value) in object {
        if seed_for(key).is_none() {
            report.error(key.as_str(), "unknown key");
            continue;
        }
        check_list(key, value, &mut report);
    }

    report.finish()
}
