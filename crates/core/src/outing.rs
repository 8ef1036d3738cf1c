//! Outing and signup constants and validation functions.

use chrono::NaiveDate;

use crate::grouping::GrubmasterReason;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an outing name in characters.
pub const MAX_OUTING_NAME_LENGTH: usize = 200;

/// Maximum length of a participant's display name in characters.
pub const MAX_PARTICIPANT_NAME_LENGTH: usize = 200;

/// Upper bound on a recorded age, matching the database check constraint.
pub const MAX_PARTICIPANT_AGE: i32 = 120;

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate an outing name: non-blank and within the length limit.
pub fn validate_outing_name(name: &str) -> Result<(), String> {
    validate_name(name, "Outing", MAX_OUTING_NAME_LENGTH)
}

/// Validate a participant's display name.
pub fn validate_participant_name(name: &str) -> Result<(), String> {
    validate_name(name, "Participant", MAX_PARTICIPANT_NAME_LENGTH)
}

/// An outing may not end before it starts. Open-ended ranges are fine.
pub fn validate_date_range(
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
) -> Result<(), String> {
    match (starts_on, ends_on) {
        (Some(start), Some(end)) if end < start => Err(format!(
            "Outing ends ({end}) before it starts ({start})"
        )),
        _ => Ok(()),
    }
}

/// Ages are optional, but a recorded age must be plausible.
pub fn validate_age(age: Option<i32>) -> Result<(), String> {
    match age {
        Some(a) if !(0..=MAX_PARTICIPANT_AGE).contains(&a) => Err(format!(
            "Age must be between 0 and {MAX_PARTICIPANT_AGE}, got {a}"
        )),
        _ => Ok(()),
    }
}

/// A grubmaster reason, when given, must be one of the fixed codes.
pub fn validate_grubmaster_reason(reason: Option<&str>) -> Result<(), String> {
    match reason {
        Some(code) => GrubmasterReason::from_str(code)
            .map(|_| ())
            .map_err(|e| e.to_string()),
        None => Ok(()),
    }
}

fn validate_name(name: &str, what: &str, max: usize) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(format!("{what} name cannot be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(format!(
            "{what} name exceeds maximum length of {max} characters"
        ));
    }
    Ok(())
}
