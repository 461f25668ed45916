//! Pure scheduling rules: the interval overlap test and booking-window
//! validation.
//!
//! Appointments occupy a half-open interval `[starts_at, ends_at)`, so two
//! windows that merely touch (one ends exactly when the other starts) do not
//! conflict and back-to-back bookings are permitted. The live conflict check
//! expresses this rule in SQL inside the repository layer; this module states
//! it in code, where the unit tests pin it down in isolation and the
//! repository tests check the SQL against it.

use crate::types::Timestamp;

/// Maximum length of the free-text notes field.
pub const MAX_NOTES_LEN: usize = 2000;

/// Half-open interval overlap test.
///
/// True iff `[a_start, a_end)` and `[b_start, b_end)` share at least one
/// instant: `a_start < b_end && a_end > b_start`.
pub fn windows_overlap(
    a_start: Timestamp,
    a_end: Timestamp,
    b_start: Timestamp,
    b_end: Timestamp,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Validate a requested booking window.
///
/// `ends_at` must be strictly after `starts_at`, and `starts_at` must lie in
/// the future relative to `now`. The caller supplies `now` so the rule stays
/// deterministic under test.
pub fn validate_booking_window(
    starts_at: Timestamp,
    ends_at: Timestamp,
    now: Timestamp,
) -> Result<(), String> {
    if starts_at <= now {
        return Err("starts_at must be in the future".to_string());
    }
    if ends_at <= starts_at {
        return Err("ends_at must be after starts_at".to_string());
    }
    Ok(())
}

/// Validate the optional notes field.
pub fn validate_notes(notes: &str) -> Result<(), String> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(format!("notes must be at most {MAX_NOTES_LEN} characters"));
    }
    Ok(())
}
