//! Appointment status and state machine.
//!
//! The lifecycle is deliberately small:
//!
//! ```text
//! scheduled ──cancel──▶ cancelled   (terminal)
//! scheduled ─complete─▶ completed   (terminal)
//! ```
//!
//! Only `scheduled` appointments occupy a provider's calendar; reschedule is
//! likewise restricted to `scheduled`, and delete is allowed for anything
//! except `completed`. Transitions are purely status-driven: the state
//! machine never inspects the clock, so a future appointment may be
//! completed and a past one cancelled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Closed set of appointment states. Stored as lowercase text at the
/// database and API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Initial state; the only state that counts for conflict checks.
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        valid_transitions(self).is_empty()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!("Unknown appointment status: {other}")),
        }
    }
}

// Used by `sqlx(try_from = "String")` on the row model.
impl TryFrom<String> for AppointmentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Returns the set of valid target states reachable from `from`.
pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    match from {
        AppointmentStatus::Scheduled => {
            &[AppointmentStatus::Cancelled, AppointmentStatus::Completed]
        }
        AppointmentStatus::Cancelled | AppointmentStatus::Completed => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a status transition for appointment `id`.
pub fn ensure_transition(
    id: DbId,
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidStatus { id, status: from })
    }
}

/// Reschedule guard: only `scheduled` appointments may be rescheduled.
pub fn ensure_reschedulable(id: DbId, status: AppointmentStatus) -> Result<(), CoreError> {
    if status == AppointmentStatus::Scheduled {
        Ok(())
    } else {
        Err(CoreError::InvalidStatus { id, status })
    }
}

/// Delete guard: anything except `completed` may be deleted.
pub fn ensure_deletable(id: DbId, status: AppointmentStatus) -> Result<(), CoreError> {
    if status == AppointmentStatus::Completed {
        Err(CoreError::InvalidStatus { id, status })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus::{Cancelled, Completed, Scheduled};
    use super::*;

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn scheduled_to_cancelled() {
        assert!(can_transition(Scheduled, Cancelled));
    }

    #[test]
    fn scheduled_to_completed() {
        assert!(can_transition(Scheduled, Completed));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn cancelled_has_no_transitions() {
        assert!(valid_transitions(Cancelled).is_empty());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn completed_has_no_transitions() {
        assert!(valid_transitions(Completed).is_empty());
        assert!(Completed.is_terminal());
    }

    #[test]
    fn scheduled_is_not_terminal() {
        assert!(!Scheduled.is_terminal());
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn cancelled_to_completed_invalid() {
        assert!(!can_transition(Cancelled, Completed));
    }

    #[test]
    fn completed_to_cancelled_invalid() {
        assert!(!can_transition(Completed, Cancelled));
    }

    #[test]
    fn no_self_transitions() {
        assert!(!can_transition(Scheduled, Scheduled));
        assert!(!can_transition(Cancelled, Cancelled));
        assert!(!can_transition(Completed, Completed));
    }

    // -----------------------------------------------------------------------
    // Guards carry the offending id and status
    // -----------------------------------------------------------------------

    #[test]
    fn ensure_transition_rejects_terminal_source() {
        let err = ensure_transition(7, Completed, Cancelled).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidStatus {
                id: 7,
                status: Completed
            }
        ));
    }

    #[test]
    fn reschedule_requires_scheduled() {
        assert!(ensure_reschedulable(1, Scheduled).is_ok());
        assert!(ensure_reschedulable(1, Cancelled).is_err());
        assert!(ensure_reschedulable(1, Completed).is_err());
    }

    #[test]
    fn delete_forbidden_only_when_completed() {
        assert!(ensure_deletable(1, Scheduled).is_ok());
        assert!(ensure_deletable(1, Cancelled).is_ok());
        assert!(ensure_deletable(1, Completed).is_err());
    }

    // -----------------------------------------------------------------------
    // String round-trips at the storage boundary
    // -----------------------------------------------------------------------

    #[test]
    fn status_parses_from_storage_form() {
        for status in [Scheduled, Cancelled, Completed] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!("pending".parse::<AppointmentStatus>().is_err());
        assert!("SCHEDULED".parse::<AppointmentStatus>().is_err());
    }
}
