//! Appointment entity model and DTOs.

use bookline_core::appointment::AppointmentStatus;
use bookline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full appointment row from the `appointments` table.
///
/// The booked window is the half-open interval `[starts_at, ends_at)`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Appointment {
    pub id: DbId,
    /// The user who booked the slot. Immutable after creation.
    pub user_id: DbId,
    /// The provider being booked. Mutable only while `scheduled`.
    pub provider_id: DbId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    #[sqlx(try_from = "String")]
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for booking a new appointment. Status is always `scheduled` on
/// creation and is not part of the input.
#[derive(Debug, Deserialize)]
pub struct BookAppointment {
    pub provider_id: DbId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub notes: Option<String>,
}

/// DTO for rescheduling an existing appointment. Status never changes
/// through this path; cancel/complete have their own operations.
#[derive(Debug, Deserialize)]
pub struct RescheduleAppointment {
    pub provider_id: DbId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub notes: Option<String>,
}

/// Owner-scoped list filters, already clamped by the caller.
#[derive(Debug)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub provider_id: Option<DbId>,
    /// Inclusive lower bound on `starts_at`.
    pub from: Option<Timestamp>,
    /// Inclusive upper bound on `starts_at`.
    pub to: Option<Timestamp>,
    pub limit: i64,
    pub offset: i64,
}
