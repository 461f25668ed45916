use crate::appointment::AppointmentStatus;
use crate::types::DbId;

/// Domain-level error taxonomy.
///
/// Booking outcomes (`AppointmentConflict`, `InvalidStatus`) are normal
/// business results, not infrastructure failures. They carry the identifiers
/// the caller needs to build a user-facing message; this crate never logs or
/// formats messages itself.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A scheduled appointment for this provider overlaps the requested
    /// window. Recoverable by choosing a different window; never retried
    /// automatically.
    #[error("The selected time slot is not available")]
    AppointmentConflict { provider_id: DbId },

    /// The operation is forbidden by the appointment's current status.
    #[error("This appointment cannot be modified in its current status")]
    InvalidStatus {
        id: DbId,
        status: AppointmentStatus,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
