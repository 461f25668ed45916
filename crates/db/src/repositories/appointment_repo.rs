//! Repository for the `appointments` table.
//!
//! The mutating operations are the write side of the scheduling engine: each
//! runs as a single transaction that serializes on the provider's calendar
//! (`pg_advisory_xact_lock`) before the conflict check, so two concurrent
//! bookings for the same provider cannot both observe "no conflict" and then
//! both commit. A partial exclusion constraint on the table backstops the
//! same invariant at the store level.

use sqlx::{PgPool, Postgres, Transaction};

use bookline_core::appointment::{self, AppointmentStatus};
use bookline_core::error::CoreError;
use bookline_core::types::{DbId, Timestamp};

use crate::error::BookingError;
use crate::models::appointment::{
    Appointment, AppointmentFilter, BookAppointment, RescheduleAppointment,
};

const COLUMNS: &str = "\
    id, user_id, provider_id, starts_at, ends_at, status, notes, \
    created_at, updated_at";

/// CRUD and scheduling operations for appointments.
pub struct AppointmentRepo;

impl AppointmentRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find an appointment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's own appointments, newest window first, with the total
    /// row count for pagination.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &AppointmentFilter,
    ) -> Result<(Vec<Appointment>, i64), sqlx::Error> {
        const WHERE: &str = "\
            user_id = $1 \
            AND ($2::TEXT IS NULL OR status = $2) \
            AND ($3::BIGINT IS NULL OR provider_id = $3) \
            AND ($4::TIMESTAMPTZ IS NULL OR starts_at >= $4) \
            AND ($5::TIMESTAMPTZ IS NULL OR starts_at <= $5)";

        let status = filter.status.map(AppointmentStatus::as_str);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM appointments WHERE {WHERE}"
        ))
        .bind(user_id)
        .bind(status)
        .bind(filter.provider_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(pool)
        .await?;

        let items = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE {WHERE} \
             ORDER BY starts_at DESC \
             LIMIT $6 OFFSET $7"
        ))
        .bind(user_id)
        .bind(status)
        .bind(filter.provider_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

        Ok((items, total))
    }

    /// Existence check for a conflicting `scheduled` appointment.
    ///
    /// An appointment conflicts when its provider matches and its half-open
    /// window intersects the candidate window
    /// (`starts_at < $ends AND ends_at > $starts`); touching endpoints do
    /// not conflict. `exclude_id` omits one appointment from the search so a
    /// reschedule does not collide with itself. Read-only and idempotent.
    pub async fn has_conflict<'e, E>(
        executor: E,
        provider_id: DbId,
        starts_at: Timestamp,
        ends_at: Timestamp,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM appointments
                WHERE provider_id = $1
                  AND status = 'scheduled'
                  AND starts_at < $3
                  AND ends_at > $2
                  AND ($4::BIGINT IS NULL OR id <> $4)
            )",
        )
        .bind(provider_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(exclude_id)
        .fetch_one(executor)
        .await
    }

    // -----------------------------------------------------------------------
    // Mutations (one transaction each)
    // -----------------------------------------------------------------------

    /// Book a new appointment. Fails with `AppointmentConflict` when a
    /// scheduled appointment for the provider overlaps the window.
    pub async fn book(
        pool: &PgPool,
        user_id: DbId,
        input: &BookAppointment,
    ) -> Result<Appointment, BookingError> {
        let mut tx = pool.begin().await?;

        Self::lock_provider(&mut tx, input.provider_id).await?;

        if Self::has_conflict(&mut *tx, input.provider_id, input.starts_at, input.ends_at, None)
            .await?
        {
            return Err(CoreError::AppointmentConflict {
                provider_id: input.provider_id,
            }
            .into());
        }

        let query = format!(
            "INSERT INTO appointments (user_id, provider_id, starts_at, ends_at, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(user_id)
            .bind(input.provider_id)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(AppointmentStatus::Scheduled.as_str())
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(appointment)
    }

    /// Reschedule an appointment: move it to a new provider/window and
    /// replace its notes. Only `scheduled` appointments may be rescheduled,
    /// and the appointment is excluded from its own conflict check.
    pub async fn reschedule(
        pool: &PgPool,
        id: DbId,
        input: &RescheduleAppointment,
    ) -> Result<Appointment, BookingError> {
        let mut tx = pool.begin().await?;

        let current = Self::find_for_update(&mut tx, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Appointment",
                id,
            })?;

        appointment::ensure_reschedulable(current.id, current.status)?;

        Self::lock_provider(&mut tx, input.provider_id).await?;

        if Self::has_conflict(
            &mut *tx,
            input.provider_id,
            input.starts_at,
            input.ends_at,
            Some(id),
        )
        .await?
        {
            return Err(CoreError::AppointmentConflict {
                provider_id: input.provider_id,
            }
            .into());
        }

        let query = format!(
            "UPDATE appointments \
             SET provider_id = $2, starts_at = $3, ends_at = $4, notes = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(input.provider_id)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Transition an appointment to `cancelled` or `completed`. The state
    /// machine permits either only from `scheduled`.
    pub async fn change_status(
        pool: &PgPool,
        id: DbId,
        target: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        let mut tx = pool.begin().await?;

        let current = Self::find_for_update(&mut tx, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Appointment",
                id,
            })?;

        appointment::ensure_transition(current.id, current.status, target)?;

        let query = format!(
            "UPDATE appointments SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(target.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an appointment. Forbidden once `completed`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), BookingError> {
        let mut tx = pool.begin().await?;

        let current = Self::find_for_update(&mut tx, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Appointment",
                id,
            })?;

        appointment::ensure_deletable(current.id, current.status)?;

        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Row-lock an appointment for the duration of the transaction.
    async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Serialize check-then-write sequences per provider.
    ///
    /// The advisory lock is transaction-scoped: it is released automatically
    /// on commit or rollback, and any concurrent operation on the same
    /// provider's calendar queues behind it.
    async fn lock_provider(
        tx: &mut Transaction<'_, Postgres>,
        provider_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(provider_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
