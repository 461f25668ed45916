//! Handlers for the `/appointments` resource.
//!
//! All routes are owner-scoped: a user can only see and mutate appointments
//! they booked. Ability checks (`appointments:read` / `appointments:write`)
//! gate read and write paths separately.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use bookline_core::appointment::AppointmentStatus;
use bookline_core::error::CoreError;
use bookline_core::scheduling::{validate_booking_window, validate_notes};
use bookline_core::types::{DbId, Timestamp};
use bookline_db::models::appointment::{
    Appointment, AppointmentFilter, BookAppointment, RescheduleAppointment,
};
use bookline_db::repositories::{AppointmentRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, PageMeta, Paginated};
use crate::state::AppState;

/// Default list page size.
const DEFAULT_PER_PAGE: i64 = 15;
/// Upper bound on list page size.
const MAX_PER_PAGE: i64 = 50;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /appointments`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Filter by status (`scheduled`, `cancelled`, `completed`).
    pub status: Option<String>,
    pub provider_id: Option<DbId>,
    /// Inclusive lower bound on `starts_at`.
    pub from: Option<Timestamp>,
    /// Inclusive upper bound on `starts_at`.
    pub to: Option<Timestamp>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments
///
/// List the authenticated user's appointments, newest window first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Paginated<Appointment>>> {
    user.require("appointments:read")?;

    let status = params
        .status
        .as_deref()
        .map(str::parse::<AppointmentStatus>)
        .transpose()
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    // `page` is client-controlled and only floored above, so the offset
    // product can exceed i64 for absurd page numbers.
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| AppError::Core(CoreError::Validation("page is out of range".into())))?;

    let filter = AppointmentFilter {
        status,
        provider_id: params.provider_id,
        from: params.from,
        to: params.to,
        limit: per_page,
        offset,
    };

    let (items, total) = AppointmentRepo::list_for_user(&state.pool, user.user_id, &filter).await?;

    Ok(Json(Paginated {
        data: items,
        meta: PageMeta {
            page,
            per_page,
            total,
        },
    }))
}

/// POST /api/v1/appointments
///
/// Book a new appointment. Returns 201 with the created row, or 409 when
/// the provider's calendar already holds an overlapping scheduled
/// appointment.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<BookAppointment>,
) -> AppResult<(StatusCode, Json<DataResponse<Appointment>>)> {
    user.require("appointments:write")?;

    validate_booking_input(
        &state,
        input.provider_id,
        input.starts_at,
        input.ends_at,
        input.notes.as_deref(),
    )
    .await?;

    let appointment = AppointmentRepo::book(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        appointment_id = appointment.id,
        provider_id = appointment.provider_id,
        "Appointment booked"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: appointment }),
    ))
}

/// GET /api/v1/appointments/{id}
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    user.require("appointments:read")?;

    let appointment = fetch_owned(&state, id, &user).await?;
    Ok(Json(DataResponse { data: appointment }))
}

/// PUT /api/v1/appointments/{id}
///
/// Reschedule an appointment. Only `scheduled` appointments may move; the
/// appointment's own slot never conflicts with itself.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RescheduleAppointment>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    user.require("appointments:write")?;

    fetch_owned(&state, id, &user).await?;

    validate_booking_input(
        &state,
        input.provider_id,
        input.starts_at,
        input.ends_at,
        input.notes.as_deref(),
    )
    .await?;

    let appointment = AppointmentRepo::reschedule(&state.pool, id, &input).await?;

    tracing::info!(appointment_id = id, "Appointment rescheduled");

    Ok(Json(DataResponse { data: appointment }))
}

/// DELETE /api/v1/appointments/{id}
///
/// Remove an appointment. Forbidden once completed. Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.require("appointments:write")?;

    fetch_owned(&state, id, &user).await?;

    AppointmentRepo::delete(&state.pool, id).await?;

    tracing::info!(appointment_id = id, "Appointment deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/appointments/{id}/cancel
pub async fn cancel(
    state: State<AppState>,
    user: AuthUser,
    path: Path<DbId>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    transition(state, user, path, AppointmentStatus::Cancelled).await
}

/// PATCH /api/v1/appointments/{id}/complete
pub async fn complete(
    state: State<AppState>,
    user: AuthUser,
    path: Path<DbId>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    transition(state, user, path, AppointmentStatus::Completed).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Shared body of the cancel/complete endpoints.
async fn transition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    target: AppointmentStatus,
) -> AppResult<Json<DataResponse<Appointment>>> {
    user.require("appointments:write")?;

    fetch_owned(&state, id, &user).await?;

    let appointment = AppointmentRepo::change_status(&state.pool, id, target).await?;

    tracing::info!(
        appointment_id = id,
        status = %target,
        "Appointment status changed"
    );

    Ok(Json(DataResponse { data: appointment }))
}

/// Load an appointment and enforce ownership.
///
/// Missing rows are 404; rows owned by someone else are 403 rather than
/// 404 because IDs are sequential and existence is not a secret.
async fn fetch_owned(state: &AppState, id: DbId, user: &AuthUser) -> AppResult<Appointment> {
    let appointment = AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Appointment",
            id,
        })?;

    if appointment.user_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not allowed to access this appointment".into(),
        )));
    }

    Ok(appointment)
}

/// Validate the candidate window, notes, and provider reference. Shared by
/// the book and reschedule paths.
async fn validate_booking_input(
    state: &AppState,
    provider_id: DbId,
    starts_at: Timestamp,
    ends_at: Timestamp,
    notes: Option<&str>,
) -> AppResult<()> {
    validate_booking_window(starts_at, ends_at, Utc::now())
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if let Some(notes) = notes {
        validate_notes(notes).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    if !UserRepo::exists(&state.pool, provider_id).await? {
        return Err(AppError::Core(CoreError::Validation(
            "The selected provider is invalid".into(),
        )));
    }

    Ok(())
}
