pub mod appointments;
pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                    register (public)
/// /auth/login                       login (public)
/// /auth/refresh                     refresh (public)
/// /auth/me                          profile (requires auth)
/// /auth/logout                      logout (requires auth)
///
/// /appointments                     list, book
/// /appointments/{id}                get, reschedule, delete
/// /appointments/{id}/cancel         cancel (PATCH)
/// /appointments/{id}/complete       complete (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes.
        .nest("/auth", auth::router())
        // Appointment booking and lifecycle.
        .nest("/appointments", appointments::router())
}
