//! Route definitions for the `/appointments` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::appointments;
use crate::state::AppState;

/// Routes mounted at `/appointments`. All require authentication.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create (book)
/// GET    /{id}           -> get
/// PUT    /{id}           -> update (reschedule)
/// DELETE /{id}           -> delete
/// PATCH  /{id}/cancel    -> cancel
/// PATCH  /{id}/complete  -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(appointments::list).post(appointments::create))
        .route(
            "/{id}",
            get(appointments::get)
                .put(appointments::update)
                .delete(appointments::delete),
        )
        .route("/{id}/cancel", patch(appointments::cancel))
        .route("/{id}/complete", patch(appointments::complete))
}
