//! Route definitions for the `/walks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::walk;
use crate::state::AppState;

/// Routes mounted at `/walks`.
///
/// ```text
/// POST   /                          -> start_walk
/// GET    /history                   -> history
/// GET    /guardian/active           -> guardian_active_walks
/// POST   /{id}/location             -> update_location
/// GET    /{id}/location             -> live_location
/// POST   /{id}/check-in             -> check_in
/// POST   /{id}/panic                -> panic
/// POST   /{id}/end                  -> end_walk
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(walk::start_walk))
        .route("/history", get(walk::history))
        .route("/guardian/active", get(walk::guardian_active_walks))
        .route(
            "/{id}/location",
            get(walk::live_location).post(walk::update_location),
        )
        .route("/{id}/check-in", post(walk::check_in))
        .route("/{id}/panic", post(walk::panic))
        .route("/{id}/end", post(walk::end_walk))
}
