//! Route definitions for the `/contacts` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::contact;
use crate::state::AppState;

/// Routes mounted at `/contacts`.
///
/// ```text
/// GET    /                          -> list_contacts
/// POST   /                          -> create_contact
/// PUT    /{id}                      -> update_contact
/// DELETE /{id}                      -> delete_contact
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(contact::list_contacts).post(contact::create_contact),
        )
        .route(
            "/{id}",
            put(contact::update_contact).delete(contact::delete_contact),
        )
}
