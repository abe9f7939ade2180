pub mod contact;
pub mod health;
pub mod notification;
pub mod walk;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /walks                                           start (POST)
/// /walks/history                                   caller's walks (GET)
/// /walks/guardian/active                           walks the caller guards (GET)
/// /walks/{id}/location                             update (POST), live view (GET)
/// /walks/{id}/check-in                             check in (POST)
/// /walks/{id}/panic                                panic (POST)
/// /walks/{id}/end                                  end (POST)
///
/// /contacts                                        list, create
/// /contacts/{id}                                   update, delete
///
/// /notifications                                   list
/// /notifications/unread-count                      unread count
/// /notifications/read-all                          mark all read (POST)
/// /notifications/{id}/read                         mark read (POST)
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/walks", walk::router())
        .nest("/contacts", contact::router())
        .nest("/notifications", notification::router())
}
