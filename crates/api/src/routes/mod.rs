pub mod enhancement;
pub mod health;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /enhance                                         upload (POST)
/// /enhance/{id}                                    status (GET)
/// /enhancements/recent                             recent list (GET)
/// /enhancements/clear-completed                    bulk cleanup (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(enhancement::router())
}
