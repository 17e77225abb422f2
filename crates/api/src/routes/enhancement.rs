//! Route definitions for enhancement records.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::enhancement;
use crate::state::AppState;

/// Routes mounted under `/api`.
///
/// ```text
/// POST   /enhance                           -> upload
/// GET    /enhance/{id}                      -> get_by_id
/// GET    /enhancements/recent               -> list_recent  (?limit=N)
/// DELETE /enhancements/clear-completed      -> clear_completed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/enhance", post(enhancement::upload))
        .route("/enhance/{id}", get(enhancement::get_by_id))
        .route("/enhancements/recent", get(enhancement::list_recent))
        .route(
            "/enhancements/clear-completed",
            delete(enhancement::clear_completed),
        )
}
