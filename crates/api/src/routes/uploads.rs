//! Static serving of stored originals and enhanced outputs.

use std::path::Path;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// `GET /uploads/*` straight from the upload directory.
///
/// Open to any origin so result images can be embedded or fetched from
/// anywhere, unlike `/api`, which only answers the configured origins.
pub fn router(upload_dir: &Path) -> Router<AppState> {
    Router::new()
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::HEAD]),
        )
}
