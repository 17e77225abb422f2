use std::sync::Arc;

use pixelift_db::store::SharedStorage;
use pixelift_worker::queue::JobQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Record store (memory or Postgres, chosen at startup).
    pub store: SharedStorage,
    /// Server configuration (upload limits, upload directory).
    pub config: Arc<ServerConfig>,
    /// Producer side of the enhancement worker queue.
    pub queue: JobQueue,
}
