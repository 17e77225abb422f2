//! Record store abstraction.
//!
//! [`Storage`] is the single seam between request handlers / workers and
//! persistence. Two backends implement it with identical observable
//! behaviour:
//!
//! - [`MemoryStorage`] -- process-local maps, lost on restart
//! - [`PgStorage`] -- the `users` / `enhancements` tables via the repositories
//!
//! The backend is picked once at startup ([`StorageBackend`]) and shared as
//! an `Arc<dyn Storage>`.

mod memory;
mod postgres;

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use pixelift_core::error::CoreError;
use pixelift_core::types::DbId;

use crate::models::enhancement::{CreateEnhancement, Enhancement, UpdateEnhancement};
use crate::models::user::{CreateUser, User};

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

/// Shared handle to whichever backend was configured.
pub type SharedStorage = Arc<dyn Storage>;

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),
}

/// Persistence contract for users and enhancement records.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// Confirm the backend can serve requests.
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn get_user(&self, id: DbId) -> Result<Option<User>, StoreError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Create a user. Fails with [`StoreError::DuplicateUsername`] if taken.
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError>;

    /// Create a record in the `processing` state with a fresh id and
    /// `created_at = now`.
    async fn create_enhancement(&self, input: &CreateEnhancement)
        -> Result<Enhancement, StoreError>;

    async fn get_enhancement(&self, id: DbId) -> Result<Option<Enhancement>, StoreError>;

    /// Apply a partial update. Returns `None` when `id` does not exist.
    async fn update_enhancement(
        &self,
        id: DbId,
        input: &UpdateEnhancement,
    ) -> Result<Option<Enhancement>, StoreError>;

    /// Up to `limit` records, newest first (ties broken by id, descending).
    async fn list_recent_enhancements(&self, limit: i64) -> Result<Vec<Enhancement>, StoreError>;

    /// Remove every completed record and delete its files.
    ///
    /// Returns the number of records removed. File deletion problems are
    /// logged and never fail the call.
    async fn clear_completed_enhancements(&self) -> Result<u64, StoreError>;
}

/// Which [`Storage`] implementation to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            other => Err(CoreError::Validation(format!(
                "Unknown storage backend '{other}'. Must be one of: memory, postgres"
            ))),
        }
    }
}

/// Delete the original and enhanced files of removed records.
///
/// Missing files and I/O errors are logged at `warn` and skipped.
pub async fn remove_stored_files(records: &[Enhancement]) {
    for record in records {
        remove_file_logged(record.id, "original", &record.original_path).await;
        if let Some(enhanced) = &record.enhanced_path {
            remove_file_logged(record.id, "enhanced", enhanced).await;
        }
    }
}

async fn remove_file_logged(enhancement_id: DbId, kind: &'static str, path: &str) {
    match tokio::fs::remove_file(Path::new(path)).await {
        Ok(()) => tracing::debug!(enhancement_id, kind, path, "Removed stored file"),
        Err(e) => tracing::warn!(
            enhancement_id,
            kind,
            path,
            error = %e,
            "Failed to delete stored file",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(" Postgres ".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
