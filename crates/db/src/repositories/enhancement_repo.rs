//! Repository for the `enhancements` table.

use pixelift_core::enhancement::EnhancementStatus;
use pixelift_core::types::DbId;
use sqlx::PgPool;

use crate::models::enhancement::{CreateEnhancement, Enhancement, UpdateEnhancement};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, original_filename, original_path, enhanced_path, enhancement_type, \
                       status, processing_time, created_at, user_id";

/// Provides CRUD operations for enhancement records.
pub struct EnhancementRepo;

impl EnhancementRepo {
    /// Insert a new enhancement, returning the created row.
    ///
    /// `status` and `created_at` come from the column defaults.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEnhancement,
    ) -> Result<Enhancement, sqlx::Error> {
        let query = format!(
            "INSERT INTO enhancements (original_filename, original_path, enhancement_type, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enhancement>(&query)
            .bind(&input.original_filename)
            .bind(&input.original_path)
            .bind(input.enhancement_type.as_str())
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Find an enhancement by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enhancement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enhancements WHERE id = $1");
        sqlx::query_as::<_, Enhancement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the most recently created enhancements, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Enhancement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enhancements
             ORDER BY created_at DESC, id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, Enhancement>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update an enhancement. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEnhancement,
    ) -> Result<Option<Enhancement>, sqlx::Error> {
        let query = format!(
            "UPDATE enhancements SET
                enhanced_path = COALESCE($2, enhanced_path),
                status = COALESCE($3, status),
                processing_time = COALESCE($4, processing_time)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enhancement>(&query)
            .bind(id)
            .bind(&input.enhanced_path)
            .bind(input.status.map(EnhancementStatus::as_str))
            .bind(input.processing_time)
            .fetch_optional(pool)
            .await
    }

    /// Delete every completed enhancement in one statement, returning the
    /// removed rows so their files can be cleaned up.
    pub async fn delete_completed(pool: &PgPool) -> Result<Vec<Enhancement>, sqlx::Error> {
        let query = format!(
            "DELETE FROM enhancements
             WHERE status = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enhancement>(&query)
            .bind(EnhancementStatus::Completed.as_str())
            .fetch_all(pool)
            .await
    }
}
