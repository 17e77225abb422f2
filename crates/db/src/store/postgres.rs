use async_trait::async_trait;
use pixelift_core::types::DbId;

use super::{remove_stored_files, Storage, StoreError};
use crate::models::enhancement::{CreateEnhancement, Enhancement, UpdateEnhancement};
use crate::models::user::{CreateUser, User};
use crate::repositories::{EnhancementRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Relational storage backend backed by a connection pool.
#[derive(Clone)]
pub struct PgStorage {
    pool: DbPool,
}

impl PgStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        UserRepo::create(&self.pool, input).await.map_err(|e| {
            let is_duplicate = matches!(
                &e,
                sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
            );
            if is_duplicate {
                StoreError::DuplicateUsername(input.username.clone())
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn create_enhancement(
        &self,
        input: &CreateEnhancement,
    ) -> Result<Enhancement, StoreError> {
        Ok(EnhancementRepo::create(&self.pool, input).await?)
    }

    async fn get_enhancement(&self, id: DbId) -> Result<Option<Enhancement>, StoreError> {
        Ok(EnhancementRepo::find_by_id(&self.pool, id).await?)
    }

    async fn update_enhancement(
        &self,
        id: DbId,
        input: &UpdateEnhancement,
    ) -> Result<Option<Enhancement>, StoreError> {
        Ok(EnhancementRepo::update(&self.pool, id, input).await?)
    }

    async fn list_recent_enhancements(&self, limit: i64) -> Result<Vec<Enhancement>, StoreError> {
        Ok(EnhancementRepo::list_recent(&self.pool, limit.max(0)).await?)
    }

    async fn clear_completed_enhancements(&self) -> Result<u64, StoreError> {
        let removed = EnhancementRepo::delete_completed(&self.pool).await?;
        remove_stored_files(&removed).await;
        Ok(removed.len() as u64)
    }
}
