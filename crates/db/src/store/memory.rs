use std::collections::HashMap;

use async_trait::async_trait;
use pixelift_core::enhancement::EnhancementStatus;
use pixelift_core::types::DbId;
use tokio::sync::RwLock;

use super::{remove_stored_files, Storage, StoreError};
use crate::models::enhancement::{CreateEnhancement, Enhancement, UpdateEnhancement};
use crate::models::user::{CreateUser, User};

/// In-process storage backend.
///
/// Id counters live inside the store object, so every instance issues its
/// own sequence starting at 1. Thread-safe via interior `RwLock`; designed
/// to be wrapped in `Arc` and shared across the application.
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

struct Inner {
    users: HashMap<DbId, User>,
    enhancements: HashMap<DbId, Enhancement>,
    next_user_id: DbId,
    next_enhancement_id: DbId,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: HashMap::new(),
                enhancements: HashMap::new(),
                next_user_id: 1,
                next_enhancement_id: 1,
            }),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_user(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == input.username) {
            return Err(StoreError::DuplicateUsername(input.username.clone()));
        }

        let id = inner.next_user_id;
        inner.next_user_id += 1;

        let user = User {
            id,
            username: input.username.clone(),
            password: input.password.clone(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn create_enhancement(
        &self,
        input: &CreateEnhancement,
    ) -> Result<Enhancement, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_enhancement_id;
        inner.next_enhancement_id += 1;

        let record = Enhancement {
            id,
            original_filename: input.original_filename.clone(),
            original_path: input.original_path.clone(),
            enhanced_path: None,
            enhancement_type: input.enhancement_type,
            status: EnhancementStatus::Processing,
            processing_time: None,
            created_at: chrono::Utc::now(),
            user_id: input.user_id,
        };
        inner.enhancements.insert(id, record.clone());
        Ok(record)
    }

    async fn get_enhancement(&self, id: DbId) -> Result<Option<Enhancement>, StoreError> {
        Ok(self.inner.read().await.enhancements.get(&id).cloned())
    }

    async fn update_enhancement(
        &self,
        id: DbId,
        input: &UpdateEnhancement,
    ) -> Result<Option<Enhancement>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.enhancements.get_mut(&id).map(|record| {
            input.apply_to(record);
            record.clone()
        }))
    }

    async fn list_recent_enhancements(&self, limit: i64) -> Result<Vec<Enhancement>, StoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<Enhancement> = inner.enhancements.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(records)
    }

    async fn clear_completed_enhancements(&self) -> Result<u64, StoreError> {
        let removed: Vec<Enhancement> = {
            let mut inner = self.inner.write().await;
            let ids: Vec<DbId> = inner
                .enhancements
                .values()
                .filter(|e| e.status == EnhancementStatus::Completed)
                .map(|e| e.id)
                .collect();
            ids.iter()
                .filter_map(|id| inner.enhancements.remove(id))
                .collect()
        };

        // Lock released: file I/O must not block readers.
        remove_stored_files(&removed).await;
        Ok(removed.len() as u64)
    }
}
