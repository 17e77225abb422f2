//! Backend-agnostic behaviour checks for [`Storage`].
//!
//! Each function exercises one contract property against any backend so the
//! memory and Postgres suites assert exactly the same things.

#![allow(dead_code)]

use std::path::Path;

use pixelift_core::enhancement::{EnhancementStatus, EnhancementType};
use pixelift_db::models::enhancement::{CreateEnhancement, UpdateEnhancement};
use pixelift_db::models::user::CreateUser;
use pixelift_db::store::{Storage, StoreError};

pub fn new_enhancement(dir: &Path, name: &str) -> CreateEnhancement {
    CreateEnhancement {
        original_filename: name.to_string(),
        original_path: dir.join(name).to_string_lossy().to_string(),
        enhancement_type: EnhancementType::Denoise,
        user_id: None,
    }
}

pub async fn create_starts_processing(store: &dyn Storage) {
    let dir = tempfile::tempdir().unwrap();
    let a = store
        .create_enhancement(&new_enhancement(dir.path(), "a.png"))
        .await
        .unwrap();
    let b = store
        .create_enhancement(&new_enhancement(dir.path(), "b.png"))
        .await
        .unwrap();

    assert_eq!(a.status, EnhancementStatus::Processing);
    assert!(a.enhanced_path.is_none());
    assert!(a.processing_time.is_none());
    assert_eq!(a.enhancement_type, EnhancementType::Denoise);
    assert_ne!(a.id, b.id, "ids must be unique");

    let fetched = store.get_enhancement(a.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, a.id);
    assert_eq!(fetched.original_filename, "a.png");
}

pub async fn get_unknown_returns_none(store: &dyn Storage) {
    assert!(store.get_enhancement(999_999).await.unwrap().is_none());
}

pub async fn update_applies_partial_fields(store: &dyn Storage) {
    let dir = tempfile::tempdir().unwrap();
    let created = store
        .create_enhancement(&new_enhancement(dir.path(), "a.png"))
        .await
        .unwrap();

    let updated = store
        .update_enhancement(created.id, &UpdateEnhancement::completed("out.png", 2.25))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, EnhancementStatus::Completed);
    assert_eq!(updated.enhanced_path.as_deref(), Some("out.png"));
    assert_eq!(updated.processing_time, Some(2.25));
    assert_eq!(updated.original_path, created.original_path);
    assert_eq!(updated.created_at, created.created_at);

    let missing = store
        .update_enhancement(999_999, &UpdateEnhancement::failed(1.0))
        .await
        .unwrap();
    assert!(missing.is_none());
}

pub async fn list_recent_is_newest_first(store: &dyn Storage) {
    let dir = tempfile::tempdir().unwrap();
    let mut ids = Vec::new();
    for i in 0..5 {
        let record = store
            .create_enhancement(&new_enhancement(dir.path(), &format!("{i}.png")))
            .await
            .unwrap();
        ids.push(record.id);
    }

    let recent = store.list_recent_enhancements(3).await.unwrap();
    let got: Vec<_> = recent.iter().map(|r| r.id).collect();
    assert_eq!(got, vec![ids[4], ids[3], ids[2]]);
    assert!(recent
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}

pub async fn clear_completed_removes_only_completed(store: &dyn Storage) {
    let dir = tempfile::tempdir().unwrap();

    let done = store
        .create_enhancement(&new_enhancement(dir.path(), "done.png"))
        .await
        .unwrap();
    let failed = store
        .create_enhancement(&new_enhancement(dir.path(), "failed.png"))
        .await
        .unwrap();
    let pending = store
        .create_enhancement(&new_enhancement(dir.path(), "pending.png"))
        .await
        .unwrap();

    let original = dir.path().join("done.png");
    let enhanced = dir.path().join("enhanced_done.png");
    tokio::fs::write(&original, b"original").await.unwrap();
    tokio::fs::write(&enhanced, b"enhanced").await.unwrap();
    tokio::fs::write(dir.path().join("failed.png"), b"kept").await.unwrap();

    store
        .update_enhancement(
            done.id,
            &UpdateEnhancement::completed(enhanced.to_string_lossy(), 3.0),
        )
        .await
        .unwrap();
    store
        .update_enhancement(failed.id, &UpdateEnhancement::failed(0.5))
        .await
        .unwrap();

    assert_eq!(store.clear_completed_enhancements().await.unwrap(), 1);

    assert!(store.get_enhancement(done.id).await.unwrap().is_none());
    assert!(store.get_enhancement(failed.id).await.unwrap().is_some());
    assert!(store.get_enhancement(pending.id).await.unwrap().is_some());
    assert!(!original.exists(), "original file should be deleted");
    assert!(!enhanced.exists(), "enhanced file should be deleted");
    assert!(dir.path().join("failed.png").exists());

    assert_eq!(store.clear_completed_enhancements().await.unwrap(), 0);
}

pub async fn clear_completed_tolerates_missing_files(store: &dyn Storage) {
    let dir = tempfile::tempdir().unwrap();
    let record = store
        .create_enhancement(&new_enhancement(dir.path(), "ghost.png"))
        .await
        .unwrap();
    store
        .update_enhancement(
            record.id,
            &UpdateEnhancement::completed(
                dir.path().join("enhanced_ghost.png").to_string_lossy(),
                1.0,
            ),
        )
        .await
        .unwrap();

    assert_eq!(store.clear_completed_enhancements().await.unwrap(), 1);
    assert!(store.get_enhancement(record.id).await.unwrap().is_none());
}

pub async fn users_round_trip(store: &dyn Storage) {
    let created = store
        .create_user(&CreateUser {
            username: "grace".into(),
            password: "opaque".into(),
        })
        .await
        .unwrap();

    let by_id = store.get_user(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "grace");
    assert_eq!(by_id.password, "opaque");

    let by_name = store.get_user_by_username("grace").await.unwrap().unwrap();
    assert_eq!(by_name.id, created.id);
    assert!(store.get_user_by_username("nobody").await.unwrap().is_none());

    let err = store
        .create_user(&CreateUser {
            username: "grace".into(),
            password: "other".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateUsername(_)));
}

pub async fn enhancement_can_reference_owner(store: &dyn Storage) {
    let dir = tempfile::tempdir().unwrap();
    let owner = store
        .create_user(&CreateUser {
            username: "owner".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();

    let mut input = new_enhancement(dir.path(), "owned.png");
    input.user_id = Some(owner.id);
    let record = store.create_enhancement(&input).await.unwrap();
    assert_eq!(record.user_id, Some(owner.id));
}
