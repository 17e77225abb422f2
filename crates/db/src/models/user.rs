//! User entity model and DTO.

use pixelift_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
///
/// The password is an opaque string and is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
}
