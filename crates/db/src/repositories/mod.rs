//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod enhancement_repo;
pub mod user_repo;

pub use enhancement_repo::EnhancementRepo;
pub use user_repo::UserRepo;
