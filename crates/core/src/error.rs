#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `id` is the identifier as the caller supplied it, parsed or not.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}
