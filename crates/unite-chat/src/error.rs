use thiserror::Error;

/// Errors surfaced by the chat core. The store reports plain `anyhow`
/// failures; everything the caller can act on gets its own variant.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Referenced entity is absent.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique key already taken, or the entity is locked by references.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network or storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ChatError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
