use crate::config::ConfigurationError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the goal-tracking services
///
/// Cache failures never appear here: they are absorbed by the cache layer.
/// Store errors pass through unchanged.
#[derive(Debug, Error)]
pub enum GoaltrackError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl GoaltrackError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, GoaltrackError>;
