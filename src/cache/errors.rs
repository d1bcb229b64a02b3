//! Cache error types

use thiserror::Error;

/// Errors that can occur during cache operations
///
/// None of these ever reach an HTTP caller. The read-through and invalidation
/// helpers decide per call site how a failure degrades (miss, dropped write,
/// zero deletions).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Failed to connect to cache backend
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Backend is disconnected or reconnecting; the operation was not attempted
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// Failed to serialize or deserialize cache value
    #[error("Cache serialization error: {0}")]
    SerializationError(String),

    /// Cache operation timed out
    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

impl CacheError {
    /// Whether the backend itself is unreachable (as opposed to a bad payload)
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::Unavailable(_) | Self::Timeout(_)
        )
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
