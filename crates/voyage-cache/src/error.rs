//! Cache error types.

use thiserror::Error;

/// Why a cache operation failed.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store cannot be reached (connection refused, dropped, timed out).
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error.
    #[error("Cache command failed: {0}")]
    Command(String),

    /// A cached value could not be encoded or decoded.
    #[error("Cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            CacheError::Unavailable(err.to_string())
        } else {
            CacheError::Command(err.to_string())
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
