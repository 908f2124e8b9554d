//! Normalized error type for the storage core.
//!
//! Every planner, the schema manager, and the store facade return this type
//! so callers handle one error shape regardless of which component raised it.

use thiserror::Error;

/// Unified error type for storage-core operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("schema error: {message}")]
    Schema { message: String },

    #[error("schema not found for keyspace {keyspace}")]
    NotFound { keyspace: String },

    #[error("driver error: {message}")]
    Driver { message: String },
}

impl StoreError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema { message: msg.into() }
    }

    pub fn not_found(keyspace: impl Into<String>) -> Self {
        Self::NotFound { keyspace: keyspace.into() }
    }

    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver { message: msg.into() }
    }
}

/// Result type alias for storage-core operations.
pub type StoreResult<T> = Result<T, StoreError>;
