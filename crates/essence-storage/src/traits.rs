//! Storage abstraction trait

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage holding the temporary copies of archived objects.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Delete the object stored under `key` in `bucket`.
    ///
    /// Deleting a key that does not exist is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;
}

/// Reject keys that can never address an object.
pub(crate) fn validate_location(bucket: &str, key: &str) -> StorageResult<()> {
    if bucket.trim().is_empty() {
        return Err(StorageError::InvalidKey("bucket is empty".to_string()));
    }
    if key.trim().is_empty() || key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!("invalid object key: {:?}", key)));
    }
    Ok(())
}
