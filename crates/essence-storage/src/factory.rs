#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{ObjectStorage, StorageResult};
use essence_core::Config;
use std::sync::Arc;

/// Create the object storage backend based on configuration
#[cfg(feature = "storage-s3")]
pub fn create_storage(config: &Config) -> StorageResult<Arc<dyn ObjectStorage>> {
    let storage = S3Storage::new(config.s3.clone())?;
    tracing::info!(
        endpoint = ?config.s3.endpoint,
        region = %config.s3.region,
        "S3 object storage configured"
    );
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "storage-s3"))]
pub fn create_storage(_config: &Config) -> StorageResult<Arc<dyn ObjectStorage>> {
    Err(crate::StorageError::ConfigError(
        "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
    ))
}
