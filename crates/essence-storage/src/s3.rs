use crate::traits::{validate_location, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use essence_core::S3Config;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, Result as ObjectResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// S3 storage implementation
///
/// `object_store` binds a client to one bucket, so a client is built lazily
/// per bucket and reused for later deletes in the same bucket.
pub struct S3Storage {
    config: S3Config,
    stores: Mutex<HashMap<String, Arc<AmazonS3>>>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// `config.endpoint` may point at an S3-compatible provider
    /// (e.g. "http://localhost:9000" for MinIO).
    pub fn new(config: S3Config) -> StorageResult<Self> {
        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(StorageError::ConfigError(
                "S3 credentials not configured".to_string(),
            ));
        }

        Ok(S3Storage {
            config,
            stores: Mutex::new(HashMap::new()),
        })
    }

    fn build_store(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::new()
            .with_region(self.config.region.clone())
            .with_bucket_name(bucket)
            .with_access_key_id(self.config.access_key_id.clone())
            .with_secret_access_key(self.config.secret_access_key.clone());

        if let Some(ref endpoint) = self.config.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn store_for(&self, bucket: &str) -> StorageResult<Arc<AmazonS3>> {
        let mut stores = self
            .stores
            .lock()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?;

        if let Some(store) = stores.get(bucket) {
            return Ok(store.clone());
        }

        let store = Arc::new(self.build_store(bucket)?);
        stores.insert(bucket.to_string(), store.clone());
        Ok(store)
    }
}

/// Object location for `key`, byte for byte.
///
/// `Path::from` would percent-encode and normalize the key and so address a
/// different object. Keys `object_store` cannot carry verbatim are rejected.
fn object_path(key: &str) -> StorageResult<Path> {
    let location = Path::parse(key).map_err(|e| StorageError::InvalidKey(e.to_string()))?;
    if location.as_ref() != key {
        return Err(StorageError::InvalidKey(format!(
            "S3 key '{}' cannot be addressed exactly",
            key
        )));
    }
    Ok(location)
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        validate_location(bucket, key)?;

        let start = std::time::Instant::now();
        let store = self.store_for(bucket)?;
        let location = object_path(key)?;

        let result: ObjectResult<_> = store.delete(&location).await;

        match result {
            Ok(_) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    s3_bucket = %bucket,
                    s3_key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            s3_bucket = %bucket,
            s3_key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Deleted s3 object"
        );

        Ok(())
    }
}
