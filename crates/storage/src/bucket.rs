//! Bucket client for anonymous public object storage.
//!
//! The open-data forecast buckets (NOAA Open Data, ECMWF) serve unsigned
//! requests, so the client is built with signing skipped and no credentials.

use std::path::Path as FsPath;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use tracing::{debug, instrument};

use snap_common::{SnapError, SnapResult};

/// Client for listing and fetching objects from a single bucket.
pub struct BucketClient {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl BucketClient {
    /// Create a client for an anonymous public S3 bucket.
    pub fn anonymous(bucket: &str, region: &str) -> SnapResult<Self> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(region)
            .with_skip_signature(true)
            .build()
            .map_err(|e| {
                SnapError::StorageError(format!("Failed to create S3 client for {}: {}", bucket, e))
            })?;

        Ok(Self {
            store: Arc::new(store),
            bucket: bucket.to_string(),
        })
    }

    /// Wrap an existing store. Tests use this with `object_store::memory::InMemory`.
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Check whether at least one object exists under a prefix.
    ///
    /// Stops after the first listed entry rather than draining the listing.
    #[instrument(skip(self), fields(bucket = %self.bucket, prefix = %prefix))]
    pub async fn prefix_has_objects(&self, prefix: &str) -> SnapResult<bool> {
        let prefix_path = Path::from(prefix.trim_end_matches('/'));
        let mut stream = self.store.list(Some(&prefix_path));

        match stream.next().await {
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(SnapError::StorageError(format!(
                "List failed for {}: {}",
                prefix, e
            ))),
            None => Ok(false),
        }
    }

    /// List object keys under a prefix.
    #[instrument(skip(self), fields(bucket = %self.bucket, prefix = %prefix))]
    pub async fn list(&self, prefix: &str) -> SnapResult<Vec<String>> {
        use futures::TryStreamExt;

        let prefix_path = Path::from(prefix.trim_end_matches('/'));
        let mut keys = Vec::new();

        let mut stream = self.store.list(Some(&prefix_path));
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| SnapError::StorageError(format!("List failed for {}: {}", prefix, e)))?
        {
            keys.push(meta.location.to_string());
        }

        debug!(count = keys.len(), "Listed objects");
        Ok(keys)
    }

    /// Read an object into memory.
    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    pub async fn get(&self, key: &str) -> SnapResult<Bytes> {
        let location = Path::from(key);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| SnapError::StorageError(format!("Failed to read {}: {}", key, e)))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| SnapError::StorageError(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    /// Download an object to a local file, truncating any previous copy.
    ///
    /// Returns the number of bytes written.
    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    pub async fn download_to(&self, key: &str, dest: &FsPath) -> SnapResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = self.get(key).await?;
        let size = data.len() as u64;
        tokio::fs::write(dest, &data).await?;

        debug!(path = %dest.display(), size, "Downloaded object");
        Ok(size)
    }

    /// Bucket name this client talks to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}
