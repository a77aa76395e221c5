// backend_common/src/storage/memory.rs
//
// In-process object store for tests and local development

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::client::{ObjectStoreClient, PutObjectRequest};
use crate::errors::StorageError;

/// A stored object and the attributes it was uploaded with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub acl: String,
    pub metadata: HashMap<String, String>,
}

/// Buckets of objects kept in memory
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    buckets: RwLock<HashMap<String, HashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given buckets already present
    pub fn with_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let buckets = buckets
            .into_iter()
            .map(|name| (name.into(), HashMap::new()))
            .collect();
        Self {
            buckets: RwLock::new(buckets),
        }
    }

    pub async fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.read().await.contains_key(bucket)
    }

    pub async fn get_object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }
}

#[async_trait]
impl ObjectStoreClient for MemoryObjectStore {
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket) {
            return Err(StorageError::Client(format!(
                "bucket '{}' already exists",
                bucket
            )));
        }
        buckets.insert(bucket.to_string(), HashMap::new());
        Ok(())
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(&request.bucket)
            .ok_or_else(|| StorageError::BucketNotFound(request.bucket.clone()))?;
        objects.insert(
            request.key,
            StoredObject {
                body: request.body,
                content_type: request.content_type,
                acl: request.acl,
                metadata: request.metadata,
            },
        );
        Ok(())
    }
}
