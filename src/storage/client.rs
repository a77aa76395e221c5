// backend_common/src/storage/client.rs
//
// Seam to the object-storage SDK

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::StorageError;

/// Canned ACL applied to uploads unless configured otherwise
pub const DEFAULT_ACL: &str = "public-read";

/// Everything needed to store one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub acl: String,
    pub metadata: HashMap<String, String>,
}

/// The two primitives the storage helpers need from an object store
///
/// Implement this over the vendor SDK client; the helpers add bucket
/// defaulting and content-type detection on top.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    async fn put_object(&self, request: PutObjectRequest) -> Result<(), StorageError>;
}
