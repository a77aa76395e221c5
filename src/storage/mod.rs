// backend_common/src/storage/mod.rs
//
// Convenience helpers over an object-storage client

use std::collections::HashMap;
use std::io::Read;

use log::debug;

use crate::errors::StorageError;

pub mod client;
pub mod memory;

pub use client::{ObjectStoreClient, PutObjectRequest, DEFAULT_ACL};
pub use memory::{MemoryObjectStore, StoredObject};

/// Content type used when a key has no mapped extension
pub const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";
/// Environment variable naming the default bucket
pub const STORAGE_BUCKET_NAME: &str = "STORAGE_BUCKET_NAME";
/// Environment variable naming the region
pub const STORAGE_REGION: &str = "AWS_REGION";

/// Bucket defaults and extension to content-type mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket_name: String,
    pub region: String,
    pub acl: String,
    /// Keys include the leading dot, e.g. `.png`
    pub extension_mapping: HashMap<String, String>,
}

impl StorageConfig {
    pub fn new(bucket_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            region: region.into(),
            acl: DEFAULT_ACL.to_string(),
            extension_mapping: default_extension_mapping(),
        }
    }

    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(
            lookup(STORAGE_BUCKET_NAME).unwrap_or_default(),
            lookup(STORAGE_REGION).unwrap_or_default(),
        )
    }

    pub fn with_acl(mut self, acl: impl Into<String>) -> Self {
        self.acl = acl.into();
        self
    }

    /// Replace the extension mapping
    pub fn with_extension_mapping(mut self, mapping: HashMap<String, String>) -> Self {
        self.extension_mapping = mapping;
        self
    }

    pub fn map_extension(
        mut self,
        extension: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        self.extension_mapping.insert(extension.into(), content_type.into());
        self
    }
}

/// Common web content types, lowercase extensions only
pub fn default_extension_mapping() -> HashMap<String, String> {
    [
        (".png", "image/png"),
        (".jpg", "image/jpeg"),
        (".jpeg", "image/jpeg"),
        (".gif", "image/gif"),
        (".svg", "image/svg+xml"),
        (".webp", "image/webp"),
        (".pdf", "application/pdf"),
        (".json", "application/json"),
        (".csv", "text/csv"),
        (".txt", "text/plain"),
        (".html", "text/html"),
        (".mp4", "video/mp4"),
        (".zip", "application/zip"),
    ]
    .into_iter()
    .map(|(ext, content_type)| (ext.to_string(), content_type.to_string()))
    .collect()
}

/// Bucket creation and uploads through an [`ObjectStoreClient`]
pub struct StorageManager<C> {
    config: StorageConfig,
    client: C,
}

impl<C: ObjectStoreClient> StorageManager<C> {
    pub fn new(config: StorageConfig, client: C) -> Self {
        Self { config, client }
    }

    /// Default bucket
    pub fn bucket(&self) -> &str {
        &self.config.bucket_name
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Content type for `key`, from the text after its last dot
    ///
    /// Lookup is case-sensitive; unmapped or extension-less keys get
    /// [`DEFAULT_CONTENT_TYPE`].
    pub fn content_type(&self, key: &str) -> &str {
        key.rfind('.')
            .and_then(|index| self.config.extension_mapping.get(&key[index..]))
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    pub async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        debug!("creating bucket {}", bucket);
        self.client
            .create_bucket(bucket)
            .await
            .map_err(|e| StorageError::CreateBucket(e.to_string()))
    }

    /// Upload `body` under `key`
    ///
    /// An omitted or empty `bucket` falls back to the configured default.
    pub async fn upload<R: Read>(
        &self,
        key: &str,
        mut body: R,
        metadata: HashMap<String, String>,
        bucket: Option<&str>,
    ) -> Result<(), StorageError> {
        let bucket = bucket
            .filter(|b| !b.is_empty())
            .unwrap_or(self.config.bucket_name.as_str());
        if bucket.is_empty() {
            return Err(StorageError::MissingBucket);
        }

        let mut data = Vec::new();
        body.read_to_end(&mut data)?;

        let request = PutObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: data,
            content_type: self.content_type(key).to_string(),
            acl: self.config.acl.clone(),
            metadata,
        };
        debug!(
            "uploading {} ({} bytes, {}) to bucket {}",
            key,
            request.body.len(),
            request.content_type,
            bucket
        );

        self.client
            .put_object(request)
            .await
            .map_err(|e| StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            })
    }
}
