//! Common error types for backend_common
//!
//! Each subsystem gets its own error enum. Logging never returns errors to
//! its callers, so only configuration and storage surface them.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting another setting depends on is absent
    #[error("file logging set but file path not found, set env var {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{0}': {1}")]
    InvalidValue(String, String),

    /// Log file could not be opened
    #[error("could not set log file for {level} logs, using console logging, err: {reason}")]
    FileError { level: String, reason: String },
}

/// Object storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// No bucket was given and none is configured
    #[error("No bucket name given and no default bucket configured")]
    MissingBucket,

    /// Bucket creation was rejected by the client
    #[error("failed to create new bucket, err: {0}")]
    CreateBucket(String),

    /// Upload was rejected by the client
    #[error("failed to upload '{key}' to bucket '{bucket}', err: {reason}")]
    Upload {
        bucket: String,
        key: String,
        reason: String,
    },

    /// The upload body could not be read
    #[error("failed to read upload body: {0}")]
    Body(#[from] std::io::Error),

    /// The target bucket does not exist
    #[error("Bucket '{0}' not found")]
    BucketNotFound(String),

    /// Generic client failure
    #[error("Storage client error: {0}")]
    Client(String),
}
