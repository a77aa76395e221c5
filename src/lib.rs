// backend_common/src/lib.rs
//
// Request context, leveled logging and object storage helpers for backend services

// Export modules
pub mod context;
pub mod errors;
pub mod logging;
pub mod macros;
pub mod storage;
pub mod types;

// Re-export the types most call sites need at the root level
pub use context::{
    get_api_context, upgrade_context, with_api_context, ApiContext, Context, CustomContext,
};
pub use logging::{Level, LoggerConfig, Loggers, Sink, SinkTarget};
pub use storage::{ObjectStoreClient, StorageConfig, StorageManager};
pub use types::FieldMap;

// `fields!` is exported at the crate root by #[macro_export]
