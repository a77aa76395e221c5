// backend_common/src/types/mod.rs
//
// Common type definitions shared by the logging and storage helpers

mod field_map;

// Re-export types
pub use field_map::FieldMap;
