//! FieldMap module for backend_common
//! Ad hoc key/value payload attached to a single log call

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// String-keyed map of JSON values
///
/// Keys are kept sorted so the rendered form is deterministic. A value that
/// fails to serialize marks the whole map as unrenderable instead of
/// failing the insert.
#[derive(Clone, Default, PartialEq)]
pub struct FieldMap {
    inner: BTreeMap<String, Value>,
    invalid: bool,
}

// Manual Debug implementation so values don't flood diagnostics
impl fmt::Debug for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMap")
            .field("keys", &self.inner.keys().collect::<Vec<_>>())
            .field("invalid", &self.invalid)
            .finish()
    }
}

impl FieldMap {
    /// Create a new empty FieldMap
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value
    pub fn insert<K: Into<String>, V: Serialize>(&mut self, key: K, value: V) {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.inner.insert(key.into(), v);
            }
            Err(_) => self.invalid = true,
        }
    }

    /// Builder-style insert
    pub fn with<K: Into<String>, V: Serialize>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when nothing was inserted, successfully or not
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty() && !self.invalid
    }

    /// Compact JSON text of the map, or an empty string if any value could
    /// not be serialized
    pub fn render(&self) -> String {
        if self.invalid {
            return String::new();
        }
        serde_json::to_string(&self.inner).unwrap_or_default()
    }

    /// Convert to inner map
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.inner
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            invalid: false,
        }
    }
}

impl From<BTreeMap<String, Value>> for FieldMap {
    fn from(inner: BTreeMap<String, Value>) -> Self {
        Self {
            inner,
            invalid: false,
        }
    }
}
