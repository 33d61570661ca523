//! Panel Records
//!
//! A [`Record`] is one opaque data item produced by a source: a mapping from
//! field name to JSON value. Nothing here validates shape. Renderers read the
//! fields they care about through the typed accessors and substitute
//! placeholders for anything missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One opaque data item returned by a source
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style field insertion
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw field access
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field, if present and a string
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Non-negative integer field
    ///
    /// Accepts JSON floats by truncation, since upstream data files are not
    /// consistent about `20` vs `20.0`.
    #[must_use]
    pub fn u64_field(&self, key: &str) -> Option<u64> {
        let value = self.0.get(key)?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        })
    }

    /// Floating point field
    #[must_use]
    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Boolean field
    #[must_use]
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Nested object field, viewed as a record
    #[must_use]
    pub fn record_field(&self, key: &str) -> Option<Record> {
        self.0
            .get(key)
            .and_then(Value::as_object)
            .map(|m| Record(m.clone()))
    }

    /// Array field whose elements are objects
    ///
    /// Non-object elements are skipped.
    #[must_use]
    pub fn records_field(&self, key: &str) -> Vec<Record> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_object)
                    .map(|m| Record(m.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
