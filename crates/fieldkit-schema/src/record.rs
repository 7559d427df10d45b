//! Dynamic record values
//!
//! A [`Record`] is a mapping from field name to JSON-like value. Typed structs
//! and `#[serde(tag = "...")]` enums convert to and from records through serde.

use crate::error::RecordError;
use fieldkit_path::{FieldPath, Segment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value, if it is an object
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Serialize typed data into a record
    ///
    /// # Errors
    /// Returns error if serialization fails or does not produce an object
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self, RecordError> {
        match serde_json::to_value(data)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RecordError::NotAnObject(json_type_name(&other))),
        }
    }

    /// Deserialize the record into typed data
    ///
    /// # Errors
    /// Returns error if the record does not match `T`
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, RecordError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    /// Get a top-level value
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Get a top-level string value
    #[inline]
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Insert a top-level value, returning the previous one
    #[inline]
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Remove a top-level value
    #[inline]
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Check for a top-level field
    #[inline]
    #[must_use]
    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of top-level fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the record has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over top-level fields
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying map
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Look up a value by path
    #[must_use]
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let (head, rest) = path.segments().split_first()?;
        let mut current = self.0.get(head.as_key()?)?;
        for segment in rest {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set a value by path
    ///
    /// Missing intermediate objects are created; list positions must already
    /// exist. Returns `false` when the path cannot be written, in which case
    /// the record is left untouched.
    pub fn set_path(&mut self, path: &FieldPath, value: Value) -> bool {
        let Some((Segment::Key(head), rest)) = path.segments().split_first() else {
            return false;
        };
        if !writable(self.0.get(head), rest) {
            return false;
        }
        let slot = self.0.entry(head.clone()).or_insert(Value::Null);
        set_in(slot, rest, value)
    }
}

/// Whether `set_in` would succeed, checked without creating anything
fn writable(target: Option<&Value>, path: &[Segment]) -> bool {
    let Some((head, rest)) = path.split_first() else {
        return true;
    };
    match (head, target) {
        (Segment::Key(_), None | Some(Value::Null)) => {
            rest.iter().all(|segment| matches!(segment, Segment::Key(_)))
        }
        (Segment::Key(key), Some(Value::Object(map))) => writable(map.get(key), rest),
        (Segment::Index(index), Some(Value::Array(items))) => match items.get(*index) {
            Some(item) => writable(Some(item), rest),
            None => false,
        },
        _ => false,
    }
}

fn set_in(target: &mut Value, path: &[Segment], value: Value) -> bool {
    let Some((head, rest)) = path.split_first() else {
        *target = value;
        return true;
    };
    if target.is_null() && matches!(head, Segment::Key(_)) {
        *target = Value::Object(Map::new());
    }
    match (head, target) {
        (Segment::Key(key), Value::Object(map)) => {
            set_in(map.entry(key.clone()).or_insert(Value::Null), rest, value)
        }
        (Segment::Index(index), Value::Array(items)) => match items.get_mut(*index) {
            Some(slot) => set_in(slot, rest, value),
            None => false,
        },
        _ => false,
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
