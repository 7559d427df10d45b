//! Validation results and error trees
//!
//! [`ValidationResult`] is what validating one record produces: errors keyed
//! by paths relative to that record. [`ErrorTree`] is the consolidated form
//! seen by consumers: absolute field errors plus list-level messages that
//! attach to a list's own path rather than to any item.

use fieldkit_path::FieldPath;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Outcome of validating a single record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<FieldPath, String>,
}

impl ValidationResult {
    /// Result without errors
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// Wrap collected errors
    #[inline]
    #[must_use]
    pub fn from_errors(errors: BTreeMap<FieldPath, String>) -> Self {
        Self { errors }
    }

    /// Whether the record passed
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for a path, if any
    #[inline]
    #[must_use]
    pub fn error(&self, path: &FieldPath) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// All errors, keyed by path relative to the record
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<FieldPath, String> {
        &self.errors
    }

    /// Take the errors
    #[inline]
    #[must_use]
    pub fn into_errors(self) -> BTreeMap<FieldPath, String> {
        self.errors
    }
}

/// Consolidated field and list errors of a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTree {
    fields: BTreeMap<FieldPath, String>,
    lists: BTreeMap<FieldPath, String>,
}

/// Key suffix used for list-level messages in the flat representation
pub const LIST_ROOT_KEY: &str = "root";

impl ErrorTree {
    /// Create empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there are neither field nor list errors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.lists.is_empty()
    }

    /// Total number of messages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len() + self.lists.len()
    }

    /// Record a field error
    pub fn insert_field(&mut self, path: FieldPath, message: impl Into<String>) {
        self.fields.insert(path, message.into());
    }

    /// Record a list-level error
    pub fn insert_list(&mut self, path: FieldPath, message: impl Into<String>) {
        self.lists.insert(path, message.into());
    }

    /// Record relative errors under a prefix
    pub fn extend_prefixed<'a, I>(&mut self, prefix: &FieldPath, errors: I)
    where
        I: IntoIterator<Item = (&'a FieldPath, &'a String)>,
    {
        for (path, message) in errors {
            self.fields.insert(prefix.join(path), message.clone());
        }
    }

    /// Merge another tree into this one
    pub fn merge(&mut self, other: ErrorTree) {
        self.fields.extend(other.fields);
        self.lists.extend(other.lists);
    }

    /// Field error at a path
    #[inline]
    #[must_use]
    pub fn field(&self, path: &FieldPath) -> Option<&str> {
        self.fields.get(path).map(String::as_str)
    }

    /// List-level error at a list path
    #[inline]
    #[must_use]
    pub fn list(&self, path: &FieldPath) -> Option<&str> {
        self.lists.get(path).map(String::as_str)
    }

    /// Iterate field errors in path order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.fields.iter().map(|(p, m)| (p, m.as_str()))
    }

    /// Iterate list-level errors in path order
    pub fn lists(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.lists.iter().map(|(p, m)| (p, m.as_str()))
    }

    /// Whether any field error lies at or below `prefix`
    #[must_use]
    pub fn has_errors_under(&self, prefix: &FieldPath) -> bool {
        self.fields.keys().any(|p| prefix.is_prefix_of(p))
            || self.lists.keys().any(|p| prefix.is_prefix_of(p))
    }

    /// Flatten into dotted keys; list-level messages use `<list>.root`
    #[must_use]
    pub fn to_flat(&self) -> BTreeMap<String, String> {
        let mut flat: BTreeMap<String, String> = self
            .fields
            .iter()
            .map(|(p, m)| (p.to_string(), m.clone()))
            .collect();
        for (path, message) in &self.lists {
            flat.insert(path.child_key(LIST_ROOT_KEY).to_string(), message.clone());
        }
        flat
    }
}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flat = self.to_flat();
        let mut map = serializer.serialize_map(Some(flat.len()))?;
        for (key, message) in &flat {
            map.serialize_entry(key, message)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    #[test]
    fn field_and_list_errors_are_distinct() {
        let mut tree = ErrorTree::new();
        tree.insert_list(p("times"), "At least one entry required");
        assert_eq!(tree.list(&p("times")), Some("At least one entry required"));
        assert_eq!(tree.field(&p("times")), None);
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
    }

    #[test]
    fn extend_prefixed_builds_absolute_paths() {
        let mut relative = BTreeMap::new();
        relative.insert(p("start"), "Start time is required".to_string());
        let mut tree = ErrorTree::new();
        tree.extend_prefixed(&p("times.1"), &relative);
        assert_eq!(tree.field(&p("times.1.start")), Some("Start time is required"));
        assert!(tree.has_errors_under(&p("times")));
        assert!(!tree.has_errors_under(&p("name")));
    }

    #[test]
    fn serializes_flat_with_root_suffix() {
        let mut tree = ErrorTree::new();
        tree.insert_field(p("name"), "Name is required");
        tree.insert_field(p("times.0.end"), "End time is required");
        tree.insert_list(p("produce"), "At least one entry required");
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Name is required",
                "times.0.end": "End time is required",
                "produce.root": "At least one entry required"
            })
        );
    }

    #[test]
    fn merge_combines_trees() {
        let mut a = ErrorTree::new();
        a.insert_field(p("name"), "x");
        let mut b = ErrorTree::new();
        b.insert_list(p("times"), "y");
        a.merge(b);
        assert_eq!(a.len(), 2);
    }
}
