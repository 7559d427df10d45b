//! List controller
//!
//! Owns an ordered sequence of records, each with a stable [`ItemKey`].
//!
//! # Layout
//! - `entries`: arena mapping key → record and its item-relative errors
//! - `order`: position → key
//!
//! Errors are stored per entry with paths relative to the item, and only
//! turned into absolute paths (`<list>.<position>.<field>`) when read. Moving
//! an entry therefore carries its errors along, and removing it drops them.
//!
//! # Re-validation
//! - append / insert: every item plus the length constraint
//! - replace / field edit / variant switch: the touched item
//! - remove / move / swap: the length constraint only

use crate::key::{ItemKey, KeyIssuer};
use crate::schema::ListSchema;
use fieldkit_path::FieldPath;
use fieldkit_schema::{ErrorTree, ItemSchema, Record, SchemaError, Value};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct Entry {
    record: Record,
    errors: BTreeMap<FieldPath, String>,
}

/// Ordered, identity-keyed list of validated records
#[derive(Debug, Clone)]
pub struct ListController {
    schema: ListSchema,
    entries: HashMap<ItemKey, Entry>,
    order: Vec<ItemKey>,
    keys: KeyIssuer,
    list_error: Option<String>,
    live: bool,
}

impl ListController {
    /// Create empty list with live validation
    #[must_use]
    pub fn new(schema: ListSchema) -> Self {
        let mut list = Self::dormant(schema);
        list.activate();
        list
    }

    /// Create empty list whose validation has not been activated
    ///
    /// No errors are computed until [`ListController::activate`] is called.
    #[must_use]
    pub fn dormant(schema: ListSchema) -> Self {
        Self {
            schema,
            entries: HashMap::new(),
            order: Vec::new(),
            keys: KeyIssuer::default(),
            list_error: None,
            live: false,
        }
    }

    /// Create list holding initial records
    #[must_use]
    pub fn with_records(schema: ListSchema, records: Vec<Record>, live: bool) -> Self {
        let mut list = Self::dormant(schema);
        for record in records {
            list.push_entry(record);
        }
        if live {
            list.activate();
        }
        list
    }

    /// Turn on live validation and validate everything
    pub fn activate(&mut self) {
        self.live = true;
        self.validate_all();
    }

    /// Whether validation is live
    #[inline]
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// List schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &ListSchema {
        &self.schema
    }

    // ------------------------------------------------------------------
    // Structural operations
    // ------------------------------------------------------------------

    /// Append a record at the tail
    pub fn append(&mut self, record: Record) -> ItemKey {
        let key = self.push_entry(record);
        tracing::debug!(%key, len = self.order.len(), "appended list entry");
        if self.live {
            self.validate_all();
        }
        key
    }

    /// Insert a record at `index`, clamped to the list length
    pub fn insert(&mut self, index: usize, record: Record) -> ItemKey {
        let key = self.keys.issue();
        self.entries.insert(key, Entry::new(record));
        let index = index.min(self.order.len());
        self.order.insert(index, key);
        tracing::debug!(%key, index, len = self.order.len(), "inserted list entry");
        if self.live {
            self.validate_all();
        }
        key
    }

    /// Remove the entry at `index`
    ///
    /// Out-of-range indices are ignored. Errors of the remaining entries are
    /// left as they are; only the length constraint is re-checked.
    pub fn remove(&mut self, index: usize) -> Option<Record> {
        if index >= self.order.len() {
            tracing::debug!(index, len = self.order.len(), "remove ignored: index out of range");
            return None;
        }
        let key = self.order.remove(index);
        let entry = self.entries.remove(&key)?;
        tracing::debug!(%key, index, len = self.order.len(), "removed list entry");
        self.check_length();
        Some(entry.record)
    }

    /// Move the entry at `from` to position `to`
    ///
    /// Returns whether the order changed. Invalid indices and `from == to`
    /// leave the list untouched.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        let len = self.order.len();
        if from >= len || to >= len {
            tracing::debug!(from, to, len, "move ignored: index out of range");
            return false;
        }
        if from == to {
            return false;
        }
        let key = self.order.remove(from);
        self.order.insert(to, key);
        tracing::debug!(%key, from, to, "moved list entry");
        self.check_length();
        true
    }

    /// Swap the entries at `a` and `b`
    ///
    /// Returns whether the order changed.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        let len = self.order.len();
        if a >= len || b >= len || a == b {
            return false;
        }
        self.order.swap(a, b);
        tracing::debug!(a, b, "swapped list entries");
        self.check_length();
        true
    }

    /// Replace the record at `index`, keeping its identity
    pub fn replace(&mut self, index: usize, record: Record) -> bool {
        let Some(key) = self.key_at(index) else {
            return false;
        };
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.record = record;
        }
        self.revalidate(key);
        true
    }

    /// Set one value inside the record at `index`
    ///
    /// `path` is relative to the item. Returns `false` if the index is out of
    /// range or the path cannot be written.
    pub fn set_field(&mut self, index: usize, path: &FieldPath, value: Value) -> bool {
        let Some(key) = self.key_at(index) else {
            return false;
        };
        let written = self
            .entries
            .get_mut(&key)
            .is_some_and(|entry| entry.record.set_path(path, value));
        if written {
            self.revalidate(key);
        }
        written
    }

    /// Switch the entry at `index` to another union variant
    ///
    /// Fields shared by both variants keep their values; fields the new
    /// variant does not declare are dropped; missing ones come from
    /// `defaults`. Returns `Ok(false)` for an out-of-range index.
    ///
    /// # Errors
    /// Returns error if items are not a union or the variant is unknown
    pub fn replace_item_variant(
        &mut self,
        index: usize,
        variant: &str,
        defaults: &Record,
    ) -> Result<bool, SchemaError> {
        let union = self.schema.item().as_union().ok_or(SchemaError::NotAUnion)?;
        let id = union.variant(variant)?;
        let Some(key) = self.key_at(index) else {
            return Ok(false);
        };
        let Some(entry) = self.entries.get_mut(&key) else {
            return Ok(false);
        };
        if let Some(reshaped) = union.reshape(&entry.record, id, defaults) {
            entry.record = reshaped;
        }
        tracing::debug!(%key, index, variant, "switched list entry variant");
        self.revalidate(key);
        Ok(true)
    }

    /// Replace every entry with `records`
    ///
    /// The key counter carries on, so keys issued before the reset are never
    /// handed out again. Validation starts over as live or dormant.
    pub fn reset_to(&mut self, records: Vec<Record>, live: bool) {
        self.order.clear();
        self.entries.clear();
        self.list_error = None;
        self.live = false;
        for record in records {
            self.push_entry(record);
        }
        if live {
            self.activate();
        }
        tracing::debug!(len = self.order.len(), live, "reset list");
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
        self.check_length();
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Re-validate every entry and the length constraint
    pub fn validate_all(&mut self) {
        if !self.live {
            return;
        }
        let item = self.schema.item();
        for entry in self.entries.values_mut() {
            entry.errors = item.validate(&entry.record).into_errors();
        }
        self.check_length();
        tracing::debug!(
            len = self.order.len(),
            invalid = self.entries.values().filter(|e| !e.errors.is_empty()).count(),
            "validated list"
        );
    }

    fn revalidate(&mut self, key: ItemKey) {
        if !self.live {
            return;
        }
        let item: &ItemSchema = self.schema.item();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.errors = item.validate(&entry.record).into_errors();
        }
    }

    fn check_length(&mut self) {
        if self.live {
            self.list_error = self.schema.check_length(self.order.len());
        }
    }

    fn push_entry(&mut self, record: Record) -> ItemKey {
        let key = self.keys.issue();
        self.entries.insert(key, Entry::new(record));
        self.order.push(key);
        key
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the list is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in list order
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[ItemKey] {
        &self.order
    }

    /// Key at a position
    #[inline]
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<ItemKey> {
        self.order.get(index).copied()
    }

    /// Current position of a key
    #[must_use]
    pub fn position_of(&self, key: ItemKey) -> Option<usize> {
        self.order.iter().position(|k| *k == key)
    }

    /// Record at a position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.key_at(index).and_then(|key| self.get_by_key(key))
    }

    /// Record by identity
    #[must_use]
    pub fn get_by_key(&self, key: ItemKey) -> Option<&Record> {
        self.entries.get(&key).map(|e| &e.record)
    }

    /// Entries in list order
    pub fn iter(&self) -> impl Iterator<Item = (ItemKey, &Record)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|e| (*key, &e.record)))
    }

    /// Records in list order
    #[must_use]
    pub fn values(&self) -> Vec<Record> {
        self.iter().map(|(_, record)| record.clone()).collect()
    }

    /// Records in list order as a JSON array
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(self.iter().map(|(_, r)| r.clone().into_value()).collect())
    }

    /// Records in list order with numeric input coerced
    #[must_use]
    pub fn normalized_records(&self) -> Vec<Record> {
        let item = self.schema.item();
        self.iter().map(|(_, r)| item.normalize(r)).collect()
    }

    /// Item-relative errors of an entry
    #[must_use]
    pub fn item_errors(&self, key: ItemKey) -> Option<&BTreeMap<FieldPath, String>> {
        self.entries.get(&key).map(|e| &e.errors)
    }

    /// Whole-list error, if any
    #[inline]
    #[must_use]
    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }

    /// Whether any item or list error is present
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.list_error.is_some() || self.entries.values().any(|e| !e.errors.is_empty())
    }

    /// Errors with absolute paths, for a list located at `prefix`
    #[must_use]
    pub fn errors_at(&self, prefix: &FieldPath) -> ErrorTree {
        let mut tree = ErrorTree::new();
        for (position, key) in self.order.iter().enumerate() {
            if let Some(entry) = self.entries.get(key) {
                tree.extend_prefixed(&prefix.child_index(position), &entry.errors);
            }
        }
        if let Some(message) = &self.list_error {
            tree.insert_list(prefix.clone(), message.clone());
        }
        tree
    }
}

impl Entry {
    fn new(record: Record) -> Self {
        Self {
            record,
            errors: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DEFAULT_MIN_MESSAGE;
    use fieldkit_schema::{NumberRule, RecordSchema, TextRule, UnionSchema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn p(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn named() -> ListSchema {
        ListSchema::new(
            RecordSchema::builder()
                .field("name", TextRule::required("Name is required"))
                .build()
                .unwrap(),
        )
    }

    fn entry(name: &str) -> Record {
        record(json!({ "name": name }))
    }

    fn names(list: &ListController) -> Vec<String> {
        list.iter()
            .map(|(_, r)| r.get_str("name").unwrap_or_default().to_string())
            .collect()
    }

    fn produce() -> ListSchema {
        ListSchema::new(
            UnionSchema::builder("type")
                .variant(
                    "vegetable",
                    RecordSchema::builder()
                        .field("vegetableName", TextRule::required("Vegetable name is required"))
                        .field("amount", NumberRule::required().min(1.0))
                        .build()
                        .unwrap(),
                )
                .variant(
                    "fruit",
                    RecordSchema::builder()
                        .field("fruitName", TextRule::required("Fruit name is required"))
                        .field("amount", NumberRule::required().min(1.0))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn new_empty_list_reports_minimum() {
        let list = ListController::new(named());
        assert_eq!(list.list_error(), Some(DEFAULT_MIN_MESSAGE));
        assert!(list.has_errors());
    }

    #[test]
    fn append_validates_and_clears_minimum() {
        let mut list = ListController::new(named());
        let key = list.append(entry(""));
        assert_eq!(list.list_error(), None);
        assert_eq!(
            list.item_errors(key).unwrap().get(&p("name")).map(String::as_str),
            Some("Name is required")
        );
    }

    #[test]
    fn insert_clamps_index() {
        let mut list = ListController::new(named());
        list.append(entry("a"));
        list.insert(0, entry("b"));
        list.insert(99, entry("c"));
        assert_eq!(names(&list), vec!["b", "a", "c"]);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut list = ListController::new(named());
        list.append(entry("a"));
        assert!(list.remove(3).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_prunes_errors_and_keeps_sibling_errors() {
        let mut list = ListController::new(named());
        list.append(entry(""));
        list.append(entry(""));
        let removed = list.remove(0).unwrap();
        assert_eq!(removed, entry(""));

        let tree = list.errors_at(&p("people"));
        assert_eq!(tree.field(&p("people.0.name")), Some("Name is required"));
        assert_eq!(tree.field(&p("people.1.name")), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_last_entry_sets_list_error() {
        let mut list = ListController::with_records(named(), vec![entry("a")], true);
        list.remove(0);
        assert!(list.is_empty());
        assert_eq!(list.list_error(), Some("At least one entry required"));
        assert_eq!(
            list.errors_at(&p("times")).list(&p("times")),
            Some("At least one entry required")
        );
        assert_eq!(list.to_value(), json!([]));
    }

    #[test]
    fn move_reorders_keys() {
        let mut list =
            ListController::with_records(named(), vec![entry("A"), entry("B"), entry("C")], true);
        let keys = list.keys().to_vec();
        assert!(list.move_item(2, 0));
        assert_eq!(names(&list), vec!["C", "A", "B"]);
        assert_eq!(list.keys(), &[keys[2], keys[0], keys[1]]);
    }

    #[test]
    fn move_carries_errors_with_the_entry() {
        let mut list =
            ListController::with_records(named(), vec![entry("A"), entry(""), entry("C")], true);
        let bad = list.key_at(1).unwrap();
        list.move_item(1, 2);
        let tree = list.errors_at(&p("people"));
        assert_eq!(tree.field(&p("people.2.name")), Some("Name is required"));
        assert_eq!(tree.field(&p("people.1.name")), None);
        assert_eq!(list.position_of(bad), Some(2));
    }

    #[test]
    fn move_same_index_and_invalid_index_are_noops() {
        let mut list = ListController::with_records(named(), vec![entry("A"), entry("")], true);
        let before = list.errors_at(&p("x"));
        let keys = list.keys().to_vec();
        assert!(!list.move_item(1, 1));
        assert!(!list.move_item(0, 5));
        assert_eq!(list.keys(), keys.as_slice());
        assert_eq!(list.errors_at(&p("x")), before);
    }

    #[test]
    fn swap_exchanges_positions() {
        let mut list =
            ListController::with_records(named(), vec![entry("A"), entry("B"), entry("C")], true);
        assert!(list.swap(0, 1));
        assert_eq!(names(&list), vec!["B", "A", "C"]);
        assert!(!list.swap(0, 0));
        assert!(!list.swap(0, 9));
    }

    #[test]
    fn set_field_revalidates_only_that_entry() {
        let mut list = ListController::with_records(named(), vec![entry(""), entry("")], true);
        assert!(list.set_field(0, &p("name"), json!("Ada")));
        let tree = list.errors_at(&p("people"));
        assert_eq!(tree.field(&p("people.0.name")), None);
        assert_eq!(tree.field(&p("people.1.name")), Some("Name is required"));
        assert!(!list.set_field(7, &p("name"), json!("x")));
    }

    #[test]
    fn replace_keeps_identity() {
        let mut list = ListController::with_records(named(), vec![entry("A")], true);
        let key = list.key_at(0).unwrap();
        assert!(list.replace(0, entry("")));
        assert_eq!(list.key_at(0), Some(key));
        assert!(list.item_errors(key).unwrap().contains_key(&p("name")));
    }

    #[test]
    fn reset_to_never_reissues_keys() {
        let mut list = ListController::with_records(named(), vec![entry("A")], true);
        let appended = list.append(entry("B"));
        let before = list.keys().to_vec();

        list.reset_to(vec![entry("A")], true);
        assert_eq!(names(&list), vec!["A"]);
        assert!(!before.contains(&list.keys()[0]));
        let after = list.append(entry("C"));
        assert_ne!(after, appended);
        assert!(after > appended);
    }

    #[test]
    fn reset_to_dormant_clears_errors() {
        let mut list = ListController::with_records(named(), vec![entry("")], true);
        list.remove(0);
        assert!(list.has_errors());
        list.reset_to(vec![entry("")], false);
        assert!(!list.is_live());
        assert!(!list.has_errors());
        list.activate();
        assert!(list.has_errors());
    }

    #[test]
    fn failed_set_field_leaves_entry_untouched() {
        let mut list = ListController::with_records(
            produce(),
            vec![record(json!({ "type": "vegetable", "vegetableName": "Carrot", "amount": 2.0 }))],
            true,
        );
        let before = list.values();
        assert!(!list.set_field(0, &p("extra.0"), json!("x")));
        assert_eq!(list.values(), before);
    }

    #[test]
    fn dormant_list_has_no_errors_until_activated() {
        let mut list = ListController::with_records(named(), vec![entry("")], false);
        list.remove(0);
        assert!(!list.has_errors());
        list.append(entry(""));
        assert!(!list.has_errors());
        list.activate();
        assert!(list.has_errors());
    }

    #[test]
    fn variant_switch_drops_foreign_fields() {
        let mut list = ListController::with_records(
            produce(),
            vec![record(json!({ "type": "vegetable", "vegetableName": "leek", "amount": 3 }))],
            true,
        );
        let key = list.key_at(0).unwrap();
        let switched = list
            .replace_item_variant(0, "fruit", &record(json!({ "fruitName": "" })))
            .unwrap();
        assert!(switched);
        assert_eq!(list.key_at(0), Some(key));
        assert_eq!(
            list.get(0),
            Some(&record(json!({ "type": "fruit", "fruitName": "", "amount": 3 })))
        );
        let errors = list.item_errors(key).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key(&p("fruitName")));
    }

    #[test]
    fn variant_switch_errors() {
        let mut list = ListController::new(produce());
        assert!(matches!(
            list.replace_item_variant(0, "meat", &Record::new()),
            Err(SchemaError::UnknownVariant { .. })
        ));
        assert_eq!(list.replace_item_variant(0, "fruit", &Record::new()), Ok(false));

        let mut plain = ListController::new(named());
        plain.append(entry("a"));
        assert_eq!(
            plain.replace_item_variant(0, "fruit", &Record::new()),
            Err(SchemaError::NotAUnion)
        );
    }

    #[test]
    fn normalized_records_coerce_amounts() {
        let list = ListController::with_records(
            produce(),
            vec![record(json!({ "type": "fruit", "fruitName": "fig", "amount": "4" }))],
            true,
        );
        assert_eq!(list.normalized_records()[0].get("amount"), Some(&json!(4.0)));
        assert_eq!(list.values()[0].get("amount"), Some(&json!("4")));
    }
}
