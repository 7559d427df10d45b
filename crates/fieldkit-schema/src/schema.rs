//! Record schemas
//!
//! A [`RecordSchema`] is an ordered set of named [`FieldRule`]s. Validation is
//! pure and total: every rule is checked, every failure is collected, and
//! values the schema does not declare are ignored.

use crate::error::SchemaError;
use crate::record::{json_type_name, Record};
use crate::rule::{FieldRule, NumberRule, REQUIRED_MESSAGE};
use crate::tree::ValidationResult;
use fieldkit_path::FieldPath;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered field rules for one record shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSchema {
    fields: IndexMap<String, FieldRule>,
}

impl RecordSchema {
    /// Start building a schema
    #[inline]
    #[must_use]
    pub fn builder() -> RecordSchemaBuilder {
        RecordSchemaBuilder::default()
    }

    /// Schema without fields; accepts every record
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rule for a field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    /// Check whether a field is declared
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Declared field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of declared fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a whole record
    #[must_use]
    pub fn validate(&self, record: &Record) -> ValidationResult {
        let mut errors = BTreeMap::new();
        self.collect_errors(record.as_map(), &FieldPath::root(), &mut errors);
        ValidationResult::from_errors(errors)
    }

    /// Validate a single declared field
    ///
    /// Returns `None` if the field is not declared. Nested errors carry the
    /// field name as their first segment.
    #[must_use]
    pub fn validate_field(&self, name: &str, record: &Record) -> Option<ValidationResult> {
        let rule = self.fields.get(name)?;
        let mut errors = BTreeMap::new();
        check_rule(rule, record.get(name), &FieldPath::key(name), &mut errors);
        Some(ValidationResult::from_errors(errors))
    }

    /// Keep only the declared fields of a record
    #[must_use]
    pub fn project(&self, record: &Record) -> Record {
        record
            .iter()
            .filter(|(k, _)| self.fields.contains_key(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Coerce numeric string input into numbers, recursively
    ///
    /// Produces the record handed to submission; values that fail coercion
    /// are left unchanged.
    #[must_use]
    pub fn normalize(&self, record: &Record) -> Record {
        let mut out = record.clone();
        for (name, rule) in &self.fields {
            let Some(value) = record.get(name) else {
                continue;
            };
            match rule {
                FieldRule::Number(_) => {
                    out.insert(name.clone(), NumberRule::coerce(value));
                }
                FieldRule::Nested(schema) => {
                    if let Some(nested) = Record::from_value(value.clone()) {
                        out.insert(name.clone(), schema.normalize(&nested).into_value());
                    }
                }
                FieldRule::Text(_) | FieldRule::Choice(_) => {}
            }
        }
        out
    }

    pub(crate) fn collect_errors(
        &self,
        obj: &serde_json::Map<String, Value>,
        prefix: &FieldPath,
        out: &mut BTreeMap<FieldPath, String>,
    ) {
        for (name, rule) in &self.fields {
            check_rule(rule, obj.get(name), &prefix.child_key(name.clone()), out);
        }
    }
}

fn check_rule(
    rule: &FieldRule,
    value: Option<&Value>,
    path: &FieldPath,
    out: &mut BTreeMap<FieldPath, String>,
) {
    let message = match rule {
        FieldRule::Text(text) => text.check(value),
        FieldRule::Number(number) => number.check(value),
        FieldRule::Choice(choice) => choice.check(value),
        FieldRule::Nested(schema) => match value {
            Some(Value::Object(obj)) => {
                schema.collect_errors(obj, path, out);
                None
            }
            None | Some(Value::Null) => Some(REQUIRED_MESSAGE.to_string()),
            Some(other) => Some(format!(
                "Expected object, received {}",
                json_type_name(other)
            )),
        },
    };
    if let Some(message) = message {
        out.insert(path.clone(), message);
    }
}

/// Builder for [`RecordSchema`]
#[derive(Debug, Default)]
pub struct RecordSchemaBuilder {
    fields: Vec<(String, FieldRule)>,
}

impl RecordSchemaBuilder {
    /// Declare a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: impl Into<FieldRule>) -> Self {
        self.fields.push((name.into(), rule.into()));
        self
    }

    /// Finish the schema
    ///
    /// # Errors
    /// Returns error for duplicate fields, choices without options or
    /// non-finite numeric bounds
    pub fn build(self) -> Result<RecordSchema, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, rule) in self.fields {
            match &rule {
                FieldRule::Choice(choice) if choice.options().is_empty() => {
                    return Err(SchemaError::EmptyChoice(name));
                }
                FieldRule::Number(number)
                    if number.lower_bound().is_some_and(|min| !min.is_finite()) =>
                {
                    return Err(SchemaError::InvalidBound { field: name });
                }
                _ => {}
            }
            if fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField(name));
            }
            fields.insert(name, rule);
        }
        Ok(RecordSchema { fields })
    }
}
