//! Discriminated unions and item schemas
//!
//! A [`UnionSchema`] selects one of several [`RecordSchema`]s by the value of
//! a tag field (e.g. `type: "vegetable" | "fruit"`). [`ItemSchema`] is the sum
//! of plain and union shapes that list items are validated against.

use crate::error::SchemaError;
use crate::record::Record;
use crate::rule::quoted_list;
use crate::schema::RecordSchema;
use crate::tree::ValidationResult;
use fieldkit_path::FieldPath;
use std::collections::BTreeMap;

/// Resolved variant of a particular [`UnionSchema`]
///
/// Obtained from [`UnionSchema::variant`], so an unknown variant name is
/// reported once, where the hint is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantId(usize);

/// Record shapes selected by a discriminator field
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    discriminator: String,
    variants: Vec<(String, RecordSchema)>,
}

impl UnionSchema {
    /// Start building a union tagged by `discriminator`
    #[inline]
    #[must_use]
    pub fn builder(discriminator: impl Into<String>) -> UnionSchemaBuilder {
        UnionSchemaBuilder {
            discriminator: discriminator.into(),
            variants: Vec::new(),
        }
    }

    /// Tag field name
    #[inline]
    #[must_use]
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Variant names in declaration order
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(name, _)| name.as_str())
    }

    /// Resolve a variant name
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownVariant`] if the union does not declare it
    pub fn variant(&self, name: &str) -> Result<VariantId, SchemaError> {
        self.variants
            .iter()
            .position(|(n, _)| n == name)
            .map(VariantId)
            .ok_or_else(|| SchemaError::UnknownVariant {
                name: name.to_string(),
                expected: self.expected_names(),
            })
    }

    /// Name of a resolved variant
    #[must_use]
    pub fn variant_name(&self, id: VariantId) -> Option<&str> {
        self.variants.get(id.0).map(|(name, _)| name.as_str())
    }

    /// Schema of a resolved variant
    #[must_use]
    pub fn variant_schema(&self, id: VariantId) -> Option<&RecordSchema> {
        self.variants.get(id.0).map(|(_, schema)| schema)
    }

    /// Variant selected by a record's tag
    #[must_use]
    pub fn resolve(&self, record: &Record) -> Option<VariantId> {
        let tag = record.get_str(&self.discriminator)?;
        self.variants.iter().position(|(n, _)| n == tag).map(VariantId)
    }

    /// Validate a record, selecting the variant by its tag
    ///
    /// A missing or unknown tag is a data error on the discriminator path.
    #[must_use]
    pub fn validate(&self, record: &Record) -> ValidationResult {
        match self.resolve(record) {
            Some(id) => self.validate_variant(record, id),
            None => {
                let mut errors = BTreeMap::new();
                errors.insert(
                    FieldPath::key(self.discriminator.clone()),
                    format!(
                        "Invalid discriminator value. Expected {}",
                        quoted_list(&self.variants.iter().map(|(n, _)| n).collect::<Vec<_>>())
                    ),
                );
                ValidationResult::from_errors(errors)
            }
        }
    }

    /// Validate a record against a hinted variant, ignoring its tag
    #[must_use]
    pub fn validate_variant(&self, record: &Record, id: VariantId) -> ValidationResult {
        match self.variant_schema(id) {
            Some(schema) => schema.validate(record),
            None => self.validate(record),
        }
    }

    /// Coerce numeric input according to the record's variant
    #[must_use]
    pub fn normalize(&self, record: &Record) -> Record {
        match self.resolve(record).and_then(|id| self.variant_schema(id)) {
            Some(schema) => schema.normalize(record),
            None => record.clone(),
        }
    }

    /// Reshape a record into another variant
    ///
    /// Fields declared by the target variant keep their current values,
    /// missing ones are taken from `defaults`, everything else is dropped and
    /// the tag is set to the target variant.
    #[must_use]
    pub fn reshape(&self, record: &Record, id: VariantId, defaults: &Record) -> Option<Record> {
        let (name, schema) = self.variants.get(id.0)?;
        let mut reshaped = schema.project(record);
        for (field, value) in defaults.iter() {
            if schema.contains(field) && !reshaped.contains_key(field) {
                reshaped.insert(field.clone(), value.clone());
            }
        }
        reshaped.insert(self.discriminator.clone(), name.clone());
        Some(reshaped)
    }

    fn expected_names(&self) -> String {
        self.variants
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Builder for [`UnionSchema`]
#[derive(Debug)]
pub struct UnionSchemaBuilder {
    discriminator: String,
    variants: Vec<(String, RecordSchema)>,
}

impl UnionSchemaBuilder {
    /// Declare a variant
    #[must_use]
    pub fn variant(mut self, name: impl Into<String>, schema: RecordSchema) -> Self {
        self.variants.push((name.into(), schema));
        self
    }

    /// Finish the union
    ///
    /// # Errors
    /// Returns error for an empty variant set, duplicate variant names, or a
    /// variant that declares the discriminator as an ordinary field
    pub fn build(self) -> Result<UnionSchema, SchemaError> {
        if self.variants.is_empty() {
            return Err(SchemaError::NoVariants(self.discriminator));
        }
        for (i, (name, schema)) in self.variants.iter().enumerate() {
            if self.variants[..i].iter().any(|(n, _)| n == name) {
                return Err(SchemaError::DuplicateVariant(name.clone()));
            }
            if schema.contains(&self.discriminator) {
                return Err(SchemaError::DiscriminatorConflict {
                    variant: name.clone(),
                    field: self.discriminator.clone(),
                });
            }
        }
        Ok(UnionSchema {
            discriminator: self.discriminator,
            variants: self.variants,
        })
    }
}

/// Shape of a list item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSchema {
    /// Every item has the same fields
    Record(RecordSchema),
    /// Items are tagged variants
    Union(UnionSchema),
}

impl ItemSchema {
    /// Validate an item
    #[must_use]
    pub fn validate(&self, record: &Record) -> ValidationResult {
        match self {
            ItemSchema::Record(schema) => schema.validate(record),
            ItemSchema::Union(union) => union.validate(record),
        }
    }

    /// Validate an item with an optional variant hint
    ///
    /// The hint is ignored for plain record items.
    #[must_use]
    pub fn validate_hinted(&self, record: &Record, hint: Option<VariantId>) -> ValidationResult {
        match (self, hint) {
            (ItemSchema::Union(union), Some(id)) => union.validate_variant(record, id),
            _ => self.validate(record),
        }
    }

    /// Coerce numeric input
    #[must_use]
    pub fn normalize(&self, record: &Record) -> Record {
        match self {
            ItemSchema::Record(schema) => schema.normalize(record),
            ItemSchema::Union(union) => union.normalize(record),
        }
    }

    /// The union, if items are tagged variants
    #[inline]
    #[must_use]
    pub fn as_union(&self) -> Option<&UnionSchema> {
        match self {
            ItemSchema::Union(union) => Some(union),
            ItemSchema::Record(_) => None,
        }
    }
}

impl From<RecordSchema> for ItemSchema {
    fn from(schema: RecordSchema) -> Self {
        ItemSchema::Record(schema)
    }
}

impl From<UnionSchema> for ItemSchema {
    fn from(union: UnionSchema) -> Self {
        ItemSchema::Union(union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{NumberRule, TextRule};
    use serde_json::json;

    fn p(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn produce() -> UnionSchema {
        let amount = || NumberRule::required().min_with_message(1.0, "Amount must be at least 1");
        UnionSchema::builder("type")
            .variant(
                "vegetable",
                RecordSchema::builder()
                    .field("vegetableName", TextRule::required("Vegetable name is required"))
                    .field("amount", amount())
                    .build()
                    .unwrap(),
            )
            .variant(
                "fruit",
                RecordSchema::builder()
                    .field("fruitName", TextRule::required("Fruit name is required"))
                    .field("amount", amount())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn dispatches_on_tag() {
        let union = produce();
        let result = union.validate(&record(json!({
            "type": "vegetable", "vegetableName": "", "amount": 2
        })));
        assert_eq!(result.error(&p("vegetableName")), Some("Vegetable name is required"));
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn unknown_tag_is_a_data_error() {
        let result = produce().validate(&record(json!({ "type": "meat" })));
        assert_eq!(
            result.error(&p("type")),
            Some("Invalid discriminator value. Expected 'vegetable' | 'fruit'")
        );
        let result = produce().validate(&Record::new());
        assert!(result.error(&p("type")).is_some());
    }

    #[test]
    fn hint_overrides_tag() {
        let union = produce();
        let fruit = union.variant("fruit").unwrap();
        let result = union.validate_variant(&record(json!({ "fruitName": "fig", "amount": 1 })), fruit);
        assert!(result.is_ok());
        assert_eq!(union.variant_name(fruit), Some("fruit"));
    }

    #[test]
    fn unknown_hint_is_reported_once_at_resolution() {
        let err = produce().variant("meat").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownVariant {
                name: "meat".into(),
                expected: "vegetable, fruit".into()
            }
        );
    }

    #[test]
    fn reshape_keeps_shared_fields() {
        let union = produce();
        let fruit = union.variant("fruit").unwrap();
        let reshaped = union
            .reshape(
                &record(json!({ "type": "vegetable", "vegetableName": "leek", "amount": 3 })),
                fruit,
                &record(json!({ "fruitName": "", "amount": 1, "color": "red" })),
            )
            .unwrap();
        assert_eq!(
            reshaped,
            record(json!({ "type": "fruit", "fruitName": "", "amount": 3 }))
        );
    }

    #[test]
    fn build_rejects_misconfiguration() {
        assert_eq!(
            UnionSchema::builder("type").build(),
            Err(SchemaError::NoVariants("type".into()))
        );
        let dup = UnionSchema::builder("type")
            .variant("a", RecordSchema::empty())
            .variant("a", RecordSchema::empty())
            .build();
        assert_eq!(dup, Err(SchemaError::DuplicateVariant("a".into())));
        let conflict = UnionSchema::builder("type")
            .variant(
                "a",
                RecordSchema::builder()
                    .field("type", TextRule::optional())
                    .build()
                    .unwrap(),
            )
            .build();
        assert!(matches!(conflict, Err(SchemaError::DiscriminatorConflict { .. })));
    }

    #[test]
    fn item_schema_hint_ignored_for_records() {
        let item = ItemSchema::from(
            RecordSchema::builder()
                .field("start", TextRule::required("Start time is required"))
                .build()
                .unwrap(),
        );
        let union = produce();
        let hint = union.variant("fruit").ok();
        assert!(!item.validate_hinted(&Record::new(), hint).is_ok());
        assert!(item.as_union().is_none());
    }
}
