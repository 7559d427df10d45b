//! Form schema: scalar fields plus named lists

use fieldkit_list::ListSchema;
use fieldkit_schema::{RecordSchema, SchemaError};
use indexmap::IndexMap;

/// Shape of a whole form
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    fields: RecordSchema,
    lists: IndexMap<String, ListSchema>,
}

impl FormSchema {
    /// Start building a form schema
    #[must_use]
    pub fn builder() -> FormSchemaBuilder {
        FormSchemaBuilder::default()
    }

    /// Scalar field rules
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &RecordSchema {
        &self.fields
    }

    /// List schema by name
    #[inline]
    #[must_use]
    pub fn list(&self, name: &str) -> Option<&ListSchema> {
        self.lists.get(name)
    }

    /// Lists in declaration order
    pub fn lists(&self) -> impl Iterator<Item = (&str, &ListSchema)> {
        self.lists.iter().map(|(name, schema)| (name.as_str(), schema))
    }
}

/// Builder for [`FormSchema`]
#[derive(Debug, Default)]
pub struct FormSchemaBuilder {
    fields: Option<RecordSchema>,
    lists: Vec<(String, ListSchema)>,
}

impl FormSchemaBuilder {
    /// Scalar field rules
    #[must_use]
    pub fn fields(mut self, fields: RecordSchema) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Add a named list
    #[must_use]
    pub fn list(mut self, name: impl Into<String>, schema: ListSchema) -> Self {
        self.lists.push((name.into(), schema));
        self
    }

    /// Finish the schema
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateField`] if a list name repeats or
    /// collides with a scalar field
    pub fn build(self) -> Result<FormSchema, SchemaError> {
        let fields = self.fields.unwrap_or_else(RecordSchema::empty);
        let mut lists = IndexMap::with_capacity(self.lists.len());
        for (name, schema) in self.lists {
            if fields.contains(&name) || lists.contains_key(&name) {
                return Err(SchemaError::DuplicateField(name));
            }
            lists.insert(name, schema);
        }
        Ok(FormSchema { fields, lists })
    }
}
