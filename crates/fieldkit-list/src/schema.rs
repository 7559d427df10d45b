//! List schemas: item shape plus whole-list length constraints

use fieldkit_schema::{ItemSchema, SchemaError};
use std::sync::Arc;

/// Default message for a list shorter than its minimum
pub const DEFAULT_MIN_MESSAGE: &str = "At least one entry required";

/// Item shape and length constraints of a list
///
/// Cheap to clone; the item schema is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSchema {
    item: Arc<ItemSchema>,
    min_items: usize,
    max_items: Option<usize>,
    min_message: String,
    max_message: Option<String>,
}

impl ListSchema {
    /// Start building a list schema
    #[must_use]
    pub fn builder(item: impl Into<ItemSchema>) -> ListSchemaBuilder {
        ListSchemaBuilder {
            schema: ListSchema {
                item: Arc::new(item.into()),
                min_items: 1,
                max_items: None,
                min_message: DEFAULT_MIN_MESSAGE.to_string(),
                max_message: None,
            },
        }
    }

    /// List schema with default constraints (at least one entry)
    #[must_use]
    pub fn new(item: impl Into<ItemSchema>) -> Self {
        Self::builder(item).schema
    }

    /// Item shape
    #[inline]
    #[must_use]
    pub fn item(&self) -> &ItemSchema {
        &self.item
    }

    /// Minimum number of entries
    #[inline]
    #[must_use]
    pub fn min_items(&self) -> usize {
        self.min_items
    }

    /// Maximum number of entries, if bounded
    #[inline]
    #[must_use]
    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// Whole-list message for a given length, if the length is out of bounds
    #[must_use]
    pub fn check_length(&self, len: usize) -> Option<String> {
        if len < self.min_items {
            return Some(self.min_message.clone());
        }
        match self.max_items {
            Some(max) if len > max => Some(
                self.max_message
                    .clone()
                    .unwrap_or_else(|| format!("At most {max} entries allowed")),
            ),
            _ => None,
        }
    }
}

/// Builder for [`ListSchema`]
#[derive(Debug)]
pub struct ListSchemaBuilder {
    schema: ListSchema,
}

impl ListSchemaBuilder {
    /// Minimum number of entries (default 1)
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        self.schema.min_items = min;
        self
    }

    /// Message when below the minimum
    #[must_use]
    pub fn min_message(mut self, message: impl Into<String>) -> Self {
        self.schema.min_message = message.into();
        self
    }

    /// Maximum number of entries
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        self.schema.max_items = Some(max);
        self
    }

    /// Message when above the maximum
    #[must_use]
    pub fn max_message(mut self, message: impl Into<String>) -> Self {
        self.schema.max_message = Some(message.into());
        self
    }

    /// Finish the schema
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidListBounds`] if the maximum is below the minimum
    pub fn build(self) -> Result<ListSchema, SchemaError> {
        match self.schema.max_items {
            Some(max) if max < self.schema.min_items => Err(SchemaError::InvalidListBounds {
                min: self.schema.min_items,
                max,
            }),
            _ => Ok(self.schema),
        }
    }
}
