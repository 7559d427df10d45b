//! fieldkit Schema Engine
//!
//! Declarative validation of records and discriminated-union records.
//!
//! # Core Concepts
//!
//! - [`Record`]: mapping from field name to JSON-like value
//! - [`FieldRule`]: text, number (string input coerced), choice, nested record
//! - [`RecordSchema`]: ordered field rules for one record shape
//! - [`UnionSchema`]: record shapes selected by a discriminator field
//! - [`ValidationResult`] / [`ErrorTree`]: errors keyed by [`FieldPath`]
//!
//! Validation is pure: invalid data is always reported as errors, never as a
//! failure of the call. [`SchemaError`] only describes misconfigured schemas
//! and is returned when a schema is built.
//!
//! # Example
//!
//! ```rust
//! use fieldkit_schema::{NumberRule, Record, RecordSchema, TextRule, UnionSchema};
//! use serde_json::json;
//!
//! let fruit = RecordSchema::builder()
//!     .field("fruitName", TextRule::required("Fruit name is required"))
//!     .field("amount", NumberRule::required().min(1.0))
//!     .build()?;
//! let produce = UnionSchema::builder("type").variant("fruit", fruit).build()?;
//!
//! let item = Record::from_value(json!({ "type": "fruit", "fruitName": "", "amount": "5" })).unwrap();
//! let result = produce.validate(&item);
//! assert_eq!(result.error(&"fruitName".parse()?), Some("Fruit name is required"));
//! assert_eq!(result.error(&"amount".parse()?), None);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod record;
mod rule;
mod schema;
mod tree;
mod union;

pub use error::{RecordError, SchemaError};
pub use record::Record;
pub use rule::{ChoiceOption, ChoiceRule, FieldRule, NumberRule, TextRule, REQUIRED_MESSAGE};
pub use schema::{RecordSchema, RecordSchemaBuilder};
pub use tree::{ErrorTree, ValidationResult, LIST_ROOT_KEY};
pub use union::{ItemSchema, UnionSchema, UnionSchemaBuilder, VariantId};

pub use fieldkit_path::{FieldPath, PathError, Segment};
pub use serde_json::Value;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring and running schemas
    pub use crate::{
        ChoiceOption, ChoiceRule, ErrorTree, FieldPath, ItemSchema, NumberRule, Record,
        RecordSchema, SchemaError, TextRule, UnionSchema, ValidationResult, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
