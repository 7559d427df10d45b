//! fieldkit Core - Form Aggregate
//!
//! Composes scalar fields and keyed lists into one submit-able form:
//! - Scalar and list edits with live or deferred validation
//! - Consolidated error tree for rendering
//! - Single-flight asynchronous submission
//! - Collaborator traits for submission and option loading
//! - TOML-backed configuration
//!
//! # Example
//!
//! ```rust
//! use fieldkit_core::prelude::*;
//! use fieldkit_core::EchoSubmit;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = FormSchema::builder()
//!     .fields(RecordSchema::builder().field("name", TextRule::required("Name is required")).build()?)
//!     .build()?;
//! let defaults = Record::from_value(json!({ "name": "" })).unwrap();
//! let form = Form::new(schema, defaults, EchoSubmit::new(Duration::ZERO), FormConfig::default())?;
//!
//! assert!(matches!(form.submit().await?, SubmitOutcome::Invalid(_)));
//! form.set_value("name", "John Doe")?;
//! assert!(form.submit().await?.is_completed());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod collab;
pub mod error;
pub mod form;
pub mod phase;
pub mod schema;
pub mod types;

// Re-exports for convenience
pub use collab::{
    delay, CachedOptions, DelayedOptions, EchoSubmit, FnSubmit, OptionSource, StaticOptions,
    SubmitHandler,
};
pub use error::{CollabError, ConfigError, FormError, SubmitFailure};
pub use form::Form;
pub use phase::{allowed_transitions, validate_transition, FormPhase};
pub use schema::{FormSchema, FormSchemaBuilder};
pub use types::{
    Applied, FormConfig, FormId, FormSnapshot, Intent, LastSubmission, SubmissionId,
    SubmissionOutcome, SubmitOutcome, ValidationMode,
};

pub use fieldkit_list::{ItemKey, ListController, ListSchema};
pub use fieldkit_path::FieldPath;
pub use fieldkit_schema::{
    ChoiceOption, ChoiceRule, ErrorTree, ItemSchema, NumberRule, Record, RecordSchema,
    SchemaError, TextRule, UnionSchema, Value,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and driving forms
    pub use crate::{
        ChoiceOption, ChoiceRule, ErrorTree, FieldPath, Form, FormConfig, FormError, FormSchema,
        Intent, ListSchema, NumberRule, Record, RecordSchema, SchemaError, SubmitHandler,
        SubmitOutcome, TextRule, UnionSchema, ValidationMode, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
