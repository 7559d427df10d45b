//! fieldkit Dynamic Lists
//!
//! Ordered lists of validated records whose entries keep a stable identity
//! across insertion, removal and reordering.
//!
//! # Core Concepts
//!
//! - [`ItemKey`]: per-list identity, never reused
//! - [`ListSchema`]: item shape plus length constraints
//! - [`ListController`]: structural operations with incremental validation
//!
//! # Example
//!
//! ```rust
//! use fieldkit_list::{ListController, ListSchema};
//! use fieldkit_schema::{Record, RecordSchema, TextRule};
//! use serde_json::json;
//!
//! let item = RecordSchema::builder()
//!     .field("start", TextRule::required("Start time is required"))
//!     .build()?;
//! let mut times = ListController::new(ListSchema::new(item));
//! assert_eq!(times.list_error(), Some("At least one entry required"));
//!
//! let key = times.append(Record::from_value(json!({ "start": "08:00" })).unwrap());
//! assert_eq!(times.list_error(), None);
//! assert_eq!(times.position_of(key), Some(0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod controller;
mod key;
mod schema;

pub use controller::ListController;
pub use key::ItemKey;
pub use schema::{ListSchema, ListSchemaBuilder, DEFAULT_MIN_MESSAGE};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with lists
    pub use crate::{ItemKey, ListController, ListSchema};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
