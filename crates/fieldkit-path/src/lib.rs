//! fieldkit Field Paths
//!
//! [`FieldPath`] is the addressing scheme shared by values and validation
//! errors: an ordered sequence of key and index segments such as
//! `times.0.start`.
//!
//! # Example
//!
//! ```rust
//! use fieldkit_path::{FieldPath, Segment};
//!
//! let path: FieldPath = "times.0.start".parse().unwrap();
//! assert_eq!(path.segments()[1], Segment::Index(0));
//! assert_eq!(FieldPath::key("times").child_index(0).child_key("start"), path);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod path;

pub use path::{FieldPath, PathError, Segment};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
