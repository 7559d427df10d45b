//! Error types for schema construction
//!
//! Invalid *data* never produces one of these; it is reported through
//! [`crate::ValidationResult`]. These errors describe a misconfigured schema
//! and surface once, when the schema is built or a variant hint is resolved.

/// Schema construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Field declared twice in one record schema
    #[error("duplicate field: '{0}'")]
    DuplicateField(String),

    /// Choice rule without options
    #[error("choice field '{0}' has no options")]
    EmptyChoice(String),

    /// Numeric bound is not a finite number
    #[error("field '{field}' has a non-finite lower bound")]
    InvalidBound { field: String },

    /// Union declared without variants
    #[error("union on '{0}' declares no variants")]
    NoVariants(String),

    /// Variant declared twice in one union
    #[error("duplicate variant: '{0}'")]
    DuplicateVariant(String),

    /// Variant name not declared by the union
    #[error("unknown variant '{name}' (expected one of: {expected})")]
    UnknownVariant { name: String, expected: String },

    /// A variant declares the discriminator as an ordinary field
    #[error("variant '{variant}' redeclares discriminator field '{field}'")]
    DiscriminatorConflict { variant: String, field: String },

    /// Variant operation on a list whose items are not a union
    #[error("item schema is not a discriminated union")]
    NotAUnion,

    /// List bounds cannot be satisfied together
    #[error("list bounds are inconsistent: min {min} > max {max}")]
    InvalidListBounds { min: usize, max: usize },
}

/// Errors converting typed data into a [`crate::Record`]
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Serialization failed
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// Value serialized to something other than an object
    #[error("expected an object, got {0}")]
    NotAnObject(&'static str),
}
