//! Error types for fieldkit Core
//!
//! - Form misuse (unknown names, busy form, illegal phase transitions)
//! - Collaborator failures (submit, option loading)
//! - Configuration loading

use crate::phase::FormPhase;
use fieldkit_path::PathError;
use fieldkit_schema::SchemaError;
use std::path::PathBuf;

/// Main form error type
///
/// Invalid user input is never a `FormError`; it is reported through the
/// error tree. These errors describe programmer or configuration mistakes
/// and operations attempted at the wrong time.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// No scalar field with this name
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// No list with this name
    #[error("unknown list: {0}")]
    UnknownList(String),

    /// Initial values do not fit the declared lists
    #[error("invalid defaults for list '{list}': {reason}")]
    InvalidDefaults { list: String, reason: String },

    /// Inputs are locked while a submission is in flight
    #[error("form is busy submitting")]
    Busy,

    /// Phase transition not in the transition table
    #[error("illegal phase transition: {from:?} -> {to:?}")]
    IllegalTransition { from: FormPhase, to: FormPhase },

    /// Schema misconfiguration
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Malformed field path
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Intent could not be dispatched
    #[error("invalid intent: {0}")]
    InvalidIntent(String),

    /// Submission task ended without reporting an outcome
    #[error("submission aborted: {0}")]
    SubmissionAborted(String),
}

impl FormError {
    /// Whether the same call may succeed later without any fix
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Failure reported by a submit collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SubmitFailure {
    message: String,
}

impl SubmitFailure {
    /// Create failure with a message
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Failure message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Data-fetch collaborator errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollabError {
    /// Source could not produce options
    #[error("option source unavailable: {0}")]
    Unavailable(String),

    /// Source produced no options
    #[error("option source returned no options")]
    Empty,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`crate::FormConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_busy_is_recoverable() {
        assert!(FormError::Busy.is_recoverable());
        assert!(!FormError::UnknownList("times".into()).is_recoverable());
        assert!(!FormError::Schema(SchemaError::NotAUnion).is_recoverable());
    }

    #[test]
    fn messages() {
        assert_eq!(FormError::UnknownField("nme".into()).to_string(), "unknown field: nme");
        assert_eq!(
            FormError::IllegalTransition {
                from: FormPhase::Idle,
                to: FormPhase::Submitting
            }
            .to_string(),
            "illegal phase transition: Idle -> Submitting"
        );
        assert_eq!(SubmitFailure::new("server down").to_string(), "server down");
    }
}
