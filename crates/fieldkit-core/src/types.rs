//! Core types for fieldkit forms
//!
//! - Form and submission identifiers
//! - Form configuration
//! - Submission outcomes
//! - Render-facing snapshot and intents

use crate::error::ConfigError;
use crate::phase::FormPhase;
use fieldkit_list::ItemKey;
use fieldkit_path::FieldPath;
use fieldkit_schema::{ErrorTree, Record, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use ulid::Ulid;

/// Unique form identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormId(pub Ulid);

impl FormId {
    /// Generate new form ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique submission identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Ulid);

impl SubmissionId {
    /// Generate new submission ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// When validation errors start being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Errors are live from creation
    #[default]
    OnChange,
    /// No errors until the first submit attempt, live afterwards
    OnSubmit,
}

/// Form configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// When errors start being reported
    pub validation_mode: ValidationMode,
    /// Reject edits with [`crate::FormError::Busy`] while submitting
    pub lock_inputs_while_submitting: bool,
    /// Simulated submit latency in milliseconds
    pub submit_delay_ms: u64,
    /// Simulated option fetch latency in milliseconds
    pub options_delay_ms: u64,
}

impl FormConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With validation mode
    #[inline]
    #[must_use]
    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// With input lock while submitting
    #[inline]
    #[must_use]
    pub fn with_input_lock(mut self, lock: bool) -> Self {
        self.lock_inputs_while_submitting = lock;
        self
    }

    /// With submit latency
    #[inline]
    #[must_use]
    pub fn with_submit_delay_ms(mut self, ms: u64) -> Self {
        self.submit_delay_ms = ms;
        self
    }

    /// With option fetch latency
    #[inline]
    #[must_use]
    pub fn with_options_delay_ms(mut self, ms: u64) -> Self {
        self.options_delay_ms = ms;
        self
    }

    /// Submit latency as a duration
    #[inline]
    #[must_use]
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// Option fetch latency as a duration
    #[inline]
    #[must_use]
    pub fn options_delay(&self) -> Duration {
        Duration::from_millis(self.options_delay_ms)
    }

    /// Parse configuration from TOML text
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the text is not valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::OnChange,
            lock_inputs_while_submitting: false,
            submit_delay_ms: 1500,
            options_delay_ms: 1111,
        }
    }
}

// ============================================================================
// Submission
// ============================================================================

/// Result of one `submit()` call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Collaborator accepted the values
    Completed(Value),
    /// Validation failed; the collaborator was not invoked
    Invalid(ErrorTree),
    /// Collaborator reported a failure
    Failed(String),
    /// A submission was already in flight; nothing happened
    Rejected,
}

impl SubmitOutcome {
    /// Whether the collaborator accepted the values
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Whether the call was rejected as a duplicate
    #[inline]
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Recorded outcome of the last submission that reached the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Collaborator returned a value
    Succeeded(Value),
    /// Collaborator failed with a message
    Failed(String),
}

/// Last submission that reached the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSubmission {
    /// Submission identifier
    pub id: SubmissionId,
    /// What the collaborator returned
    pub outcome: SubmissionOutcome,
}

// ============================================================================
// Render collaborator
// ============================================================================

/// Everything a renderer needs to draw the form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    /// Form identifier
    pub id: FormId,
    /// Current values, lists in order
    pub values: Record,
    /// Consolidated errors
    pub errors: ErrorTree,
    /// Submission phase
    pub phase: FormPhase,
    /// Whether a submission is in flight
    pub is_submitting: bool,
    /// Last submission that reached the collaborator
    pub last_submission: Option<LastSubmission>,
    /// Identity keys of every list, in list order
    pub keys: IndexMap<String, Vec<ItemKey>>,
}

/// User action emitted by a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Edit a scalar field (`name`) or a list entry field (`times.0.start`)
    Change { path: FieldPath, value: Value },
    /// Append an entry to a list
    Append {
        list: String,
        #[serde(default)]
        record: Record,
    },
    /// Insert an entry at a position
    Insert {
        list: String,
        index: usize,
        #[serde(default)]
        record: Record,
    },
    /// Remove the entry at a position
    Remove { list: String, index: usize },
    /// Move an entry to another position
    Move { list: String, from: usize, to: usize },
    /// Swap two entries
    Swap { list: String, a: usize, b: usize },
    /// Change the variant of a union entry
    SwitchVariant {
        list: String,
        index: usize,
        variant: String,
        #[serde(default)]
        defaults: Record,
    },
    /// Submit the form
    Submit,
}

/// Effect of an applied [`Intent`]
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Edit or structural change; `false` when nothing changed
    Updated(bool),
    /// New entry with its key
    Added(ItemKey),
    /// Submission result
    Submitted(SubmitOutcome),
}
