//! Form submission phases
//!
//! ```text
//! Idle -> Validating -> Submitting -> Idle
//!             |
//!             +-> Idle   (validation failed)
//! ```

use crate::error::FormError;
use serde::{Deserialize, Serialize};

/// Submission phase of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    /// Accepting edits and submit attempts
    #[default]
    Idle,
    /// Running full validation for a submit attempt
    Validating,
    /// Waiting for the submit collaborator
    Submitting,
}

impl FormPhase {
    /// Whether a submission is in flight
    #[inline]
    #[must_use]
    pub fn is_submitting(self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// Phases reachable from `from`
#[must_use]
pub fn allowed_transitions(from: FormPhase) -> &'static [FormPhase] {
    use FormPhase::{Idle, Submitting, Validating};
    match from {
        Idle => &[Validating],
        Validating => &[Idle, Submitting],
        Submitting => &[Idle],
    }
}

/// Check a phase transition against the table
///
/// # Errors
/// Returns [`FormError::IllegalTransition`] if `to` is not reachable from `from`
pub fn validate_transition(from: FormPhase, to: FormPhase) -> Result<(), FormError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(FormError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn phase() -> impl Strategy<Value = FormPhase> {
        prop_oneof![
            Just(FormPhase::Idle),
            Just(FormPhase::Validating),
            Just(FormPhase::Submitting),
        ]
    }

    #[test]
    fn submit_cycle_is_allowed() {
        assert!(validate_transition(FormPhase::Idle, FormPhase::Validating).is_ok());
        assert!(validate_transition(FormPhase::Validating, FormPhase::Submitting).is_ok());
        assert!(validate_transition(FormPhase::Submitting, FormPhase::Idle).is_ok());
        assert!(validate_transition(FormPhase::Validating, FormPhase::Idle).is_ok());
    }

    #[test]
    fn shortcuts_are_rejected() {
        assert!(validate_transition(FormPhase::Idle, FormPhase::Submitting).is_err());
        assert!(validate_transition(FormPhase::Submitting, FormPhase::Validating).is_err());
        assert!(validate_transition(FormPhase::Submitting, FormPhase::Submitting).is_err());
    }

    proptest! {
        #[test]
        fn validation_agrees_with_table(from in phase(), to in phase()) {
            let allowed = allowed_transitions(from);
            prop_assert_eq!(validate_transition(from, to).is_ok(), allowed.contains(&to));
        }
    }
}
