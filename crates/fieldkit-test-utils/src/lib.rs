//! Testing utilities for the fieldkit workspace
//!
//! Re-exports the demo form fixtures and adds a recording submit
//! collaborator.

#![allow(missing_docs)]

pub use fieldkit_demo::*;

use fieldkit_core::{delay, SubmitFailure, SubmitHandler};
use fieldkit_schema::{Record, Value};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Submit collaborator
// ============================================================================

/// Submit handler that counts calls and remembers the last values
#[derive(Debug, Default)]
pub struct RecordingSubmit {
    calls: AtomicUsize,
    delay: Duration,
    failure: Option<String>,
    last: Mutex<Option<Record>>,
}

impl RecordingSubmit {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing(delay: Duration, message: impl Into<String>) -> Self {
        Self {
            delay,
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_values(&self) -> Option<Record> {
        self.last.lock().clone()
    }
}

#[async_trait::async_trait]
impl SubmitHandler for RecordingSubmit {
    async fn submit(&self, values: Record) -> Result<Value, SubmitFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(values.clone());
        delay(self.delay).await;
        match &self.failure {
            Some(message) => Err(SubmitFailure::new(message.clone())),
            None => Ok(values.into_value()),
        }
    }
}
