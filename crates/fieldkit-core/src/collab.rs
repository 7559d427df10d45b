//! Collaborator traits and stock implementations
//!
//! - [`SubmitHandler`]: receives validated, normalized values
//! - [`OptionSource`]: supplies choice options, possibly slowly
//!
//! Latency is simulated with [`delay`] so tests can run on a paused clock.

use crate::error::{CollabError, SubmitFailure};
use fieldkit_schema::{ChoiceOption, Record, Value};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Sleep on the tokio clock; a zero duration returns at once
pub async fn delay(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    tokio::time::sleep(duration).await;
}

// ============================================================================
// Submit collaborator
// ============================================================================

/// Receives the values of a valid form
#[async_trait::async_trait]
pub trait SubmitHandler: Send + Sync {
    /// Submit values; the returned value is recorded as the outcome
    async fn submit(&self, values: Record) -> Result<Value, SubmitFailure>;
}

#[async_trait::async_trait]
impl<H: SubmitHandler + ?Sized> SubmitHandler for Arc<H> {
    async fn submit(&self, values: Record) -> Result<Value, SubmitFailure> {
        (**self).submit(values).await
    }
}

/// Returns the submitted values after a fixed delay
#[derive(Debug, Clone, Copy)]
pub struct EchoSubmit {
    delay: Duration,
}

impl EchoSubmit {
    /// Echo after `delay`
    #[inline]
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for EchoSubmit {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait::async_trait]
impl SubmitHandler for EchoSubmit {
    async fn submit(&self, values: Record) -> Result<Value, SubmitFailure> {
        delay(self.delay).await;
        Ok(values.into_value())
    }
}

/// Adapts a closure returning a boxed future
pub struct FnSubmit<F> {
    f: F,
}

impl<F> FnSubmit<F>
where
    F: Fn(Record) -> BoxFuture<'static, Result<Value, SubmitFailure>> + Send + Sync,
{
    /// Wrap a closure
    #[inline]
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnSubmit<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSubmit").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<F> SubmitHandler for FnSubmit<F>
where
    F: Fn(Record) -> BoxFuture<'static, Result<Value, SubmitFailure>> + Send + Sync,
{
    async fn submit(&self, values: Record) -> Result<Value, SubmitFailure> {
        (self.f)(values).await
    }
}

// ============================================================================
// Data-fetch collaborator
// ============================================================================

/// Supplies options for a choice field
#[async_trait::async_trait]
pub trait OptionSource: Send + Sync {
    /// Load the options
    async fn load_options(&self) -> Result<Vec<ChoiceOption>, CollabError>;
}

/// Fixed option list
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    options: Vec<ChoiceOption>,
}

impl StaticOptions {
    /// Wrap a fixed list
    #[must_use]
    pub fn new(options: Vec<ChoiceOption>) -> Self {
        Self { options }
    }
}

#[async_trait::async_trait]
impl OptionSource for StaticOptions {
    async fn load_options(&self) -> Result<Vec<ChoiceOption>, CollabError> {
        Ok(self.options.clone())
    }
}

/// Delays another source, as a slow fetch would
#[derive(Debug, Clone)]
pub struct DelayedOptions<S> {
    source: S,
    delay: Duration,
}

impl<S: OptionSource> DelayedOptions<S> {
    /// Delay `source` by `delay`
    #[must_use]
    pub fn new(source: S, delay: Duration) -> Self {
        Self { source, delay }
    }
}

#[async_trait::async_trait]
impl<S: OptionSource> OptionSource for DelayedOptions<S> {
    async fn load_options(&self) -> Result<Vec<ChoiceOption>, CollabError> {
        delay(self.delay).await;
        self.source.load_options().await
    }
}

/// Loads from a source once and serves the cached list afterwards
///
/// A failed or empty load is not cached; the next call tries again.
#[derive(Debug)]
pub struct CachedOptions<S> {
    source: S,
    cell: OnceCell<Vec<ChoiceOption>>,
}

impl<S: OptionSource> CachedOptions<S> {
    /// Cache `source`
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Cached options, if already loaded
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&[ChoiceOption]> {
        self.cell.get().map(Vec::as_slice)
    }
}

#[async_trait::async_trait]
impl<S: OptionSource> OptionSource for CachedOptions<S> {
    async fn load_options(&self) -> Result<Vec<ChoiceOption>, CollabError> {
        let options = self
            .cell
            .get_or_try_init(|| async {
                let options = self.source.load_options().await?;
                if options.is_empty() {
                    return Err(CollabError::Empty);
                }
                tracing::debug!(count = options.len(), "loaded choice options");
                Ok(options)
            })
            .await?;
        Ok(options.clone())
    }
}
