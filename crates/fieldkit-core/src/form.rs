//! Form aggregate
//!
//! Composes scalar fields and named lists into one submit-able unit.
//!
//! - Every edit completes under a single lock acquisition
//! - Submission is single-flight, driven by [`FormPhase`]
//! - The lock is released while the submit collaborator runs
//!
//! [`Form`] is a cheap, cloneable handle; a renderer and a submission may
//! hold clones of the same form on one runtime.

use crate::collab::SubmitHandler;
use crate::error::FormError;
use crate::phase::{validate_transition, FormPhase};
use crate::schema::FormSchema;
use crate::types::{
    Applied, FormConfig, FormId, FormSnapshot, Intent, LastSubmission, SubmissionId,
    SubmissionOutcome, SubmitOutcome, ValidationMode,
};
use fieldkit_list::{ItemKey, ListController};
use fieldkit_path::{FieldPath, Segment};
use fieldkit_schema::{ErrorTree, Record, Value};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;

/// Handle to a form
pub struct Form<H> {
    inner: Arc<Inner<H>>,
}

struct Inner<H> {
    id: FormId,
    schema: FormSchema,
    defaults: Record,
    config: FormConfig,
    handler: H,
    state: Mutex<FormState>,
}

#[derive(Debug)]
struct FormState {
    phase: FormPhase,
    scalars: Record,
    scalar_errors: BTreeMap<FieldPath, String>,
    lists: IndexMap<String, ListController>,
    live: bool,
    last_submission: Option<LastSubmission>,
}

impl<H> Clone for Form<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> std::fmt::Debug for Form<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("id", &self.inner.id)
            .field("phase", &self.inner.state.lock().phase)
            .finish_non_exhaustive()
    }
}

impl<H: SubmitHandler + 'static> Form<H> {
    /// Create a form from a schema and initial values
    ///
    /// `defaults` holds scalar values and, for each list, an array of
    /// records. In [`ValidationMode::OnChange`] every field and list is
    /// validated immediately.
    ///
    /// # Errors
    /// Returns error if `defaults` names an undeclared field or a list
    /// default is not an array of objects
    pub fn new(
        schema: FormSchema,
        defaults: Record,
        handler: H,
        config: FormConfig,
    ) -> Result<Self, FormError> {
        let state = FormState::build(&schema, &defaults, &config)?;
        let id = FormId::new();
        tracing::debug!(form = %id, lists = state.lists.len(), live = state.live, "created form");
        Ok(Self {
            inner: Arc::new(Inner {
                id,
                schema,
                defaults,
                config,
                handler,
                state: Mutex::new(state),
            }),
        })
    }

    /// Form identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> FormId {
        self.inner.id
    }

    /// Form schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &FormSchema {
        &self.inner.schema
    }

    /// Form configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    /// Submit collaborator
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.inner.handler
    }

    // ------------------------------------------------------------------
    // Scalar edits
    // ------------------------------------------------------------------

    /// Set a scalar field
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] for undeclared fields (lists
    /// included) and [`FormError::Busy`] while inputs are locked
    pub fn set_value(&self, field: &str, value: impl Into<Value>) -> Result<(), FormError> {
        let value = value.into();
        self.edit(|state, schema| {
            if !schema.fields().contains(field) {
                return Err(FormError::UnknownField(field.to_string()));
            }
            state.scalars.insert(field, value);
            state.revalidate_scalar(schema, field);
            tracing::debug!(field, "set field");
            Ok(())
        })
    }

    /// Set any value by path
    ///
    /// Scalar paths (`name`, `address.city`) edit fields; list paths
    /// (`times.0.start`) edit the entry at that position, and a bare entry
    /// path (`times.0`) replaces the whole entry. Returns whether anything
    /// was written.
    ///
    /// # Errors
    /// Returns error for unknown names, paths that do not address a value,
    /// or while inputs are locked
    pub fn set_path(&self, path: &FieldPath, value: Value) -> Result<bool, FormError> {
        let Some((head, rest)) = path.split_first() else {
            return Err(FormError::InvalidIntent("empty path".to_string()));
        };
        let Segment::Key(name) = head else {
            return Err(FormError::InvalidIntent(format!("path must start with a name: {path}")));
        };
        if self.inner.schema.list(name).is_some() {
            let Some((Segment::Index(index), inside)) = rest.split_first() else {
                return Err(FormError::InvalidIntent(format!(
                    "list path needs a position: {path}"
                )));
            };
            if inside.is_empty() {
                let record = Record::from_value(value).ok_or_else(|| {
                    FormError::InvalidIntent(format!("entry at {path} must be an object"))
                })?;
                return self.list_replace(name, *index, record);
            }
            return self.list_set_field(name, *index, &inside, value);
        }
        if rest.is_empty() {
            return self.set_value(name, value).map(|()| true);
        }
        self.edit(|state, schema| {
            if !schema.fields().contains(name) {
                return Err(FormError::UnknownField(name.clone()));
            }
            let written = state.scalars.set_path(path, value);
            if written {
                state.revalidate_scalar(schema, name);
            }
            Ok(written)
        })
    }

    // ------------------------------------------------------------------
    // List edits
    // ------------------------------------------------------------------

    /// Append an entry to a list
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`] or [`FormError::Busy`]
    pub fn list_append(&self, list: &str, record: Record) -> Result<ItemKey, FormError> {
        self.edit(|state, _| Ok(state.list_mut(list)?.append(record)))
    }

    /// Insert an entry at `index`, clamped to the list length
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`] or [`FormError::Busy`]
    pub fn list_insert(&self, list: &str, index: usize, record: Record) -> Result<ItemKey, FormError> {
        self.edit(|state, _| Ok(state.list_mut(list)?.insert(index, record)))
    }

    /// Remove the entry at `index`
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`] or [`FormError::Busy`]
    pub fn list_remove(&self, list: &str, index: usize) -> Result<Option<Record>, FormError> {
        self.edit(|state, _| Ok(state.list_mut(list)?.remove(index)))
    }

    /// Move an entry; returns whether the order changed
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`] or [`FormError::Busy`]
    pub fn list_move(&self, list: &str, from: usize, to: usize) -> Result<bool, FormError> {
        self.edit(|state, _| Ok(state.list_mut(list)?.move_item(from, to)))
    }

    /// Swap two entries; returns whether the order changed
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`] or [`FormError::Busy`]
    pub fn list_swap(&self, list: &str, a: usize, b: usize) -> Result<bool, FormError> {
        self.edit(|state, _| Ok(state.list_mut(list)?.swap(a, b)))
    }

    /// Replace the entry at `index`, keeping its key
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`] or [`FormError::Busy`]
    pub fn list_replace(&self, list: &str, index: usize, record: Record) -> Result<bool, FormError> {
        self.edit(|state, _| Ok(state.list_mut(list)?.replace(index, record)))
    }

    /// Set one field of the entry at `index`
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`] or [`FormError::Busy`]
    pub fn list_set_field(
        &self,
        list: &str,
        index: usize,
        path: &FieldPath,
        value: Value,
    ) -> Result<bool, FormError> {
        self.edit(|state, _| Ok(state.list_mut(list)?.set_field(index, path, value)))
    }

    /// Switch the entry at `index` to another variant
    ///
    /// # Errors
    /// Returns [`FormError::Schema`] if the list is not a union or the
    /// variant is unknown, plus the usual list errors
    pub fn list_switch_variant(
        &self,
        list: &str,
        index: usize,
        variant: &str,
        defaults: &Record,
    ) -> Result<bool, FormError> {
        self.edit(|state, _| {
            Ok(state
                .list_mut(list)?
                .replace_item_variant(index, variant, defaults)?)
        })
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Current values; lists appear as arrays in entry order
    #[must_use]
    pub fn values(&self) -> Record {
        self.inner.state.lock().values()
    }

    /// Consolidated error tree
    #[must_use]
    pub fn errors(&self) -> ErrorTree {
        self.inner.state.lock().error_tree()
    }

    /// Keys of a list in order
    ///
    /// # Errors
    /// Returns [`FormError::UnknownList`]
    pub fn list_keys(&self, list: &str) -> Result<Vec<ItemKey>, FormError> {
        let state = self.inner.state.lock();
        state
            .lists
            .get(list)
            .map(|l| l.keys().to_vec())
            .ok_or_else(|| FormError::UnknownList(list.to_string()))
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> FormPhase {
        self.inner.state.lock().phase
    }

    /// Whether a submission is in flight
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.phase().is_submitting()
    }

    /// Last submission that reached the collaborator
    #[must_use]
    pub fn last_submission(&self) -> Option<LastSubmission> {
        self.inner.state.lock().last_submission.clone()
    }

    /// Everything a renderer needs, taken under one lock
    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.inner.state.lock();
        FormSnapshot {
            id: self.inner.id,
            values: state.values(),
            errors: state.error_tree(),
            phase: state.phase,
            is_submitting: state.phase.is_submitting(),
            last_submission: state.last_submission.clone(),
            keys: state
                .lists
                .iter()
                .map(|(name, list)| (name.clone(), list.keys().to_vec()))
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Restore defaults and clear errors and the last submission
    ///
    /// # Errors
    /// Returns [`FormError::Busy`] while submitting
    pub fn reset(&self) -> Result<(), FormError> {
        let mut state = self.inner.state.lock();
        if state.phase.is_submitting() {
            return Err(FormError::Busy);
        }
        state.reset(&self.inner.schema, &self.inner.defaults, &self.inner.config)?;
        tracing::debug!(form = %self.inner.id, "reset form");
        Ok(())
    }

    /// Dispatch a renderer intent
    ///
    /// # Errors
    /// Returns the error of the underlying operation
    pub async fn apply(&self, intent: Intent) -> Result<Applied, FormError> {
        match intent {
            Intent::Change { path, value } => self.set_path(&path, value).map(Applied::Updated),
            Intent::Append { list, record } => self.list_append(&list, record).map(Applied::Added),
            Intent::Insert {
                list,
                index,
                record,
            } => self.list_insert(&list, index, record).map(Applied::Added),
            Intent::Remove { list, index } => self
                .list_remove(&list, index)
                .map(|removed| Applied::Updated(removed.is_some())),
            Intent::Move { list, from, to } => self.list_move(&list, from, to).map(Applied::Updated),
            Intent::Swap { list, a, b } => self.list_swap(&list, a, b).map(Applied::Updated),
            Intent::SwitchVariant {
                list,
                index,
                variant,
                defaults,
            } => self
                .list_switch_variant(&list, index, &variant, &defaults)
                .map(Applied::Updated),
            Intent::Submit => self.submit().await.map(Applied::Submitted),
        }
    }

    /// Validate and, if valid, hand the values to the submit collaborator
    ///
    /// # Workflow
    /// 1. Reject if a submission is already in flight
    /// 2. Validate everything, activating deferred validation
    /// 3. Stop with [`SubmitOutcome::Invalid`] if any error is present
    /// 4. Run the collaborator with normalized values, lock released
    /// 5. Record the outcome as the last submission
    ///
    /// Steps 4 and 5 run on a spawned task: dropping the returned future
    /// stops waiting but not the submission, which still completes and is
    /// recorded. Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns [`FormError::IllegalTransition`] only if the phase table is
    /// violated, which indicates a bug, and [`FormError::SubmissionAborted`]
    /// if the collaborator panicked
    pub async fn submit(&self) -> Result<SubmitOutcome, FormError> {
        let submission = SubmissionId::new();
        let span = tracing::info_span!("submit", form = %self.inner.id, submission = %submission);
        self.run_submission(submission).instrument(span).await
    }

    async fn run_submission(&self, submission: SubmissionId) -> Result<SubmitOutcome, FormError> {
        let values = {
            let mut state = self.inner.state.lock();
            if state.phase.is_submitting() {
                tracing::warn!("submission rejected: already submitting");
                return Ok(SubmitOutcome::Rejected);
            }
            state.transition(FormPhase::Validating)?;
            state.activate(&self.inner.schema);
            let errors = state.error_tree();
            if !errors.is_empty() {
                state.transition(FormPhase::Idle)?;
                tracing::info!(errors = errors.len(), "submission aborted: validation failed");
                return Ok(SubmitOutcome::Invalid(errors));
            }
            state.transition(FormPhase::Submitting)?;
            state.normalized_values(&self.inner.schema)
        };

        tracing::info!("submission started");
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(
            async move { inner.complete_submission(submission, values).await }
                .in_current_span(),
        );
        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "submission task failed");
                Err(FormError::SubmissionAborted(err.to_string()))
            }
        }
    }

    fn edit<R>(
        &self,
        f: impl FnOnce(&mut FormState, &FormSchema) -> Result<R, FormError>,
    ) -> Result<R, FormError> {
        let mut state = self.inner.state.lock();
        if self.inner.config.lock_inputs_while_submitting && state.phase.is_submitting() {
            tracing::debug!("edit rejected: inputs locked while submitting");
            return Err(FormError::Busy);
        }
        f(&mut state, &self.inner.schema)
    }
}

impl<H: SubmitHandler> Inner<H> {
    /// Run the collaborator and record its outcome
    ///
    /// Runs on its own task, so it completes even if the caller stops
    /// waiting.
    async fn complete_submission(
        &self,
        submission: SubmissionId,
        values: Record,
    ) -> Result<SubmitOutcome, FormError> {
        let mut guard = SubmittingGuard::new(&self.state);
        let result = self.handler.submit(values).await;
        guard.disarm();

        let mut state = self.state.lock();
        state.transition(FormPhase::Idle)?;
        let (outcome, recorded) = match result {
            Ok(value) => {
                tracing::info!("submission completed");
                (
                    SubmitOutcome::Completed(value.clone()),
                    SubmissionOutcome::Succeeded(value),
                )
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "submission failed");
                let message = failure.message().to_string();
                (
                    SubmitOutcome::Failed(message.clone()),
                    SubmissionOutcome::Failed(message),
                )
            }
        };
        state.last_submission = Some(LastSubmission {
            id: submission,
            outcome: recorded,
        });
        Ok(outcome)
    }
}

/// Returns the form to `Idle` if the collaborator panics mid-flight
struct SubmittingGuard<'a> {
    state: &'a Mutex<FormState>,
    armed: bool,
}

impl<'a> SubmittingGuard<'a> {
    fn new(state: &'a Mutex<FormState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            if state.phase.is_submitting() {
                state.phase = FormPhase::Idle;
                tracing::warn!("submission ended before completion");
            }
        }
    }
}

impl FormState {
    fn build(schema: &FormSchema, defaults: &Record, config: &FormConfig) -> Result<Self, FormError> {
        let live = config.validation_mode == ValidationMode::OnChange;
        let scalars = scalar_defaults(schema, defaults)?;

        let mut lists = IndexMap::new();
        for (name, list_schema) in schema.lists() {
            let records = list_defaults(name, defaults.get(name))?;
            lists.insert(
                name.to_string(),
                ListController::with_records(list_schema.clone(), records, live),
            );
        }

        let mut state = Self {
            phase: FormPhase::Idle,
            scalars,
            scalar_errors: BTreeMap::new(),
            lists,
            live,
            last_submission: None,
        };
        if live {
            state.validate_scalars(schema);
        }
        Ok(state)
    }

    /// Restore defaults in place; list key counters carry on
    fn reset(
        &mut self,
        schema: &FormSchema,
        defaults: &Record,
        config: &FormConfig,
    ) -> Result<(), FormError> {
        let live = config.validation_mode == ValidationMode::OnChange;
        let scalars = scalar_defaults(schema, defaults)?;
        let records = self
            .lists
            .keys()
            .map(|name| list_defaults(name, defaults.get(name)))
            .collect::<Result<Vec<_>, _>>()?;

        for (list, records) in self.lists.values_mut().zip(records) {
            list.reset_to(records, live);
        }
        self.scalars = scalars;
        self.scalar_errors.clear();
        self.live = live;
        self.last_submission = None;
        if live {
            self.validate_scalars(schema);
        }
        Ok(())
    }

    fn transition(&mut self, to: FormPhase) -> Result<(), FormError> {
        validate_transition(self.phase, to)?;
        self.phase = to;
        Ok(())
    }

    fn list_mut(&mut self, name: &str) -> Result<&mut ListController, FormError> {
        self.lists
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownList(name.to_string()))
    }

    fn activate(&mut self, schema: &FormSchema) {
        self.live = true;
        self.validate_scalars(schema);
        for list in self.lists.values_mut() {
            if list.is_live() {
                list.validate_all();
            } else {
                list.activate();
            }
        }
    }

    fn validate_scalars(&mut self, schema: &FormSchema) {
        self.scalar_errors = schema.fields().validate(&self.scalars).into_errors();
    }

    fn revalidate_scalar(&mut self, schema: &FormSchema, field: &str) {
        if !self.live {
            return;
        }
        let prefix = FieldPath::key(field);
        self.scalar_errors.retain(|path, _| !prefix.is_prefix_of(path));
        if let Some(result) = schema.fields().validate_field(field, &self.scalars) {
            self.scalar_errors.extend(result.into_errors());
        }
    }

    fn values(&self) -> Record {
        let mut values = self.scalars.clone();
        for (name, list) in &self.lists {
            values.insert(name.clone(), list.to_value());
        }
        values
    }

    fn normalized_values(&self, schema: &FormSchema) -> Record {
        let mut values = schema.fields().normalize(&self.scalars);
        for (name, list) in &self.lists {
            let items = list
                .normalized_records()
                .into_iter()
                .map(Record::into_value)
                .collect();
            values.insert(name.clone(), Value::Array(items));
        }
        values
    }

    fn error_tree(&self) -> ErrorTree {
        let mut tree = ErrorTree::new();
        for (path, message) in &self.scalar_errors {
            tree.insert_field(path.clone(), message.clone());
        }
        for (name, list) in &self.lists {
            tree.merge(list.errors_at(&FieldPath::key(name.clone())));
        }
        tree
    }
}

fn scalar_defaults(schema: &FormSchema, defaults: &Record) -> Result<Record, FormError> {
    let mut scalars = Record::new();
    for (name, value) in defaults.iter() {
        if schema.list(name).is_some() {
            continue;
        }
        if !schema.fields().contains(name) {
            return Err(FormError::UnknownField(name.clone()));
        }
        scalars.insert(name.clone(), value.clone());
    }
    Ok(scalars)
}

fn list_defaults(list: &str, value: Option<&Value>) -> Result<Vec<Record>, FormError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(FormError::InvalidDefaults {
                list: list.to_string(),
                reason: "expected an array of entries".to_string(),
            })
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Record::from_value(item.clone()).ok_or_else(|| FormError::InvalidDefaults {
                list: list.to_string(),
                reason: format!("entry {index} is not an object"),
            })
        })
        .collect()
}
