//! Scripted scenarios for the demo forms
//!
//! Each scenario drives a form through edits and submit attempts and records
//! a snapshot after every step.

use anyhow::{Context, Result};
use clap::ValueEnum;
use fieldkit_core::{
    Applied, EchoSubmit, FieldPath, Form, FormConfig, FormSnapshot, Intent, OptionSource,
    SubmitOutcome,
};
use fieldkit_demo::{
    flat_defaults, flat_schema, fruit_source, produce_defaults, produce_schema, times_defaults,
    times_schema, variant_defaults, TimeEntry,
};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// Demo form
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FormKind {
    /// Name, fruit from fetched options, optional comment
    Flat,
    /// Name, fruit and a list of time entries
    Times,
    /// List of vegetable or fruit entries
    Produce,
}

/// One recorded step
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Step {
    pub(crate) label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) outcome: Option<String>,
    pub(crate) snapshot: FormSnapshot,
}

struct Recorder<'a> {
    form: &'a Form<EchoSubmit>,
    steps: Vec<Step>,
}

impl<'a> Recorder<'a> {
    fn new(form: &'a Form<EchoSubmit>) -> Self {
        Self {
            form,
            steps: Vec::new(),
        }
    }

    fn step(&mut self, label: &str) {
        self.push(label, None);
    }

    async fn submit(&mut self, label: &str) -> Result<()> {
        let outcome = self.form.submit().await?;
        self.push(label, Some(describe(&outcome)));
        Ok(())
    }

    fn push(&mut self, label: &str, outcome: Option<String>) {
        tracing::debug!(step = label, "recorded step");
        self.steps.push(Step {
            label: label.to_string(),
            outcome,
            snapshot: self.form.snapshot(),
        });
    }
}

fn describe(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Completed(_) => "completed".to_string(),
        SubmitOutcome::Invalid(errors) => format!("invalid ({} errors)", errors.len()),
        SubmitOutcome::Failed(message) => format!("failed: {message}"),
        SubmitOutcome::Rejected => "rejected: already submitting".to_string(),
    }
}

fn path(text: &str) -> Result<FieldPath> {
    text.parse().with_context(|| format!("bad field path '{text}'"))
}

/// Build a demo form with default values
pub(crate) async fn build_form(kind: FormKind, config: &FormConfig) -> Result<Form<EchoSubmit>> {
    let handler = EchoSubmit::new(config.submit_delay());
    let form = match kind {
        FormKind::Flat => {
            let options = fruit_source(config.options_delay())
                .load_options()
                .await
                .context("loading fruit options")?;
            tracing::info!(count = options.len(), "fruit options loaded");
            Form::new(flat_schema(&options)?, flat_defaults(), handler, config.clone())?
        }
        FormKind::Times => Form::new(times_schema()?, times_defaults(), handler, config.clone())?,
        FormKind::Produce => {
            Form::new(produce_schema()?, produce_defaults()?, handler, config.clone())?
        }
    };
    Ok(form)
}

/// Run the built-in scenario for a form
pub(crate) async fn run(kind: FormKind, config: &FormConfig) -> Result<Vec<Step>> {
    let form = build_form(kind, config).await?;
    tracing::info!(form = %form.id(), ?kind, "running scenario");
    let mut rec = Recorder::new(&form);
    rec.step("initial");
    match kind {
        FormKind::Flat => flat(&mut rec).await?,
        FormKind::Times => times(&mut rec).await?,
        FormKind::Produce => produce(&mut rec).await?,
    }
    Ok(rec.steps)
}

async fn flat(rec: &mut Recorder<'_>) -> Result<()> {
    rec.submit("submit with empty name").await?;

    rec.form.set_value("name", "John Doe")?;
    rec.form.set_value("fruit", "kiwi")?;
    rec.step("name set, unknown fruit");

    rec.form.set_value("fruit", "banana")?;
    rec.form.set_value("comment", "Ripe ones, please")?;
    rec.submit("submit valid form").await
}

async fn times(rec: &mut Recorder<'_>) -> Result<()> {
    rec.form.list_remove("times", 1)?;
    rec.form.list_remove("times", 0)?;
    rec.step("removed every entry");

    rec.form
        .list_append("times", TimeEntry::new("07:00", "08:00", "Porridge").to_record())?;
    rec.form
        .list_append("times", TimeEntry::new("12:00", "13:00", "").to_record())?;
    rec.step("appended two entries");

    rec.form.list_move("times", 1, 0)?;
    rec.step("moved second entry to front");

    rec.submit("submit with missing dinner").await?;

    rec.form
        .list_set_field("times", 0, &path("dinner")?, json!("Soup"))?;
    rec.submit("submit valid form").await
}

async fn produce(rec: &mut Recorder<'_>) -> Result<()> {
    rec.form
        .list_set_field("produce", 1, &path("fruitName")?, json!(""))?;
    rec.step("cleared fruit name");

    rec.form
        .list_switch_variant("produce", 0, "fruit", &variant_defaults("fruit"))?;
    rec.step("switched first entry to fruit");

    rec.form.set_path(&path("produce.0.fruitName")?, json!("Pear"))?;
    rec.form.set_path(&path("produce.1.fruitName")?, json!("Plum"))?;
    rec.form.set_path(&path("produce.1.amount")?, json!("3"))?;
    rec.submit("submit valid form").await
}

/// Apply intents from a JSON file, recording a step after each
pub(crate) async fn run_script(
    kind: FormKind,
    file: &Path,
    config: &FormConfig,
) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading script {}", file.display()))?;
    let intents: Vec<Intent> = serde_json::from_str(&text)
        .with_context(|| format!("parsing script {}", file.display()))?;

    let form = build_form(kind, config).await?;
    tracing::info!(form = %form.id(), intents = intents.len(), "running script");
    let mut rec = Recorder::new(&form);
    rec.step("initial");
    for (n, intent) in intents.into_iter().enumerate() {
        let label = format!("intent {}", n + 1);
        let applied = form
            .apply(intent)
            .await
            .with_context(|| format!("applying {label}"))?;
        let outcome = match applied {
            Applied::Updated(true) => None,
            Applied::Updated(false) => Some("no change".to_string()),
            Applied::Added(key) => Some(format!("added {key}")),
            Applied::Submitted(outcome) => Some(describe(&outcome)),
        };
        rec.push(&label, outcome);
    }
    Ok(rec.steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fast() -> FormConfig {
        FormConfig::default()
            .with_submit_delay_ms(0)
            .with_options_delay_ms(0)
    }

    fn last_outcome(steps: &[Step]) -> Option<&str> {
        steps.last().and_then(|s| s.outcome.as_deref())
    }

    #[tokio::test(start_paused = true)]
    async fn flat_scenario_ends_submitted() {
        let steps = run(FormKind::Flat, &FormConfig::default()).await.unwrap();
        assert_eq!(steps[1].outcome.as_deref(), Some("invalid (1 errors)"));
        assert_eq!(
            steps[2].snapshot.errors.field(&"fruit".parse().unwrap()),
            Some("Please select a fruit")
        );
        assert_eq!(last_outcome(&steps), Some("completed"));
    }

    #[tokio::test]
    async fn times_scenario_reports_list_error_then_submits() {
        let steps = run(FormKind::Times, &fast()).await.unwrap();
        let removed = &steps[1].snapshot;
        assert_eq!(
            removed.errors.list(&"times".parse().unwrap()),
            Some("At least one time entry is required")
        );
        assert_eq!(steps[4].outcome.as_deref(), Some("invalid (1 errors)"));
        assert_eq!(last_outcome(&steps), Some("completed"));
    }

    #[tokio::test]
    async fn produce_scenario_submits_coerced_amount() {
        let steps = run(FormKind::Produce, &fast()).await.unwrap();
        let switched = &steps[2].snapshot.values;
        assert_eq!(switched.get("produce").unwrap()[0]["type"], json!("fruit"));
        let last = steps.last().unwrap();
        assert_eq!(last.outcome.as_deref(), Some("completed"));
        let sent = match &last.snapshot.last_submission {
            Some(submission) => serde_json::to_value(&submission.outcome).unwrap(),
            None => panic!("missing last submission"),
        };
        assert_eq!(sent["detail"]["produce"][1]["amount"], json!(3.0));
    }

    #[tokio::test]
    async fn script_applies_intents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{ "intent": "remove", "list": "times", "index": 5 }},
                {{ "intent": "append", "list": "times", "record": {{ "start": "1", "end": "2", "dinner": "3" }} }},
                {{ "intent": "submit" }}
            ]"#
        )
        .unwrap();

        let steps = run_script(FormKind::Times, file.path(), &fast()).await.unwrap();

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[1].outcome.as_deref(), Some("no change"));
        assert_eq!(steps[2].outcome.as_deref(), Some("added k3"));
        assert_eq!(last_outcome(&steps), Some("completed"));
    }

    #[tokio::test]
    async fn bad_script_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "intent": "explode" }}]"#).unwrap();
        let err = run_script(FormKind::Times, file.path(), &fast()).await.unwrap_err();
        assert!(err.to_string().contains("parsing script"));
    }
}
