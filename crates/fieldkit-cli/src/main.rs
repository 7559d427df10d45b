//! fieldkit demo CLI
//!
//! Drives the demo forms through scripted scenarios and prints a snapshot
//! after every step.

mod scenario;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use fieldkit_core::{FormConfig, FormSnapshot};
use scenario::{FormKind, Step};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fieldkit")]
#[command(version, about = "Schema-validated dynamic forms, scripted")]
struct Cli {
    /// TOML form configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print snapshots and logs as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Name, fruit from fetched options, optional comment
    Flat,
    /// Name, fruit and a reorderable list of time entries
    Times,
    /// List of vegetable or fruit entries
    Produce,
    /// Apply a JSON array of intents to a demo form
    Script {
        /// Form to drive
        #[arg(long, value_enum)]
        form: FormKind,
        /// File holding the intents
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    let config = match &cli.config {
        Some(path) => FormConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FormConfig::default(),
    };
    tracing::debug!(?config, "configuration");

    let steps = match &cli.command {
        Command::Flat => scenario::run(FormKind::Flat, &config).await?,
        Command::Times => scenario::run(FormKind::Times, &config).await?,
        Command::Produce => scenario::run(FormKind::Produce, &config).await?,
        Command::Script { form, file } => scenario::run_script(*form, file, &config).await?,
    };

    if cli.json {
        for step in &steps {
            println!("{}", serde_json::to_string(step)?);
        }
    } else {
        for step in &steps {
            print_step(step)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fieldkit={level},fieldkit_core={level},fieldkit_list={level}"
        ))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_step(step: &Step) -> Result<()> {
    println!("== {} ==", step.label);
    if let Some(outcome) = &step.outcome {
        println!("outcome: {outcome}");
    }
    print_snapshot(&step.snapshot)?;
    println!();
    Ok(())
}

fn print_snapshot(snapshot: &FormSnapshot) -> Result<()> {
    println!("values: {}", serde_json::to_string(&snapshot.values)?);
    for (list, keys) in &snapshot.keys {
        let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
        println!("keys[{list}]: [{}]", keys.join(", "));
    }
    if snapshot.errors.is_empty() {
        println!("errors: none");
    } else {
        println!("errors:");
        for (path, message) in snapshot.errors.to_flat() {
            println!("  {path}: {message}");
        }
    }
    println!("submitting: {}", snapshot.is_submitting);
    if let Some(last) = &snapshot.last_submission {
        println!("last submission {}: {}", last.id, serde_json::to_string(&last.outcome)?);
    }
    Ok(())
}
