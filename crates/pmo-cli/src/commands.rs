//! Subcommand implementations
//!
//! Each command returns its stdout text so the binary stays a thin shell.
//! `anyhow` context is attached here, at the process boundary; the library
//! crates keep their typed errors.

use crate::args::{BatchArgs, Command, EngineArgs, OutputFormat, RunArgs, SnapshotArgs};
use anyhow::{Context, Result};
use pmo_graph::GraphBuilder;
use pmo_model::PortfolioSnapshot;
use pmo_scenario::{Briefing, ScenarioConfig, ScenarioEngine, ScenarioError, ScenarioResult};
use serde::Serialize;
use std::path::Path;

/// Outcome of one line of a batch file
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    /// Scenario ran
    Ok {
        /// Scenario text
        scenario: String,
        /// Full result
        result: Box<ScenarioResult>,
    },
    /// Scenario was rejected
    Error {
        /// Scenario text
        scenario: String,
        /// Error message
        message: String,
        /// True if the text itself was at fault
        user_error: bool,
    },
}

impl BatchEntry {
    fn new(scenario: String, outcome: Result<ScenarioResult, ScenarioError>) -> Self {
        match outcome {
            Ok(result) => Self::Ok {
                scenario,
                result: Box::new(result),
            },
            Err(err) => Self::Error {
                scenario,
                message: err.to_string(),
                user_error: err.is_user_error(),
            },
        }
    }
}

/// Dispatch a parsed subcommand
///
/// # Errors
/// Returns error if an input file cannot be read or parsed, or if a `run`
/// scenario is rejected
pub fn execute(command: &Command) -> Result<String> {
    match command {
        Command::Run(args) => run(args),
        Command::Batch(args) => batch(args),
        Command::Graph(args) => graph(args),
    }
}

/// `run`: one scenario, JSON or briefing text
///
/// # Errors
/// Returns error if inputs cannot be loaded or the scenario is rejected
pub fn run(args: &RunArgs) -> Result<String> {
    let snapshot = load_snapshot(&args.snapshot.snapshot)?;
    let engine = ScenarioEngine::new(load_config(&args.engine)?);
    let text = args.scenario_text();

    let result = engine
        .run_scenario(&snapshot, &text)
        .with_context(|| format!("scenario rejected: {text}"))?;

    match args.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&result).context("failed to serialize result")
        }
        OutputFormat::Text => Ok(Briefing::from_result(&result).full_text()),
    }
}

/// `batch`: every scenario in a file, as a JSON array
///
/// Rejected scenarios appear in the array as error entries; only unreadable
/// inputs fail the command.
///
/// # Errors
/// Returns error if the snapshot, config or scenario file cannot be loaded
pub fn batch(args: &BatchArgs) -> Result<String> {
    let snapshot = load_snapshot(&args.snapshot.snapshot)?;
    let engine = ScenarioEngine::new(load_config(&args.engine)?);

    let raw = std::fs::read_to_string(&args.scenarios)
        .with_context(|| format!("failed to read scenarios from {}", args.scenarios.display()))?;
    let scenarios = scenario_lines(&raw);

    let prepared = engine.prepare(snapshot);
    let entries: Vec<BatchEntry> = scenarios
        .iter()
        .cloned()
        .zip(engine.run_batch(&prepared, &scenarios))
        .map(|(scenario, outcome)| BatchEntry::new(scenario, outcome))
        .collect();

    let failed = entries
        .iter()
        .filter(|e| matches!(e, BatchEntry::Error { .. }))
        .count();
    tracing::info!("Batch finished: {} ok, {} rejected", entries.len() - failed, failed);

    serde_json::to_string_pretty(&entries).context("failed to serialize batch results")
}

/// `graph`: dependency summary with cycles
///
/// # Errors
/// Returns error if the snapshot cannot be loaded
pub fn graph(args: &SnapshotArgs) -> Result<String> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let summary = GraphBuilder::new().build(snapshot.projects()).summary();
    serde_json::to_string_pretty(&summary).context("failed to serialize graph")
}

/// Read a snapshot JSON file
///
/// # Errors
/// Returns error if the file is unreadable, malformed, or names a project
/// twice
pub fn load_snapshot(path: &Path) -> Result<PortfolioSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot: PortfolioSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("invalid snapshot {}", path.display()))?;
    tracing::debug!("Loaded {} projects from {}", snapshot.len(), path.display());
    Ok(snapshot)
}

/// Engine configuration from an optional TOML file plus flag overrides
///
/// # Errors
/// Returns error if the config file cannot be loaded or fails validation
pub fn load_config(args: &EngineArgs) -> Result<ScenarioConfig> {
    let mut config = match &args.config {
        Some(path) => ScenarioConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScenarioConfig::new(),
    };
    if let Some(date) = args.reference_date {
        config = config.with_reference_date(date);
    }
    Ok(config)
}

/// Non-empty, non-comment lines of a scenario file
#[must_use]
pub fn scenario_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.split_once('#').map_or(line, |(text, _)| text).trim())
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
