//! Command-line arguments

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// What-if scenarios over a portfolio snapshot
#[derive(Debug, Parser)]
#[command(
    name = "pmo-scenario",
    about = "Run what-if scenarios against a portfolio snapshot",
    version
)]
pub struct Cli {
    /// Verbosity: -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single scenario
    Run(RunArgs),
    /// Run every scenario in a file, one per line
    Batch(BatchArgs),
    /// Print the dependency graph derived from task text
    Graph(SnapshotArgs),
}

/// Snapshot input shared by every subcommand
#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// Portfolio snapshot JSON file
    #[arg(long)]
    pub snapshot: PathBuf,
}

/// Engine settings
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Thresholds TOML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Date runway figures are measured from (YYYY-MM-DD)
    #[arg(long)]
    pub reference_date: Option<NaiveDate>,
}

/// `run` arguments
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub snapshot: SnapshotArgs,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub engine: EngineArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Scenario text, e.g. "delay Alpha by 2 months"
    #[arg(required = true, num_args = 1..)]
    pub scenario: Vec<String>,
}

impl RunArgs {
    /// Scenario words joined back into one sentence
    #[must_use]
    pub fn scenario_text(&self) -> String {
        self.scenario.join(" ")
    }
}

/// `batch` arguments
#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub snapshot: SnapshotArgs,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub engine: EngineArgs,

    /// File with one scenario per line; `#` starts a comment
    #[arg(long)]
    pub scenarios: PathBuf,
}

/// Output format for `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full result as pretty JSON
    Json,
    /// Sectioned briefing
    Text,
}
