//! PMO Scenario CLI
//!
//! Library half of the `pmo-scenario` binary: argument definitions, log
//! setup and the subcommands, kept here so they can be tested without
//! spawning a process.
//!
//! # Commands
//!
//! - `run`: one scenario, printed as JSON or a text briefing
//! - `batch`: a file of scenarios, printed as a JSON array
//! - `graph`: the derived dependency graph with any cycles

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod args;
pub mod commands;
pub mod logging;

// Re-exports
pub use args::{BatchArgs, Cli, Command, EngineArgs, OutputFormat, RunArgs, SnapshotArgs};
pub use commands::{execute, BatchEntry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
