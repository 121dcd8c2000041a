//! PMO Model
//!
//! Portfolio records consumed by the scenario engine.
//!
//! # Overview
//!
//! - **Project**: an ingested project record owning its tasks
//! - **Task**: read-only free-text work item, scanned for dependency cues
//! - **ProjectKey**: case- and whitespace-insensitive project identity
//! - **ProjectState**: the simulation-relevant projection of a project
//! - **PortfolioSnapshot**: immutable, shareable collection of projects
//!
//! # Example
//!
//! ```rust
//! use pmo_model::{PortfolioSnapshot, Project, ProjectKey};
//!
//! let snapshot = PortfolioSnapshot::new(vec![
//!     Project::new("Alpha").with_budget(500_000.0),
//!     Project::new("Beta"),
//! ])
//! .unwrap();
//!
//! assert!(snapshot.get(&ProjectKey::new("  ALPHA ")).is_some());
//! ```

#![warn(missing_docs)]

pub mod key;
pub mod project;
pub mod snapshot;

// Re-exports
pub use key::ProjectKey;
pub use project::{Lifecycle, Project, ProjectState, RagStatus, Task, DEFAULT_SCOPE_PCT};
pub use snapshot::{PortfolioSnapshot, SnapshotError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
