//! PMO Dependency Graph
//!
//! Project-to-project dependencies derived from task text, and the cascade
//! walk that follows them.
//!
//! # Core Concepts
//!
//! - [`GraphBuilder`]: scans task text for cue phrases and builds the graph
//! - [`DependencyGraph`]: edges indexed forward and backward, with evidence
//! - [`CascadeResolver`]: breadth-first, cycle-safe impact propagation
//!
//! Edges are derived artefacts. They are rebuilt from the snapshot they came
//! from and never stored on their own.
//!
//! # Example
//!
//! ```rust
//! use pmo_graph::{CascadeResolver, CascadeTrigger, GraphBuilder, ImpactKind};
//! use pmo_model::{Project, ProjectKey, Task};
//!
//! let projects = vec![
//!     Project::new("Alpha"),
//!     Project::new("Beta").with_task(Task::new("Integrate").with_comments("blocked by Alpha")),
//! ];
//! let graph = GraphBuilder::new().build(&projects);
//!
//! let cascade = CascadeResolver::new().resolve(
//!     &graph,
//!     &ProjectKey::new("Alpha"),
//!     CascadeTrigger::Delay { days: 14 },
//! );
//! assert_eq!(cascade[0].impact, ImpactKind::CascadingDelay { days: 14 });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod cascade;
pub mod graph;

// Re-exports
pub use builder::{GraphBuilder, CUE_PHRASES};
pub use cascade::{CascadeEntry, CascadeResolver, CascadeTrigger, ImpactKind};
pub use graph::{
    DependencyEdge, DependencyGraph, EdgeEvidence, EdgeInsert, EdgeSummary, GraphError,
    GraphSummary, TextField,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
