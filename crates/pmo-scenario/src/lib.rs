//! PMO Scenario Engine
//!
//! What-if simulation over a project portfolio: apply one hypothetical
//! change to one project and compute its cascading effect on every project
//! that depends on it.
//!
//! # Pipeline
//!
//! 1. **Parse**: [`ActionParser`] turns scenario text into a [`ScenarioAction`]
//! 2. **Simulate**: [`simulate`] produces the target's new state and [`Delta`]
//! 3. **Cascade**: the dependency graph is walked from the target
//! 4. **Assemble**: [`ScenarioResult`] holds before/after for every project
//!
//! # Example
//!
//! ```rust
//! use pmo_model::{PortfolioSnapshot, Project, ProjectKey, Task};
//! use pmo_scenario::{run_scenario, ImpactKind};
//!
//! let snapshot = PortfolioSnapshot::new(vec![
//!     Project::new("Alpha"),
//!     Project::new("Beta").with_task(Task::new("Integrate").with_comments("blocked by Alpha")),
//! ])
//! .unwrap();
//!
//! let result = run_scenario(&snapshot, "remove Alpha").unwrap();
//! let beta = result.dependent(&ProjectKey::new("Beta")).unwrap();
//! assert_eq!(beta.impact, ImpactKind::BrokenDependency);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod briefing;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod result;
pub mod simulate;

// Re-exports
pub use action::{
    Action, BudgetAdjustment, BudgetDirection, Currency, DelayDuration, DurationUnit,
    ScenarioAction,
};
pub use briefing::Briefing;
pub use config::{
    ScenarioConfig, Thresholds, DEFAULT_BURN_RATE_ALERT, DEFAULT_MAX_CASCADE_DEPTH,
    DEFAULT_WEEKS_PER_MONTH, DEFAULT_WEEKS_PER_QUARTER,
};
pub use engine::{PreparedPortfolio, ScenarioEngine};
pub use error::{ConfigError, InsufficientDataWarning, MissingField, ScenarioError, SUPPORTED_PATTERNS};
pub use parser::ActionParser;
pub use pmo_graph::ImpactKind;
pub use result::{DependentImpact, ProjectChange, ScenarioResult, VoidedEdge};
pub use simulate::{
    runway_weeks, simulate, BudgetDelta, DelayDelta, Delta, RemovalDelta, ScopeDelta,
    SimulationContext, SimulationOutcome,
};

use pmo_model::PortfolioSnapshot;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run one scenario with the default configuration
///
/// The reference date for runway figures is today's local date.
///
/// # Errors
/// Returns error if the text cannot be parsed or names an unknown project
pub fn run_scenario(snapshot: &PortfolioSnapshot, text: &str) -> Result<ScenarioResult, ScenarioError> {
    ScenarioEngine::default().run_scenario(snapshot, text)
}
