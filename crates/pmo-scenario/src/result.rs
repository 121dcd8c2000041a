//! Scenario results
//!
//! A [`ScenarioResult`] is built once per scenario and never changes
//! afterwards; fields are private and exposed through getters.

use crate::action::ScenarioAction;
use crate::error::InsufficientDataWarning;
use crate::simulate::Delta;
use pmo_graph::ImpactKind;
use pmo_model::{PortfolioSnapshot, ProjectKey, ProjectState};
use serde::Serialize;

/// Before/after view of the target project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectChange {
    /// Baseline state
    pub before: ProjectState,
    /// Simulated state
    pub after: ProjectState,
    /// What changed
    pub delta: Delta,
    /// Missing-data notices
    pub warnings: Vec<InsufficientDataWarning>,
}

/// A dependent project reached by the cascade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependentImpact {
    /// Dependent identity
    pub project: ProjectKey,
    /// Baseline state
    pub before: ProjectState,
    /// State after the first-order adjustment
    pub after: ProjectState,
    /// How it is affected
    pub impact: ImpactKind,
    /// Hops from the target
    pub depth: usize,
    /// Project through which the impact arrived
    pub via: ProjectKey,
    /// Missing-data notices
    pub warnings: Vec<InsufficientDataWarning>,
}

impl DependentImpact {
    /// Display name of the dependent
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.before.name
    }
}

/// Dependency edge voided by a removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoidedEdge {
    /// Project that waited
    pub dependent: ProjectKey,
    /// Project waited on
    pub dependency: ProjectKey,
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    action: ScenarioAction,
    target: ProjectChange,
    dependents: Vec<DependentImpact>,
    freed_budget: f64,
    consumed_budget: f64,
    voided_edges: Vec<VoidedEdge>,
    warnings: Vec<String>,
}

impl ScenarioResult {
    pub(crate) fn new(
        action: ScenarioAction,
        target: ProjectChange,
        dependents: Vec<DependentImpact>,
    ) -> Self {
        Self {
            action,
            target,
            dependents,
            freed_budget: 0.0,
            consumed_budget: 0.0,
            voided_edges: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_budget_totals(mut self, freed: f64, consumed: f64) -> Self {
        self.freed_budget = freed;
        self.consumed_budget = consumed;
        self
    }

    pub(crate) fn with_voided_edges(mut self, edges: Vec<VoidedEdge>) -> Self {
        self.voided_edges = edges;
        self
    }

    pub(crate) fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Parsed action
    #[inline]
    #[must_use]
    pub fn action(&self) -> &ScenarioAction {
        &self.action
    }

    /// Target before/after
    #[inline]
    #[must_use]
    pub fn target(&self) -> &ProjectChange {
        &self.target
    }

    /// Dependents in cascade order
    #[inline]
    #[must_use]
    pub fn dependents(&self) -> &[DependentImpact] {
        &self.dependents
    }

    /// Dependent entry for a project, if the cascade reached it
    #[must_use]
    pub fn dependent(&self, key: &ProjectKey) -> Option<&DependentImpact> {
        self.dependents.iter().find(|d| &d.project == key)
    }

    /// Budget released by the scenario
    #[inline]
    #[must_use]
    pub fn freed_budget(&self) -> f64 {
        self.freed_budget
    }

    /// Budget added by the scenario
    #[inline]
    #[must_use]
    pub fn consumed_budget(&self) -> f64 {
        self.consumed_budget
    }

    /// Edges dropped because the target was removed
    #[inline]
    #[must_use]
    pub fn voided_edges(&self) -> &[VoidedEdge] {
        &self.voided_edges
    }

    /// Human-readable warnings
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// True if the target or any dependent lacked data
    #[must_use]
    pub fn has_insufficient_data(&self) -> bool {
        self.target.delta.insufficient_data()
            || !self.target.warnings.is_empty()
            || self.dependents.iter().any(|d| !d.warnings.is_empty())
    }

    /// Post-scenario portfolio
    ///
    /// `baseline` must be the snapshot the scenario ran against; it is not
    /// modified.
    #[must_use]
    pub fn snapshot_after(&self, baseline: &PortfolioSnapshot) -> PortfolioSnapshot {
        let states = std::iter::once(&self.target.after).chain(self.dependents.iter().map(|d| &d.after));
        baseline.with_states(states)
    }
}
