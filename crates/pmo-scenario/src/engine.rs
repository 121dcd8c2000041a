//! Scenario orchestration
//!
//! The engine sequences one scenario:
//! 1. Parse the text into a [`ScenarioAction`]
//! 2. Simulate the action on the target project
//! 3. For removals, delays and scope cuts, walk the cascade and apply a
//!    first-order adjustment to every dependent
//! 4. Assemble the [`ScenarioResult`]
//!
//! The baseline snapshot is only ever borrowed. A failed scenario leaves it
//! valid for the next one.

use crate::action::{Action, ScenarioAction};
use crate::config::ScenarioConfig;
use crate::error::{InsufficientDataWarning, MissingField, ScenarioError};
use crate::parser::ActionParser;
use crate::result::{DependentImpact, ProjectChange, ScenarioResult, VoidedEdge};
use crate::simulate::{shift, simulate, Delta, ShiftError, SimulationContext};
use pmo_graph::{CascadeEntry, CascadeResolver, CascadeTrigger, DependencyGraph, GraphBuilder, ImpactKind};
use pmo_model::{PortfolioSnapshot, Project, ProjectKey, ProjectState};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Duration;

/// Snapshot with its dependency graph built once
///
/// Read-only after construction; share it across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PreparedPortfolio {
    snapshot: PortfolioSnapshot,
    graph: DependencyGraph,
}

impl PreparedPortfolio {
    /// Build the dependency graph for `snapshot`
    #[must_use]
    pub fn new(snapshot: PortfolioSnapshot) -> Self {
        let graph = GraphBuilder::new().build(snapshot.projects());
        Self { snapshot, graph }
    }

    /// Build a snapshot from raw project records, then its graph
    ///
    /// # Errors
    /// Returns [`ScenarioError::Snapshot`] on duplicate or blank names
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Result<Self, ScenarioError> {
        Ok(Self::new(PortfolioSnapshot::new(projects)?))
    }

    /// Baseline snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &PortfolioSnapshot {
        &self.snapshot
    }

    /// Dependency graph
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

/// Runs scenarios against portfolios
#[derive(Debug, Clone, Default)]
pub struct ScenarioEngine {
    config: ScenarioConfig,
    parser: ActionParser,
}

impl ScenarioEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            parser: ActionParser::new(),
        }
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Build the graph for a snapshot so several scenarios can share it
    #[must_use]
    pub fn prepare(&self, snapshot: PortfolioSnapshot) -> PreparedPortfolio {
        PreparedPortfolio::new(snapshot)
    }

    /// Parse and run one scenario, building the graph on the fly
    ///
    /// # Errors
    /// Returns error if the text cannot be parsed
    pub fn run_scenario(
        &self,
        snapshot: &PortfolioSnapshot,
        text: &str,
    ) -> Result<ScenarioResult, ScenarioError> {
        let graph = GraphBuilder::new().build(snapshot.projects());
        self.evaluate(snapshot, &graph, text)
    }

    /// Parse and run one scenario against a prepared portfolio
    ///
    /// # Errors
    /// Returns error if the text cannot be parsed
    pub fn run(
        &self,
        prepared: &PreparedPortfolio,
        text: &str,
    ) -> Result<ScenarioResult, ScenarioError> {
        self.evaluate(&prepared.snapshot, &prepared.graph, text)
    }

    /// Run an already parsed action
    ///
    /// # Errors
    /// Returns error if the action targets a project outside the snapshot
    pub fn run_action(
        &self,
        prepared: &PreparedPortfolio,
        action: &ScenarioAction,
    ) -> Result<ScenarioResult, ScenarioError> {
        self.apply(&prepared.snapshot, &prepared.graph, action)
    }

    /// Run independent scenarios in parallel
    ///
    /// Results are in input order.
    pub fn run_batch<S>(
        &self,
        prepared: &PreparedPortfolio,
        texts: &[S],
    ) -> Vec<Result<ScenarioResult, ScenarioError>>
    where
        S: AsRef<str> + Sync,
    {
        tracing::info!("Running batch of {} scenarios", texts.len());
        texts
            .par_iter()
            .map(|text| self.run(prepared, text.as_ref()))
            .collect()
    }

    /// Run one scenario on the blocking pool, bounded by `limit`
    ///
    /// # Errors
    /// Returns [`ScenarioError::Timeout`] when `limit` elapses first, or
    /// [`ScenarioError::Worker`] if the worker task fails
    pub async fn run_with_timeout(
        &self,
        prepared: Arc<PreparedPortfolio>,
        text: impl Into<String>,
        limit: Duration,
    ) -> Result<ScenarioResult, ScenarioError> {
        let engine = self.clone();
        let text = text.into();
        let task = tokio::task::spawn_blocking(move || engine.run(&prepared, &text));

        match tokio::time::timeout(limit, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ScenarioError::Worker(join_error.to_string())),
            Err(_) => {
                let duration_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!("Scenario timed out after {}ms", duration_ms);
                Err(ScenarioError::Timeout { duration_ms })
            }
        }
    }

    fn evaluate(
        &self,
        snapshot: &PortfolioSnapshot,
        graph: &DependencyGraph,
        text: &str,
    ) -> Result<ScenarioResult, ScenarioError> {
        let action = self
            .parser
            .parse(text, snapshot.projects().map(|p| p.name.as_str()))?;
        tracing::debug!("Parsed action: {:?}", action.action);
        self.apply(snapshot, graph, &action)
    }

    fn apply(
        &self,
        snapshot: &PortfolioSnapshot,
        graph: &DependencyGraph,
        action: &ScenarioAction,
    ) -> Result<ScenarioResult, ScenarioError> {
        tracing::info!("Running scenario: {}", action);

        let project = snapshot
            .get(&action.target)
            .ok_or_else(|| ScenarioError::UnknownProject {
                name: action.target_name.clone(),
                known: snapshot.names().into_iter().map(str::to_string).collect(),
            })?;
        let before = project.state();
        let ctx = SimulationContext::from_config(&self.config);

        let mut warnings = Vec::new();
        if before.is_removed() {
            tracing::warn!("{} is already removed", before.name);
            warnings.push(format!("{} is already removed from the portfolio", before.name));
        }

        let outcome = simulate(&before, &action.action, &ctx);
        warnings.extend(outcome.alerts.iter().cloned());

        let trigger = cascade_trigger(&action.action, &outcome.delta);
        let resolver = CascadeResolver::new().with_max_depth(self.config.thresholds.max_cascade_depth);
        let dependents: Vec<DependentImpact> = resolver
            .resolve(graph, &action.target, trigger)
            .into_iter()
            .filter_map(|entry| {
                let project = snapshot.get(&entry.project)?;
                Some(adjust_dependent(project.state(), entry, &action.target))
            })
            .collect();

        if let Some(note) = cascade_note(&action.action, &before.name, &dependents) {
            warnings.push(note);
        }

        let (freed, consumed) = budget_totals(&outcome.delta);
        let voided = if matches!(action.action, Action::Removal) {
            voided_edges(graph, &action.target)
        } else {
            Vec::new()
        };

        tracing::info!(
            "Scenario complete: {} dependents affected, {} warnings",
            dependents.len(),
            warnings.len()
        );

        let target = ProjectChange {
            before,
            after: outcome.state,
            delta: outcome.delta,
            warnings: outcome.warnings,
        };
        Ok(ScenarioResult::new(action.clone(), target, dependents)
            .with_budget_totals(freed, consumed)
            .with_voided_edges(voided)
            .with_warnings(warnings))
    }
}

/// How the target's change travels along dependency edges
fn cascade_trigger(action: &Action, delta: &Delta) -> CascadeTrigger {
    match (action, delta) {
        (Action::Removal, _) => CascadeTrigger::Removal,
        (Action::Delay { .. }, Delta::Delay(d)) => CascadeTrigger::Delay { days: d.days },
        (Action::ScopeCut { .. }, Delta::Scope(d)) => CascadeTrigger::ScopeCut {
            days_earlier: d.days_earlier,
        },
        _ => CascadeTrigger::BudgetChange,
    }
}

/// First-order adjustment of one dependent; its own simulator never runs
fn adjust_dependent(before: ProjectState, entry: CascadeEntry, target: &ProjectKey) -> DependentImpact {
    let mut after = before.clone();
    let mut warnings = Vec::new();

    match entry.impact {
        ImpactKind::CascadingDelay { days } => {
            for (field, slot) in [
                (MissingField::StartDate, &mut after.start_date),
                (MissingField::EndDate, &mut after.end_date),
            ] {
                match shift(*slot, days) {
                    Ok(moved) => *slot = Some(moved),
                    Err(err) => {
                        let detail = match err {
                            ShiftError::Missing => format!("cannot shift {field} by {days} days"),
                            ShiftError::OutOfRange => {
                                format!("shifting {field} by {days} days moves it out of range")
                            }
                        };
                        warnings.push(InsufficientDataWarning::new(&before.key, field, detail));
                    }
                }
            }
        }
        // Only direct dependents lose the removed project; further ones
        // are reported through the impact entry alone.
        ImpactKind::BrokenDependency => {
            if entry.depth == 1 && !after.broken_dependencies.contains(target) {
                after.broken_dependencies.push(target.clone());
            }
        }
        ImpactKind::EarlierAvailability { .. } => {}
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    DependentImpact {
        project: entry.project,
        before,
        after,
        impact: entry.impact,
        depth: entry.depth,
        via: entry.via,
        warnings,
    }
}

fn cascade_note(action: &Action, target_name: &str, dependents: &[DependentImpact]) -> Option<String> {
    if dependents.is_empty() {
        return None;
    }
    let names = dependents.iter().map(DependentImpact::name).collect::<Vec<_>>().join(", ");
    let plural = if dependents.len() == 1 { "" } else { "s" };
    match action {
        Action::Delay { .. } => Some(format!(
            "Delay on {target_name} cascades to {} dependent project{plural}: {names}",
            dependents.len()
        )),
        Action::Removal => Some(format!(
            "Removing {target_name} breaks dependencies for: {names}; these projects may need re-planning"
        )),
        Action::ScopeCut { .. } | Action::BudgetChange { .. } => None,
    }
}

/// Freed and consumed budget for the target's delta
fn budget_totals(delta: &Delta) -> (f64, f64) {
    match delta {
        Delta::Removal(d) => (d.freed_budget, 0.0),
        Delta::Budget(d) if d.change < 0.0 => (-d.change, 0.0),
        Delta::Budget(d) => (0.0, d.change),
        Delta::Scope(_) | Delta::Delay(_) => (0.0, 0.0),
    }
}

/// Edges that disappear when `target` leaves the graph
fn voided_edges(graph: &DependencyGraph, target: &ProjectKey) -> Vec<VoidedEdge> {
    let remaining = graph.without_edges_of(target);
    graph
        .edges()
        .filter(|e| remaining.edge(&e.dependent, &e.dependency).is_none())
        .map(|e| VoidedEdge {
            dependent: e.dependent.clone(),
            dependency: e.dependency.clone(),
        })
        .collect()
}
