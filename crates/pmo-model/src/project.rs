//! Project and task records
//!
//! Defines the ingested portfolio types:
//! - [`Project`] with its schedule, financials and owned tasks
//! - [`Task`] carrying the free text scanned for dependency cues
//! - [`ProjectState`], the part of a project that simulations may change

use crate::key::ProjectKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scope of a project with all planned work still remaining
pub const DEFAULT_SCOPE_PCT: f64 = 100.0;

fn default_scope() -> f64 {
    DEFAULT_SCOPE_PCT
}

/// Red/Amber/Green status, derived upstream by the risk engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RagStatus {
    /// On track
    Green,
    /// At risk
    Amber,
    /// Off track
    Red,
    /// Not classified
    #[default]
    Unknown,
}

/// Portfolio membership of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Part of the portfolio
    #[default]
    Active,
    /// Removed by a scenario
    Removed,
}

/// Single task or issue from a project export
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Task {
    /// Task title
    pub name: String,
    /// Workflow status label
    #[serde(default)]
    pub status: String,
    /// Free-text comments
    #[serde(default)]
    pub comments: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
}

impl Task {
    /// Create task with a name only
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With comments text
    #[inline]
    #[must_use]
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// With description text
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With status label
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Free-text fields in scan order (comments first)
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.comments
            .as_deref()
            .into_iter()
            .chain(self.description.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Ingested project record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Display name
    pub name: String,
    /// Free-text status label from the export
    #[serde(default)]
    pub status: String,
    /// RAG classification
    #[serde(default)]
    pub rag: RagStatus,
    /// Start date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// End or target date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Approved budget
    #[serde(default)]
    pub budget: Option<f64>,
    /// Spend to date
    #[serde(default)]
    pub actual_spend: Option<f64>,
    /// Percent of planned work remaining
    #[serde(default = "default_scope")]
    pub scope_pct: f64,
    /// Portfolio membership
    #[serde(default)]
    pub lifecycle: Lifecycle,
    /// Dependencies lost to removed projects
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broken_dependencies: Vec<ProjectKey>,
    /// Owned tasks
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    /// Create project with defaults for every optional field
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: String::new(),
            rag: RagStatus::Unknown,
            start_date: None,
            end_date: None,
            budget: None,
            actual_spend: None,
            scope_pct: DEFAULT_SCOPE_PCT,
            lifecycle: Lifecycle::Active,
            broken_dependencies: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Normalised identity
    #[inline]
    #[must_use]
    pub fn key(&self) -> ProjectKey {
        ProjectKey::new(&self.name)
    }

    /// With schedule
    #[inline]
    #[must_use]
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// With budget
    #[inline]
    #[must_use]
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// With spend to date
    #[inline]
    #[must_use]
    pub fn with_actual_spend(mut self, spend: f64) -> Self {
        self.actual_spend = Some(spend);
        self
    }

    /// With remaining scope percentage
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope_pct: f64) -> Self {
        self.scope_pct = scope_pct;
        self
    }

    /// With RAG status
    #[inline]
    #[must_use]
    pub fn with_rag(mut self, rag: RagStatus) -> Self {
        self.rag = rag;
        self
    }

    /// With status label
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Add an owned task
    #[inline]
    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Simulation-relevant projection
    #[must_use]
    pub fn state(&self) -> ProjectState {
        ProjectState {
            key: self.key(),
            name: self.name.clone(),
            status: self.status.clone(),
            rag: self.rag,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            actual_spend: self.actual_spend,
            scope_pct: self.scope_pct,
            lifecycle: self.lifecycle,
            broken_dependencies: self.broken_dependencies.clone(),
        }
    }

    /// Copy of this project carrying `state`; tasks are kept as-is
    #[must_use]
    pub fn with_state(&self, state: &ProjectState) -> Self {
        Self {
            name: state.name.clone(),
            status: state.status.clone(),
            rag: state.rag,
            start_date: state.start_date,
            end_date: state.end_date,
            budget: state.budget,
            actual_spend: state.actual_spend,
            scope_pct: state.scope_pct,
            lifecycle: state.lifecycle,
            broken_dependencies: state.broken_dependencies.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

/// Project fields a simulation may change
///
/// Simulators take a state by reference and return a new one; the snapshot
/// a state came from is never written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    /// Normalised identity
    pub key: ProjectKey,
    /// Display name
    pub name: String,
    /// Free-text status label
    pub status: String,
    /// RAG classification
    pub rag: RagStatus,
    /// Start date
    pub start_date: Option<NaiveDate>,
    /// End or target date
    pub end_date: Option<NaiveDate>,
    /// Approved budget
    pub budget: Option<f64>,
    /// Spend to date
    pub actual_spend: Option<f64>,
    /// Percent of planned work remaining
    pub scope_pct: f64,
    /// Portfolio membership
    pub lifecycle: Lifecycle,
    /// Dependencies lost to removed projects
    pub broken_dependencies: Vec<ProjectKey>,
}

impl ProjectState {
    /// Planned duration in days, if both dates are known and ordered
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days()),
            _ => None,
        }
    }

    /// Spend to date, missing spend counted as zero
    #[inline]
    #[must_use]
    pub fn spend_or_zero(&self) -> f64 {
        self.actual_spend.unwrap_or(0.0)
    }

    /// Unspent budget, floored at zero
    #[must_use]
    pub fn remaining_budget(&self) -> Option<f64> {
        self.budget.map(|b| (b - self.spend_or_zero()).max(0.0))
    }

    /// Spend over budget; `None` without a positive budget
    #[must_use]
    pub fn burn_rate(&self) -> Option<f64> {
        match self.budget {
            Some(b) if b > 0.0 => Some(self.spend_or_zero() / b),
            _ => None,
        }
    }

    /// True once a scenario removed the project
    #[inline]
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.lifecycle == Lifecycle::Removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn state_round_trips_through_project() {
        let project = Project::new("Alpha")
            .with_dates(Some(date(2026, 1, 1)), Some(date(2026, 6, 30)))
            .with_budget(100_000.0)
            .with_actual_spend(45_000.0)
            .with_task(Task::new("T1").with_comments("Depends on Beta"));

        let mut state = project.state();
        state.scope_pct = 70.0;
        let updated = project.with_state(&state);

        assert_eq!(updated.scope_pct, 70.0);
        assert_eq!(updated.tasks, project.tasks);
        assert_eq!(project.scope_pct, DEFAULT_SCOPE_PCT);
    }

    #[test]
    fn duration_requires_ordered_dates() {
        let mut state = Project::new("A")
            .with_dates(Some(date(2026, 1, 1)), Some(date(2026, 1, 31)))
            .state();
        assert_eq!(state.duration_days(), Some(30));

        state.end_date = Some(date(2025, 12, 1));
        assert_eq!(state.duration_days(), None);

        state.end_date = None;
        assert_eq!(state.duration_days(), None);
    }

    #[test]
    fn remaining_budget_treats_missing_spend_as_zero() {
        let state = Project::new("A").with_budget(10.0).state();
        assert_eq!(state.remaining_budget(), Some(10.0));
        assert_eq!(state.burn_rate(), Some(0.0));

        let overspent = Project::new("B").with_budget(10.0).with_actual_spend(15.0).state();
        assert_eq!(overspent.remaining_budget(), Some(0.0));
    }

    #[test]
    fn text_fields_skip_blank_values() {
        let task = Task::new("t").with_comments("   ").with_description("waiting for Beta");
        let fields: Vec<&str> = task.text_fields().collect();
        assert_eq!(fields, vec!["waiting for Beta"]);
    }

    #[test]
    fn project_deserializes_with_defaults() {
        let project: Project = serde_json::from_str(r#"{"name": "Gamma"}"#).unwrap();
        assert_eq!(project.scope_pct, DEFAULT_SCOPE_PCT);
        assert_eq!(project.rag, RagStatus::Unknown);
        assert_eq!(project.lifecycle, Lifecycle::Active);
        assert!(project.tasks.is_empty());
    }
}
