//! Read-only portfolio snapshot
//!
//! [`PortfolioSnapshot`] is the baseline every scenario runs against. It has
//! no mutating operations; a scenario that changes projects produces a new
//! snapshot through [`PortfolioSnapshot::with_states`].

use crate::key::ProjectKey;
use crate::project::{Project, ProjectState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Snapshot construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Two projects normalise to the same key
    #[error("duplicate project name: '{name}' clashes with '{existing}'")]
    DuplicateProject {
        /// Name that was rejected
        name: String,
        /// Name already in the snapshot
        existing: String,
    },

    /// Project name is empty after normalisation
    #[error("project at position {position} has a blank name")]
    BlankName {
        /// Zero-based input position
        position: usize,
    },
}

/// Immutable, ordered collection of projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct PortfolioSnapshot {
    projects: IndexMap<ProjectKey, Project>,
}

/// Wire shape of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotRecord {
    projects: Vec<Project>,
}

impl TryFrom<SnapshotRecord> for PortfolioSnapshot {
    type Error = SnapshotError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        Self::new(record.projects)
    }
}

impl From<PortfolioSnapshot> for SnapshotRecord {
    fn from(snapshot: PortfolioSnapshot) -> Self {
        Self {
            projects: snapshot.projects.into_values().collect(),
        }
    }
}

impl PortfolioSnapshot {
    /// Build snapshot, preserving input order
    ///
    /// # Errors
    /// Returns error on blank names or names that collide after normalisation
    pub fn new(projects: impl IntoIterator<Item = Project>) -> Result<Self, SnapshotError> {
        let mut map: IndexMap<ProjectKey, Project> = IndexMap::new();
        for (position, project) in projects.into_iter().enumerate() {
            let key = project.key();
            if key.is_blank() {
                return Err(SnapshotError::BlankName { position });
            }
            if let Some(existing) = map.get(&key) {
                return Err(SnapshotError::DuplicateProject {
                    name: project.name.clone(),
                    existing: existing.name.clone(),
                });
            }
            map.insert(key, project);
        }
        Ok(Self { projects: map })
    }

    /// Projects in input order
    pub fn projects(&self) -> impl ExactSizeIterator<Item = &Project> {
        self.projects.values()
    }

    /// Keys in input order
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &ProjectKey> {
        self.projects.keys()
    }

    /// Display names in input order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.projects.values().map(|p| p.name.as_str()).collect()
    }

    /// Lookup by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &ProjectKey) -> Option<&Project> {
        self.projects.get(key)
    }

    /// Lookup by display name (normalised first)
    #[inline]
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Project> {
        self.get(&ProjectKey::new(name))
    }

    /// Number of projects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// True if the portfolio is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// New snapshot with the given states applied over this one
    ///
    /// States for unknown keys are ignored. `self` is left untouched.
    #[must_use]
    pub fn with_states<'a>(&self, states: impl IntoIterator<Item = &'a ProjectState>) -> Self {
        let mut projects = self.projects.clone();
        for state in states {
            if let Some(slot) = projects.get_mut(&state.key) {
                *slot = slot.with_state(state);
            }
        }
        Self { projects }
    }
}
