//! Dependency graph storage
//!
//! Provides [`DependencyGraph`], an insertion-ordered directed graph of
//! "depends-on" edges between projects, indexed in both directions.

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use pmo_model::ProjectKey;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Graph mutation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Edge from a project to itself
    #[error("project '{0}' cannot depend on itself")]
    SelfDependency(ProjectKey),
}

/// Free-text field an edge was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    /// Task comments
    Comments,
    /// Task description
    Description,
}

/// Where an edge came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEvidence {
    /// Normalised cue phrase, e.g. `blocked by`
    pub cue: String,
    /// Task the phrase appeared in
    pub task: String,
    /// Field of the task
    pub field: TextField,
    /// Clause of the original text starting at the cue
    pub excerpt: String,
}

/// Directed "depends-on" relation between two projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Project that waits
    pub dependent: ProjectKey,
    /// Project waited on
    pub dependency: ProjectKey,
    /// Every phrase that produced this edge, in discovery order
    pub evidence: Vec<EdgeEvidence>,
}

/// Outcome of [`DependencyGraph::add_edge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    /// First edge between the pair
    New,
    /// Evidence appended to an existing edge
    Merged,
}

/// Project dependency graph for one snapshot
///
/// Derived from task text and rebuilt whenever inputs change. Adjacency
/// lists keep the insertion order of each edge's first occurrence, so
/// identical inputs always produce identical traversal orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    /// key -> display name, snapshot order
    nodes: IndexMap<ProjectKey, String>,
    /// (dependent, dependency) -> edge
    edges: IndexMap<(ProjectKey, ProjectKey), DependencyEdge>,
    /// dependent -> dependencies
    forward: IndexMap<ProjectKey, Vec<ProjectKey>>,
    /// dependency -> dependents
    backward: IndexMap<ProjectKey, Vec<ProjectKey>>,
}

impl DependencyGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project; existing nodes keep their name and position
    pub fn add_node(&mut self, key: ProjectKey, name: impl Into<String>) {
        self.nodes.entry(key).or_insert_with(|| name.into());
    }

    /// Add a dependency edge, merging evidence for a known pair
    ///
    /// Unknown endpoints are registered as nodes named after their key.
    ///
    /// # Errors
    /// Returns error if `dependent == dependency`
    pub fn add_edge(
        &mut self,
        dependent: &ProjectKey,
        dependency: &ProjectKey,
        evidence: Option<EdgeEvidence>,
    ) -> Result<EdgeInsert, GraphError> {
        if dependent == dependency {
            return Err(GraphError::SelfDependency(dependent.clone()));
        }

        self.add_node(dependent.clone(), dependent.as_str());
        self.add_node(dependency.clone(), dependency.as_str());

        let pair = (dependent.clone(), dependency.clone());
        if let Some(edge) = self.edges.get_mut(&pair) {
            edge.evidence.extend(evidence);
            return Ok(EdgeInsert::Merged);
        }

        self.edges.insert(
            pair,
            DependencyEdge {
                dependent: dependent.clone(),
                dependency: dependency.clone(),
                evidence: evidence.into_iter().collect(),
            },
        );
        self.forward
            .entry(dependent.clone())
            .or_default()
            .push(dependency.clone());
        self.backward
            .entry(dependency.clone())
            .or_default()
            .push(dependent.clone());

        Ok(EdgeInsert::New)
    }

    /// Number of projects
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct dependent/dependency pairs
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True if the project is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ProjectKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Position of a project in node order
    #[inline]
    #[must_use]
    pub fn node_index(&self, key: &ProjectKey) -> Option<usize> {
        self.nodes.get_index_of(key)
    }

    /// Project at a node position
    #[inline]
    #[must_use]
    pub fn node_at(&self, index: usize) -> Option<&ProjectKey> {
        self.nodes.get_index(index).map(|(k, _)| k)
    }

    /// Display name of a project
    #[inline]
    #[must_use]
    pub fn name_of(&self, key: &ProjectKey) -> Option<&str> {
        self.nodes.get(key).map(String::as_str)
    }

    /// All projects in node order
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &ProjectKey> {
        self.nodes.keys()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl ExactSizeIterator<Item = &DependencyEdge> {
        self.edges.values()
    }

    /// Edge between a pair, if any
    #[must_use]
    pub fn edge(&self, dependent: &ProjectKey, dependency: &ProjectKey) -> Option<&DependencyEdge> {
        self.edges.get(&(dependent.clone(), dependency.clone()))
    }

    /// Direct dependencies: who does `key` depend on
    #[must_use]
    pub fn dependencies_of(&self, key: &ProjectKey) -> &[ProjectKey] {
        self.forward.get(key).map_or(&[], Vec::as_slice)
    }

    /// Direct dependents: who depends on `key`
    #[must_use]
    pub fn dependents_of(&self, key: &ProjectKey) -> &[ProjectKey] {
        self.backward.get(key).map_or(&[], Vec::as_slice)
    }

    /// Transitive dependents in breadth-first order, excluding `key`
    #[must_use]
    pub fn all_dependents(&self, key: &ProjectKey) -> Vec<ProjectKey> {
        self.reachable(key, |k| self.dependents_of(k))
    }

    /// Transitive dependencies in breadth-first order, excluding `key`
    #[must_use]
    pub fn all_dependencies(&self, key: &ProjectKey) -> Vec<ProjectKey> {
        self.reachable(key, |k| self.dependencies_of(k))
    }

    fn reachable<'a, F>(&'a self, start: &ProjectKey, next: F) -> Vec<ProjectKey>
    where
        F: Fn(&ProjectKey) -> &'a [ProjectKey],
    {
        let mut seen = vec![false; self.nodes.len()];
        if let Some(idx) = self.node_index(start) {
            seen[idx] = true;
        }

        let mut out = Vec::new();
        let mut queue = VecDeque::from([start.clone()]);
        while let Some(current) = queue.pop_front() {
            for neighbor in next(&current) {
                let Some(idx) = self.node_index(neighbor) else {
                    continue;
                };
                if seen[idx] {
                    continue;
                }
                seen[idx] = true;
                out.push(neighbor.clone());
                queue.push_back(neighbor.clone());
            }
        }
        out
    }

    /// Dependency cycles (strongly connected components with 2+ projects)
    ///
    /// Each cycle is listed in node order; cycles are ordered by their first
    /// member. Cycles are reported, never rejected.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<ProjectKey>> {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let indices: Vec<NodeIndex> = (0..self.nodes.len()).map(|i| graph.add_node(i)).collect();

        for edge in self.edges.values() {
            if let (Some(from), Some(to)) = (
                self.node_index(&edge.dependent),
                self.node_index(&edge.dependency),
            ) {
                graph.add_edge(indices[from], indices[to], ());
            }
        }

        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut members: Vec<usize> = scc.into_iter().map(|n| graph[n]).collect();
                members.sort_unstable();
                members
            })
            .collect();
        cycles.sort_unstable();

        cycles
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .filter_map(|i| self.node_at(i).cloned())
                    .collect()
            })
            .collect()
    }

    /// Copy of this graph with every edge touching `key` removed
    ///
    /// The node itself stays so positions remain stable.
    #[must_use]
    pub fn without_edges_of(&self, key: &ProjectKey) -> Self {
        let mut out = Self {
            nodes: self.nodes.clone(),
            ..Self::default()
        };
        for edge in self.edges.values() {
            if &edge.dependent == key || &edge.dependency == key {
                continue;
            }
            for evidence in &edge.evidence {
                // Pairs were validated on first insertion.
                let _ = out.add_edge(&edge.dependent, &edge.dependency, Some(evidence.clone()));
            }
            if edge.evidence.is_empty() {
                let _ = out.add_edge(&edge.dependent, &edge.dependency, None);
            }
        }
        out
    }

    /// Serializable view for reporting
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            projects: self.nodes.values().cloned().collect(),
            edges: self
                .edges
                .values()
                .map(|e| EdgeSummary {
                    dependent: self.display(&e.dependent),
                    dependency: self.display(&e.dependency),
                    cues: e.evidence.iter().map(|ev| ev.cue.clone()).collect(),
                    tasks: e.evidence.iter().map(|ev| ev.task.clone()).collect(),
                })
                .collect(),
            cycles: self
                .find_cycles()
                .iter()
                .map(|c| c.iter().map(|k| self.display(k)).collect())
                .collect(),
        }
    }

    fn display(&self, key: &ProjectKey) -> String {
        self.name_of(key).unwrap_or(key.as_str()).to_string()
    }
}

/// Reporting view of a [`DependencyGraph`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Project display names
    pub projects: Vec<String>,
    /// Edges in discovery order
    pub edges: Vec<EdgeSummary>,
    /// Detected cycles
    pub cycles: Vec<Vec<String>>,
}

/// Reporting view of one edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSummary {
    /// Project that waits
    pub dependent: String,
    /// Project waited on
    pub dependency: String,
    /// Cue phrases seen
    pub cues: Vec<String>,
    /// Tasks the cues came from
    pub tasks: Vec<String>,
}
