//! Cascade resolution
//!
//! Given a changed project, [`CascadeResolver`] walks backward edges
//! (projects that depend on the changed one) breadth-first and classifies
//! how each transitively affected project is hit.
//!
//! The walk keeps an arena of visited flags indexed by node position, so it
//! terminates on cyclic graphs and reports every project at most once.
//!
//! Edges carry no schedule lag. A shift reaches every dependent unchanged,
//! so all paths to a project agree on it.

use crate::graph::DependencyGraph;
use pmo_model::ProjectKey;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Change applied to the origin project, as seen by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CascadeTrigger {
    /// Origin leaves the portfolio
    Removal,
    /// Origin finishes later
    Delay {
        /// Shift of the origin's end date
        days: i64,
    },
    /// Origin finishes earlier after a scope cut
    ScopeCut {
        /// Days pulled in
        days_earlier: i64,
    },
    /// Budget moved; does not travel along dependency edges
    BudgetChange,
}

/// How a dependent project is affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImpactKind {
    /// A dependency disappeared; hard blocker
    BrokenDependency,
    /// Earliest start shifts later
    CascadingDelay {
        /// Inherited shift
        days: i64,
    },
    /// Dependency lands earlier; informational
    EarlierAvailability {
        /// Days pulled in
        days_earlier: i64,
    },
}

impl ImpactKind {
    /// Stable snake_case label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::BrokenDependency => "broken_dependency",
            Self::CascadingDelay { .. } => "cascading_delay",
            Self::EarlierAvailability { .. } => "earlier_availability",
        }
    }

    /// True for impacts that introduce delivery risk
    #[must_use]
    pub fn is_risk(&self) -> bool {
        matches!(self, Self::BrokenDependency | Self::CascadingDelay { .. })
    }
}

/// One transitively affected project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeEntry {
    /// Affected project
    pub project: ProjectKey,
    /// Classification
    pub impact: ImpactKind,
    /// Hops from the origin (direct dependents are 1)
    pub depth: usize,
    /// Project through which the impact was first discovered
    pub via: ProjectKey,
}

/// Breadth-first cascade over backward dependency edges
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeResolver {
    max_depth: Option<usize>,
}

impl CascadeResolver {
    /// Resolver without a depth bound
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With maximum number of hops (`None` = unbounded)
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Ordered list of projects affected by a change to `changed`
    ///
    /// Order is breadth-first, neighbours in edge-discovery order. The
    /// origin never appears in its own cascade, even through a cycle.
    #[must_use]
    pub fn resolve(
        &self,
        graph: &DependencyGraph,
        changed: &ProjectKey,
        trigger: CascadeTrigger,
    ) -> Vec<CascadeEntry> {
        let origin_shift = match trigger {
            CascadeTrigger::BudgetChange => {
                tracing::trace!(origin = %changed, "budget changes do not cascade");
                return Vec::new();
            }
            CascadeTrigger::Delay { days } => days,
            CascadeTrigger::ScopeCut { days_earlier } => days_earlier,
            CascadeTrigger::Removal => 0,
        };

        let Some(origin) = graph.node_index(changed) else {
            return Vec::new();
        };

        let mut visited = vec![false; graph.node_count()];
        visited[origin] = true;

        let mut entries: Vec<(usize, usize, usize)> = Vec::new();
        let mut queue = VecDeque::from([(origin, 0_usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            if self.max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            let Some(current_key) = graph.node_at(current) else {
                continue;
            };

            for dependent in graph.dependents_of(current_key) {
                let Some(next) = graph.node_index(dependent) else {
                    continue;
                };
                if visited[next] {
                    continue;
                }

                visited[next] = true;
                entries.push((next, depth + 1, current));
                queue.push_back((next, depth + 1));

                tracing::trace!(
                    origin = %changed,
                    project = %dependent,
                    depth = depth + 1,
                    "cascade reached project"
                );
            }
        }

        entries
            .into_iter()
            .filter_map(|(node, depth, via)| {
                let impact = match trigger {
                    CascadeTrigger::Removal => ImpactKind::BrokenDependency,
                    CascadeTrigger::Delay { .. } => ImpactKind::CascadingDelay { days: origin_shift },
                    CascadeTrigger::ScopeCut { .. } => ImpactKind::EarlierAvailability {
                        days_earlier: origin_shift,
                    },
                    CascadeTrigger::BudgetChange => return None,
                };
                Some(CascadeEntry {
                    project: graph.node_at(node)?.clone(),
                    impact,
                    depth,
                    via: graph.node_at(via)?.clone(),
                })
            })
            .collect()
    }
}
