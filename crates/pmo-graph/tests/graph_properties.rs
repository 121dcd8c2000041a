//! Graph construction and cascade properties.
//!
//! Fixtures come from `pmo-test-utils`; arbitrary graphs are generated with
//! proptest, including cyclic ones.

use pmo_graph::{CascadeResolver, CascadeTrigger, DependencyGraph, GraphBuilder, ImpactKind};
use pmo_model::{Project, ProjectKey, Task};
use pmo_test_utils::{cyclic_portfolio, diamond_portfolio, project_with_comment, sample_portfolio};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;

fn key(name: &str) -> ProjectKey {
    ProjectKey::new(name)
}

#[test]
fn sample_portfolio_edges() {
    let snapshot = sample_portfolio();
    let graph = GraphBuilder::new().build(snapshot.projects());

    assert_eq!(graph.dependencies_of(&key("alpha")), &[key("beta")]);
    assert_eq!(graph.dependencies_of(&key("gamma")), &[key("alpha")]);
    assert_eq!(graph.all_dependents(&key("beta")), vec![key("alpha"), key("gamma")]);
    assert_eq!(graph.all_dependencies(&key("gamma")), vec![key("alpha"), key("beta")]);
    assert!(graph.find_cycles().is_empty());
}

#[test]
fn build_is_idempotent_including_evidence_order() {
    let snapshot = diamond_portfolio();
    let first = GraphBuilder::new().build(snapshot.projects());
    let second = GraphBuilder::new().build(snapshot.projects());
    assert_eq!(first, second);
    assert_eq!(first.summary(), second.summary());
}

#[test]
fn own_name_after_cue_is_ignored() {
    let projects = vec![
        project_with_comment("Alpha", "blocked by Alpha and Beta"),
        Project::new("Beta"),
    ];
    let graph = GraphBuilder::new().build(&projects);
    assert!(graph.edge(&key("alpha"), &key("alpha")).is_none());
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn cyclic_fixture_is_reported_not_rejected() {
    let snapshot = cyclic_portfolio();
    let graph = GraphBuilder::new().build(snapshot.projects());

    assert_eq!(graph.find_cycles(), vec![vec![key("a"), key("b"), key("c")]]);
    let summary = graph.summary();
    assert_eq!(summary.cycles, vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]]);
}

#[test]
fn diamond_delay_is_inherited_once() {
    let snapshot = diamond_portfolio();
    let graph = GraphBuilder::new().build(snapshot.projects());
    let entries = CascadeResolver::new().resolve(&graph, &key("a"), CascadeTrigger::Delay { days: 30 });

    let shifts: Vec<_> = entries.iter().map(|e| (e.project.clone(), e.impact)).collect();
    assert_eq!(
        shifts,
        vec![
            (key("b"), ImpactKind::CascadingDelay { days: 30 }),
            (key("c"), ImpactKind::CascadingDelay { days: 30 }),
        ]
    );
}

#[test]
fn removed_project_edges_can_be_voided() {
    let snapshot = sample_portfolio();
    let graph = GraphBuilder::new().build(snapshot.projects());
    let voided = graph.without_edges_of(&key("alpha"));

    assert_eq!(voided.node_count(), graph.node_count());
    assert_eq!(voided.edge_count(), 0);
    assert!(voided.dependents_of(&key("beta")).is_empty());
}

/// Projects named `P0..Pn`, each with one task naming its dependencies
fn projects_from_edges(count: usize, edges: &[(usize, usize)]) -> Vec<Project> {
    (0..count)
        .map(|i| {
            let targets: Vec<String> = edges
                .iter()
                .filter(|(from, _)| *from == i)
                .map(|(_, to)| format!("P{to}"))
                .collect();
            let project = Project::new(format!("P{i}"));
            if targets.is_empty() {
                project
            } else {
                project.with_task(Task::new("work").with_comments(format!("depends on {}", targets.join(", "))))
            }
        })
        .collect()
}

fn edges_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec((0..count, 0..count), 0..(count * 3)),
        )
    })
}

proptest! {
    #[test]
    fn builder_is_idempotent_and_never_self_linked((count, edges) in edges_strategy()) {
        let projects = projects_from_edges(count, &edges);
        let first = GraphBuilder::new().build(&projects);
        let second = GraphBuilder::new().build(&projects);
        prop_assert_eq!(&first, &second);

        for edge in first.edges() {
            prop_assert_ne!(&edge.dependent, &edge.dependency);
        }
        for &(from, to) in &edges {
            let (from, to) = (key(&format!("P{from}")), key(&format!("P{to}")));
            prop_assert_eq!(first.edge(&from, &to).is_some(), from != to);
        }
    }

    #[test]
    fn resolver_visits_each_dependent_once((count, edges) in edges_strategy(), origin in 0usize..12, days in 1i64..400) {
        let mut graph = DependencyGraph::new();
        for i in 0..count {
            graph.add_node(key(&format!("P{i}")), format!("P{i}"));
        }
        for &(from, to) in &edges {
            let _ = graph.add_edge(&key(&format!("P{from}")), &key(&format!("P{to}")), None);
        }
        let origin = key(&format!("P{}", origin % count));

        let entries = CascadeResolver::new().resolve(&graph, &origin, CascadeTrigger::Delay { days });
        let mut seen = HashSet::new();
        for entry in &entries {
            prop_assert!(seen.insert(entry.project.clone()), "duplicate {}", entry.project);
            prop_assert_ne!(&entry.project, &origin);
            prop_assert_eq!(entry.impact, ImpactKind::CascadingDelay { days });
        }

        let expected: HashSet<ProjectKey> = graph.all_dependents(&origin).into_iter().collect();
        prop_assert_eq!(seen, expected);
    }
}
