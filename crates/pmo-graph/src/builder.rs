//! Dependency graph construction from task text
//!
//! [`GraphBuilder`] scans each task's comments and description for a fixed
//! set of cue phrases ("blocked by", "depends on", ...) and links the task's
//! project to the known project named right after the cue. Budgets, dates
//! and statuses are never used to infer edges.

use crate::graph::{DependencyGraph, EdgeEvidence, EdgeInsert, TextField};
use once_cell::sync::Lazy;
use pmo_model::key::normalize;
use pmo_model::{Project, ProjectKey};
use regex::Regex;

/// Cue phrases that introduce a cross-project dependency
pub const CUE_PHRASES: &[&str] = &[
    "blocked by",
    "blocked on",
    "depends on",
    "dependent on",
    "waiting for",
    "waiting on",
    "contingent on",
];

/// Longest excerpt kept as edge evidence, in characters
const EXCERPT_CHARS: usize = 80;

static CUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives = CUE_PHRASES
        .iter()
        .map(|cue| cue.replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("cue pattern is a valid regex")
});

/// Punctuation and whitespace allowed between a cue and a name
static LEAD_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\p{P}]*").expect("lead-in pattern is a valid regex"));

/// Filler words that may precede a name
static FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:the|project)\s+)+").expect("filler pattern is a valid regex")
});

/// Separator continuing a list of names after a cue
static LIST_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:,\s*(?:and\s+)?|and\s+|&\s*|/\s*)")
        .expect("list separator pattern is a valid regex")
});

/// Builds a [`DependencyGraph`] from project tasks
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphBuilder;

impl GraphBuilder {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the dependency graph for a set of projects
    ///
    /// Every project becomes a node in input order. Edges follow the order
    /// in which they are first found: project, task, field, then position of
    /// the cue in the text.
    #[must_use]
    pub fn build<'a>(&self, projects: impl IntoIterator<Item = &'a Project>) -> DependencyGraph {
        let projects: Vec<&Project> = projects.into_iter().collect();
        let matcher = NameMatcher::new(&projects);

        let mut graph = DependencyGraph::new();
        for project in &projects {
            graph.add_node(project.key(), project.name.clone());
        }

        for project in &projects {
            let own = project.key();
            for task in &project.tasks {
                let fields = [
                    (TextField::Comments, task.comments.as_deref()),
                    (TextField::Description, task.description.as_deref()),
                ];
                for (field, text) in fields {
                    let Some(text) = text else { continue };
                    for mention in scan(text, &matcher, &own) {
                        let evidence = EdgeEvidence {
                            cue: mention.cue,
                            task: task.name.clone(),
                            field,
                            excerpt: mention.excerpt,
                        };
                        match graph.add_edge(&own, &mention.dependency, Some(evidence)) {
                            Ok(EdgeInsert::New) => tracing::trace!(
                                dependent = %own,
                                dependency = %mention.dependency,
                                task = %task.name,
                                "dependency edge discovered"
                            ),
                            Ok(EdgeInsert::Merged) => {}
                            Err(e) => tracing::trace!("skipping mention: {}", e),
                        }
                    }
                }
            }
        }

        tracing::debug!(
            projects = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        graph
    }
}

/// One project named after a cue
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    cue: String,
    dependency: ProjectKey,
    excerpt: String,
}

/// Find every project mentioned after a cue phrase, in text order
fn scan(text: &str, matcher: &NameMatcher, own: &ProjectKey) -> Vec<Mention> {
    let mut mentions = Vec::new();

    for cue in CUE_PATTERN.find_iter(text) {
        let cue_text = normalize(cue.as_str());
        let excerpt = excerpt(&text[cue.start()..]);

        let rest = normalize(&text[cue.end()..]);
        let mut cursor = LEAD_IN.find(&rest).map_or(0, |m| m.end());

        while let Some((key, end)) = matcher.name_at(&rest, cursor) {
            // Own name: no edge, but the list may go on.
            if key != own {
                mentions.push(Mention {
                    cue: cue_text.clone(),
                    dependency: key.clone(),
                    excerpt: excerpt.clone(),
                });
            }
            cursor = end;
            match LIST_SEPARATOR.find(&rest[cursor..]) {
                Some(sep) => cursor += sep.end(),
                None => break,
            }
        }
    }

    mentions
}

/// True if `text` starts with `word` followed by a non-alphanumeric or the end
fn starts_with_word(text: &str, word: &str) -> bool {
    text.starts_with(word)
        && text[word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
}

/// Clause of `text` up to the first sentence break, bounded in length
fn excerpt(text: &str) -> String {
    let clause = text
        .split(['.', ';', '\n'])
        .next()
        .unwrap_or(text);
    clause.chars().take(EXCERPT_CHARS).collect::<String>().trim().to_string()
}

/// Longest-match-first lookup of known project names
#[derive(Debug)]
struct NameMatcher {
    /// Normalised names, longest first; ties keep snapshot order
    names: Vec<ProjectKey>,
}

impl NameMatcher {
    fn new(projects: &[&Project]) -> Self {
        let mut names: Vec<ProjectKey> = projects.iter().map(|p| p.key()).collect();
        names.sort_by_key(|k| std::cmp::Reverse(k.as_str().chars().count()));
        Self { names }
    }

    /// Name at `cursor` in `text`, trying again past filler words
    ///
    /// Names that themselves start with a filler ("Project X") win over
    /// the filler reading. Returns the key and the byte offset after it.
    fn name_at(&self, text: &str, cursor: usize) -> Option<(&ProjectKey, usize)> {
        if let Some((key, len)) = self.longest_at(&text[cursor..]) {
            return Some((key, cursor + len));
        }
        let skip = FILLER.find(&text[cursor..])?.end();
        self.longest_at(&text[cursor + skip..])
            .map(|(key, len)| (key, cursor + skip + len))
    }

    /// Longest name starting at the head of `text`
    ///
    /// The task's own project takes part, so it shadows shorter names it
    /// extends. `text` must already be normalised. Returns the key and the
    /// byte length consumed.
    fn longest_at(&self, text: &str) -> Option<(&ProjectKey, usize)> {
        self.names
            .iter()
            .find(|name| starts_with_word(text, name.as_str()))
            .map(|name| (name, name.as_str().len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmo_model::Task;
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> ProjectKey {
        ProjectKey::new(s)
    }

    fn project(name: &str, comments: &[&str]) -> Project {
        comments.iter().enumerate().fold(Project::new(name), |p, (i, c)| {
            p.with_task(Task::new(format!("{name}-{i}")).with_comments(*c))
        })
    }

    #[test]
    fn links_dependent_to_named_project() {
        let projects = vec![
            project("Alpha", &[]),
            project("Beta", &["Blocked by Alpha until the API ships."]),
        ];
        let graph = GraphBuilder::new().build(&projects);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies_of(&key("beta")), &[key("alpha")]);
        let edge = graph.edge(&key("beta"), &key("alpha")).unwrap();
        assert_eq!(edge.evidence[0].cue, "blocked by");
        assert_eq!(edge.evidence[0].excerpt, "Blocked by Alpha until the API ships");
    }

    #[test]
    fn tolerates_punctuation_and_fillers() {
        let projects = vec![
            project("Data Platform", &[]),
            project("CRM", &["Depends on: the  DATA platform migration"]),
            project("Portal", &["waiting for -- project crm"]),
        ];
        let graph = GraphBuilder::new().build(&projects);

        assert_eq!(graph.dependencies_of(&key("crm")), &[key("data platform")]);
        assert_eq!(graph.dependencies_of(&key("portal")), &[key("crm")]);
    }

    #[test]
    fn prefers_longest_name() {
        let projects = vec![
            project("Alpha", &[]),
            project("Alpha Two", &[]),
            project("Beta", &["blocked on Alpha Two rollout"]),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.dependencies_of(&key("beta")), &[key("alpha two")]);
    }

    #[test]
    fn requires_word_boundary_after_name() {
        let projects = vec![
            project("Alp", &[]),
            project("Beta", &["depends on Alphabet soup"]),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn one_cue_may_name_several_projects() {
        let projects = vec![
            project("Alpha", &[]),
            project("Gamma", &[]),
            project("Delta", &[]),
            project("Beta", &["Blocked by Gamma, Alpha and Delta"]),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(
            graph.dependencies_of(&key("beta")),
            &[key("gamma"), key("alpha"), key("delta")]
        );
    }

    #[test]
    fn names_starting_with_filler_words_still_match() {
        let projects = vec![
            project("Project 0001", &[]),
            project("Project 0002", &["blocked by Project 0001"]),
            project("Gamma", &["blocked by project Project 0002"]),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.dependencies_of(&key("project 0002")), &[key("project 0001")]);
        assert_eq!(graph.dependencies_of(&key("gamma")), &[key("project 0002")]);
    }

    #[test]
    fn ignores_own_project_name() {
        let projects = vec![project("Alpha", &["blocked by Alpha procurement"])];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn own_name_inside_a_list_is_skipped() {
        let projects = vec![
            project("Alpha", &["blocked by Alpha and Beta"]),
            project("Beta", &[]),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.dependencies_of(&key("alpha")), &[key("beta")]);
    }

    #[test]
    fn own_name_shadows_shorter_project_it_extends() {
        let projects = vec![
            project("Alpha", &[]),
            project("Alpha Two", &["blocked by Alpha Two procurement"]),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.dependencies_of(&key("alpha two")).is_empty());
    }

    #[test]
    fn ignores_names_without_cue() {
        let projects = vec![
            project("Alpha", &[]),
            project("Beta", &["Coordinate with Alpha on release notes"]),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn scans_descriptions_after_comments() {
        let projects = vec![
            project("Alpha", &[]),
            project("Gamma", &[]),
            Project::new("Beta").with_task(
                Task::new("T")
                    .with_comments("waiting on Gamma sign-off")
                    .with_description("Depends on Alpha"),
            ),
        ];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.dependencies_of(&key("beta")), &[key("gamma"), key("alpha")]);
        assert_eq!(
            graph.edge(&key("beta"), &key("alpha")).unwrap().evidence[0].field,
            TextField::Description
        );
    }

    #[test]
    fn repeated_mentions_collapse_into_one_edge() {
        let projects = vec![
            project("Alpha", &[]),
            project("Beta", &["blocked by Alpha", "Still waiting for Alpha"]),
        ];
        let graph = GraphBuilder::new().build(&projects);

        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge(&key("beta"), &key("alpha")).unwrap();
        let cues: Vec<_> = edge.evidence.iter().map(|e| e.cue.as_str()).collect();
        assert_eq!(cues, vec!["blocked by", "waiting for"]);
    }

    #[test]
    fn cue_spacing_is_normalised() {
        let projects = vec![project("Alpha", &[]), project("Beta", &["BLOCKED\n  BY alpha"])];
        let graph = GraphBuilder::new().build(&projects);
        assert_eq!(graph.edge(&key("beta"), &key("alpha")).unwrap().evidence[0].cue, "blocked by");
    }
}
