//! Error types for scenario evaluation
//!
//! Fatal failures abort the current scenario only:
//! - Scenario text outside the supported grammar
//! - Zero, negative or unparseable magnitudes
//! - Names that do not resolve to exactly one known project
//!
//! Missing project data is not fatal. It is reported through
//! [`InsufficientDataWarning`] attached to the affected delta.

use pmo_model::{ProjectKey, SnapshotError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scenario shapes understood by the parser
pub const SUPPORTED_PATTERNS: &[&str] = &[
    "increase|decrease <project> budget by <N>%",
    "increase|decrease <project> budget by £|$|€<N>",
    "cut|reduce <project> scope by <N>%",
    "delay|postpone <project> by <N> weeks|months|quarters",
    "remove|cancel <project>",
];

/// Main scenario error type
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Text does not match any supported grammar
    #[error("unrecognized scenario '{text}'; supported patterns: {}", SUPPORTED_PATTERNS.join(", "))]
    UnrecognizedScenario {
        /// Original scenario text
        text: String,
    },

    /// Magnitude is zero, negative, non-finite or out of range
    #[error("invalid magnitude '{magnitude}' in '{text}': {reason}")]
    InvalidMagnitude {
        /// Original scenario text
        text: String,
        /// Magnitude as written
        magnitude: String,
        /// Why it was rejected
        reason: String,
    },

    /// Name slot does not resolve to a project in the snapshot
    #[error("unknown project '{name}' (known projects: {})", .known.join(", "))]
    UnknownProject {
        /// Name as written
        name: String,
        /// Display names of the known projects
        known: Vec<String>,
    },

    /// Name slot names more than one project
    #[error("ambiguous project '{name}' (matches: {})", .matches.join(", "))]
    AmbiguousProject {
        /// Name as written
        name: String,
        /// Display names found in the slot, best match first
        matches: Vec<String>,
    },

    /// Snapshot could not be built
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Evaluation exceeded its wall-clock bound
    #[error("scenario timed out after {duration_ms}ms")]
    Timeout {
        /// Bound that elapsed
        duration_ms: u64,
    },

    /// Worker thread failed before producing a result
    #[error("scenario worker failed: {0}")]
    Worker(String),
}

impl ScenarioError {
    /// Check if the error comes from the scenario text itself
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedScenario { .. }
                | Self::InvalidMagnitude { .. }
                | Self::UnknownProject { .. }
                | Self::AmbiguousProject { .. }
        )
    }

    /// Check if error is retryable
    ///
    /// Evaluation is pure computation; only a timeout may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Project field a computation needed but did not find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    /// No baseline budget
    Budget,
    /// No start date
    StartDate,
    /// No end date
    EndDate,
    /// End date before start date
    Duration,
    /// No scope left to scale the schedule by
    Scope,
}

impl MissingField {
    /// Stable snake_case label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Duration => "duration",
            Self::Scope => "scope",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Non-fatal notice that part of a delta could not be computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("insufficient data for '{project}': {field} ({detail})")]
pub struct InsufficientDataWarning {
    /// Project the delta belongs to
    pub project: ProjectKey,
    /// Field that was missing or unusable
    pub field: MissingField,
    /// What could not be computed
    pub detail: String,
}

impl InsufficientDataWarning {
    /// Create warning
    #[inline]
    #[must_use]
    pub fn new(project: &ProjectKey, field: MissingField, detail: impl Into<String>) -> Self {
        Self {
            project: project.clone(),
            field,
            detail: detail.into(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for the expected shape
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Values parsed but are out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_retryable() {
        let timeout = ScenarioError::Timeout { duration_ms: 5 };
        assert!(timeout.is_retryable());
        assert!(!timeout.is_user_error());

        let unknown = ScenarioError::UnknownProject {
            name: "Zeta".to_string(),
            known: vec!["Alpha".to_string()],
        };
        assert!(unknown.is_user_error());
        assert!(!unknown.is_retryable());
        assert!(!ScenarioError::Worker("panic".to_string()).is_retryable());
    }

    #[test]
    fn unrecognized_message_lists_patterns() {
        let err = ScenarioError::UnrecognizedScenario {
            text: "make it faster".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("make it faster"));
        for pattern in SUPPORTED_PATTERNS {
            assert!(message.contains(pattern), "missing {pattern}");
        }
    }

    #[test]
    fn warning_display_names_field() {
        let warning = InsufficientDataWarning::new(
            &ProjectKey::new("Alpha"),
            MissingField::EndDate,
            "cannot shift end date",
        );
        assert_eq!(
            warning.to_string(),
            "insufficient data for 'alpha': end_date (cannot shift end date)"
        );
    }
}
