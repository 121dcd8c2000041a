//! Normalised project identity
//!
//! Project names arrive from spreadsheets and exports with inconsistent case
//! and spacing. [`ProjectKey`] is the normalised form used for every lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalised project identifier
///
/// Lowercased, trimmed, with internal whitespace runs collapsed to a single
/// space. Two names that normalise to the same key are the same project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Normalise a display name into a key
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(normalize(name))
    }

    /// Normalised text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the name normalised to nothing
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Lowercase and collapse whitespace
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}
