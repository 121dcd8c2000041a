//! Scenario text parser
//!
//! Recognises exactly five shapes, case-insensitively:
//!
//! 1. `increase|decrease <project> budget by <N>%`
//! 2. `increase|decrease <project> budget by £|$|€<N>`
//! 3. `cut|reduce <project> scope by <N>%`
//! 4. `delay|postpone <project> by <N> weeks|months|quarters`
//! 5. `remove|cancel <project>`
//!
//! The `<project>` slot is resolved against the known project names by
//! longest-match-first, word-bounded substring search, so "delay the Data
//! Platform project by 2 weeks" finds "Data Platform" and never "Data".

use crate::action::{
    Action, BudgetAdjustment, BudgetDirection, Currency, DelayDuration, DurationUnit,
    ScenarioAction,
};
use crate::error::ScenarioError;
use once_cell::sync::Lazy;
use pmo_model::key::normalize;
use pmo_model::ProjectKey;
use regex::{Captures, Regex};

/// Largest scope cut, in percent
const MAX_SCOPE_CUT_PCT: f64 = 100.0;

/// Magnitude token; signs and separators are accepted so that bad values
/// surface as invalid magnitudes rather than unrecognised text
const MAGNITUDE: &str = r"(?P<magnitude>[-+]?[\d.,]+)";

static BUDGET_PERCENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<verb>increase|decrease)\s+(?P<project>.+?)\s+budget\s+by\s+{MAGNITUDE}\s*%$"
    ))
    .expect("budget percent pattern is a valid regex")
});

static BUDGET_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<verb>increase|decrease)\s+(?P<project>.+?)\s+budget\s+by\s+(?P<sign>[-+]?)\s*(?P<currency>[£$€])\s*{MAGNITUDE}$"
    ))
    .expect("budget amount pattern is a valid regex")
});

static SCOPE_CUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:cut|reduce)\s+(?P<project>.+?)\s+scope\s+by\s+{MAGNITUDE}\s*%$"
    ))
    .expect("scope cut pattern is a valid regex")
});

static DELAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:delay|postpone)\s+(?P<project>.+?)\s+by\s+{MAGNITUDE}\s*(?P<unit>weeks?|months?|quarters?)$"
    ))
    .expect("delay pattern is a valid regex")
});

static REMOVAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:remove|cancel)\s+(?P<project>.+)$")
        .expect("removal pattern is a valid regex")
});

/// Parses scenario text into a [`ScenarioAction`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionParser;

impl ActionParser {
    /// Create parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse `text` against the display names in `known_projects`
    ///
    /// # Errors
    /// - [`ScenarioError::UnrecognizedScenario`] if no shape matches
    /// - [`ScenarioError::UnknownProject`] if the name slot holds no known project
    /// - [`ScenarioError::AmbiguousProject`] if it holds more than one
    /// - [`ScenarioError::InvalidMagnitude`] for zero, negative, unparseable
    ///   or out-of-range magnitudes
    pub fn parse<'a>(
        &self,
        text: &str,
        known_projects: impl IntoIterator<Item = &'a str>,
    ) -> Result<ScenarioAction, ScenarioError> {
        let cleaned = clean(text);
        let unrecognized = || ScenarioError::UnrecognizedScenario {
            text: text.to_string(),
        };
        if cleaned.is_empty() {
            return Err(unrecognized());
        }

        let (caps, shape) = match_shape(&cleaned).ok_or_else(unrecognized)?;
        let (target_name, target) = resolve(&caps["project"], known_projects)?;
        let action = build_action(text, &caps, shape)?;

        tracing::debug!(
            "Parsed scenario '{}' as {} on {}",
            text,
            action.label(),
            target.as_str()
        );
        Ok(ScenarioAction {
            target,
            target_name,
            action,
            source_text: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    BudgetPercent,
    BudgetAmount,
    ScopeCut,
    Delay,
    Removal,
}

/// Collapse whitespace and drop trailing sentence punctuation
fn clean(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(['.', '!'])
        .trim_end()
        .to_string()
}

fn match_shape(text: &str) -> Option<(Captures<'_>, Shape)> {
    let shapes: [(&Lazy<Regex>, Shape); 5] = [
        (&BUDGET_PERCENT, Shape::BudgetPercent),
        (&BUDGET_AMOUNT, Shape::BudgetAmount),
        (&SCOPE_CUT, Shape::ScopeCut),
        (&DELAY, Shape::Delay),
        (&REMOVAL, Shape::Removal),
    ];
    shapes
        .into_iter()
        .find_map(|(pattern, shape)| pattern.captures(text).map(|caps| (caps, shape)))
}

fn build_action(text: &str, caps: &Captures<'_>, shape: Shape) -> Result<Action, ScenarioError> {
    let invalid = |magnitude: &str, reason: &str| ScenarioError::InvalidMagnitude {
        text: text.to_string(),
        magnitude: magnitude.to_string(),
        reason: reason.to_string(),
    };
    let direction = || match caps.name("verb").map(|m| m.as_str().to_ascii_lowercase()) {
        Some(verb) if verb == "decrease" => BudgetDirection::Decrease,
        _ => BudgetDirection::Increase,
    };

    match shape {
        Shape::BudgetPercent => {
            let raw = &caps["magnitude"];
            let pct = parse_positive(raw, false).map_err(|reason| invalid(raw, reason))?;
            Ok(Action::BudgetChange {
                adjustment: BudgetAdjustment::Percent(pct),
                direction: direction(),
            })
        }
        Shape::BudgetAmount => {
            let raw = format!("{}{}", &caps["sign"], &caps["magnitude"]);
            let written = format!("{}{}{}", &caps["sign"], &caps["currency"], &caps["magnitude"]);
            let amount = parse_positive(&raw, true).map_err(|reason| invalid(&written, reason))?;
            let currency = caps["currency"]
                .chars()
                .next()
                .and_then(Currency::from_symbol)
                .ok_or_else(|| invalid(&written, "unsupported currency"))?;
            Ok(Action::BudgetChange {
                adjustment: BudgetAdjustment::Amount { currency, amount },
                direction: direction(),
            })
        }
        Shape::ScopeCut => {
            let raw = &caps["magnitude"];
            let percent = parse_positive(raw, false).map_err(|reason| invalid(raw, reason))?;
            if percent > MAX_SCOPE_CUT_PCT {
                return Err(invalid(raw, "scope cut cannot exceed 100%"));
            }
            Ok(Action::ScopeCut { percent })
        }
        Shape::Delay => {
            let raw = &caps["magnitude"];
            let count = parse_count(raw).map_err(|reason| invalid(raw, reason))?;
            let unit = DurationUnit::from_word(&caps["unit"])
                .ok_or_else(|| invalid(raw, "unsupported duration unit"))?;
            Ok(Action::Delay {
                duration: DelayDuration::new(count, unit),
            })
        }
        Shape::Removal => Ok(Action::Removal),
    }
}

/// Parse a strictly positive, finite number
fn parse_positive(raw: &str, thousands: bool) -> Result<f64, &'static str> {
    let digits = if thousands {
        raw.replace(',', "")
    } else {
        raw.to_string()
    };
    let value: f64 = digits.parse().map_err(|_| "not a number")?;
    if !value.is_finite() {
        return Err("not a finite number");
    }
    if value <= 0.0 {
        return Err("must be greater than zero");
    }
    Ok(value)
}

/// Parse a strictly positive whole count
fn parse_count(raw: &str) -> Result<u32, &'static str> {
    let value = parse_positive(raw, false)?;
    if value.fract() != 0.0 {
        return Err("must be a whole number");
    }
    raw.trim_start_matches('+')
        .parse::<u32>()
        .map_err(|_| "too large")
}

/// Resolve the name slot to a known project
///
/// Names are tried longest first; a match must sit on word boundaries
/// inside the slot. A slot that still names another project once the match
/// is blanked out is ambiguous.
fn resolve<'a>(
    slot: &str,
    known_projects: impl IntoIterator<Item = &'a str>,
) -> Result<(String, ProjectKey), ScenarioError> {
    let mut known: Vec<(&str, ProjectKey)> = known_projects
        .into_iter()
        .map(|name| (name, ProjectKey::new(name)))
        .filter(|(_, key)| !key.is_blank())
        .collect();
    known.sort_by_key(|(_, key)| std::cmp::Reverse(key.as_str().len()));

    let haystack = normalize(slot);
    let Some((name, key)) = known
        .iter()
        .find(|(_, key)| contains_word(&haystack, key.as_str()))
    else {
        let mut names: Vec<String> = known.iter().map(|(name, _)| (*name).to_string()).collect();
        names.sort();
        return Err(ScenarioError::UnknownProject {
            name: slot.trim().to_string(),
            known: names,
        });
    };

    let rest = blank_word(&haystack, key.as_str());
    let others: Vec<String> = known
        .iter()
        .filter(|(_, other)| other != key && contains_word(&rest, other.as_str()))
        .map(|(other, _)| (*other).to_string())
        .collect();
    if !others.is_empty() {
        return Err(ScenarioError::AmbiguousProject {
            name: slot.trim().to_string(),
            matches: std::iter::once((*name).to_string()).chain(others).collect(),
        });
    }

    Ok(((*name).to_string(), key.clone()))
}

/// True if `needle` occurs in `haystack` with non-alphanumeric neighbours
fn contains_word(haystack: &str, needle: &str) -> bool {
    word_matches(haystack, needle).next().is_some()
}

/// `haystack` with every word-bounded `needle` replaced by spaces
fn blank_word(haystack: &str, needle: &str) -> String {
    let mut out = haystack.to_string();
    for start in word_matches(haystack, needle) {
        out.replace_range(start..start + needle.len(), &" ".repeat(needle.len()));
    }
    out
}

/// Byte offsets of word-bounded occurrences of `needle`
fn word_matches<'h>(haystack: &'h str, needle: &'h str) -> impl Iterator<Item = usize> + 'h {
    haystack.match_indices(needle).filter_map(move |(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        let bounded = before.map_or(true, |c| !c.is_alphanumeric())
            && after.map_or(true, |c| !c.is_alphanumeric());
        bounded.then_some(start)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const KNOWN: &[&str] = &["Alpha", "Beta", "Data Platform", "Data", "Project Phoenix"];

    fn parse(text: &str) -> Result<ScenarioAction, ScenarioError> {
        ActionParser::new().parse(text, KNOWN.iter().copied())
    }

    fn action(text: &str) -> Action {
        parse(text).unwrap().action
    }

    #[test]
    fn parses_budget_percent() {
        assert_eq!(
            action("increase Alpha budget by 20%"),
            Action::BudgetChange {
                adjustment: BudgetAdjustment::Percent(20.0),
                direction: BudgetDirection::Increase,
            }
        );
        assert_eq!(
            action("Decrease   BETA budget by 12.5 %."),
            Action::BudgetChange {
                adjustment: BudgetAdjustment::Percent(12.5),
                direction: BudgetDirection::Decrease,
            }
        );
    }

    #[test]
    fn parses_budget_amount_with_separators() {
        assert_eq!(
            action("decrease Alpha budget by £50,000"),
            Action::BudgetChange {
                adjustment: BudgetAdjustment::Amount {
                    currency: Currency::Gbp,
                    amount: 50_000.0,
                },
                direction: BudgetDirection::Decrease,
            }
        );
        assert_eq!(
            action("increase project Beta budget by €1,250.50!"),
            Action::BudgetChange {
                adjustment: BudgetAdjustment::Amount {
                    currency: Currency::Eur,
                    amount: 1_250.5,
                },
                direction: BudgetDirection::Increase,
            }
        );
    }

    #[test]
    fn parses_scope_cut() {
        assert_eq!(action("cut Beta scope by 30%"), Action::ScopeCut { percent: 30.0 });
        assert_eq!(action("reduce Beta scope by 100%"), Action::ScopeCut { percent: 100.0 });
    }

    #[test]
    fn parses_delay_units() {
        assert_eq!(
            action("delay Alpha by 2 months"),
            Action::Delay {
                duration: DelayDuration::new(2, DurationUnit::Month),
            }
        );
        assert_eq!(
            action("postpone Beta by 1 quarter"),
            Action::Delay {
                duration: DelayDuration::new(1, DurationUnit::Quarter),
            }
        );
    }

    #[test]
    fn parses_removal_and_keeps_source_text() {
        let parsed = parse("  Cancel project Beta ").unwrap();
        assert_eq!(parsed.action, Action::Removal);
        assert_eq!(parsed.target, ProjectKey::new("beta"));
        assert_eq!(parsed.target_name, "Beta");
        assert_eq!(parsed.source_text, "  Cancel project Beta ");
    }

    #[test]
    fn resolves_longest_name_first() {
        let parsed = parse("delay the Data Platform project by 2 weeks").unwrap();
        assert_eq!(parsed.target_name, "Data Platform");

        let parsed = parse("remove Data").unwrap();
        assert_eq!(parsed.target_name, "Data");

        let parsed = parse("remove project Phoenix").unwrap();
        assert_eq!(parsed.target_name, "Project Phoenix");
    }

    #[test]
    fn names_must_sit_on_word_boundaries() {
        let err = parse("remove Alphabet").unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownProject { ref name, .. } if name == "Alphabet"));
    }

    #[test]
    fn two_projects_in_the_slot_are_ambiguous() {
        match parse("remove Alpha and Beta").unwrap_err() {
            ScenarioError::AmbiguousProject { name, matches } => {
                assert_eq!(name, "Alpha and Beta");
                assert_eq!(matches, vec!["Alpha".to_string(), "Beta".to_string()]);
            }
            other => panic!("expected AmbiguousProject, got {other:?}"),
        }

        // A shorter name inside the match is not a second project.
        assert_eq!(parse("cut Data Platform scope by 10%").unwrap().target_name, "Data Platform");
    }

    #[test]
    fn unknown_project_lists_known_names() {
        match parse("delay Zeta by 1 week").unwrap_err() {
            ScenarioError::UnknownProject { name, known } => {
                assert_eq!(name, "Zeta");
                assert!(known.contains(&"Alpha".to_string()));
            }
            other => panic!("expected UnknownProject, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_shapes_are_unrecognized() {
        for text in [
            "",
            "   ",
            "make Alpha faster",
            "delay Alpha by 2 years",
            "increase Alpha budget by 20",
            "increase Alpha scope by 10%",
            "cut Alpha budget by 10%",
        ] {
            let err = parse(text).unwrap_err();
            assert!(
                matches!(err, ScenarioError::UnrecognizedScenario { .. }),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_magnitudes() {
        for text in [
            "increase Alpha budget by 0%",
            "increase Alpha budget by -20%",
            "decrease Alpha budget by £0",
            "decrease Alpha budget by -£500",
            "cut Beta scope by 150%",
            "cut Beta scope by 1.2.3%",
            "delay Alpha by 0 weeks",
            "delay Alpha by 1.5 months",
        ] {
            let err = parse(text).unwrap_err();
            assert!(
                matches!(err, ScenarioError::InvalidMagnitude { .. }),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn invalid_magnitude_reports_value_and_reason() {
        match parse("cut Beta scope by 150%").unwrap_err() {
            ScenarioError::InvalidMagnitude {
                magnitude, reason, ..
            } => {
                assert_eq!(magnitude, "150");
                assert!(reason.contains("100%"));
            }
            other => panic!("expected InvalidMagnitude, got {other:?}"),
        }
    }
}
