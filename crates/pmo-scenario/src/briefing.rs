//! Plain-text scenario briefing
//!
//! Renders a [`ScenarioResult`] as short titled sections for terminal
//! output. Narrative generation proper happens elsewhere.

use crate::action::{format_money, Action};
use crate::result::ScenarioResult;
use crate::simulate::Delta;
use chrono::NaiveDate;
use pmo_graph::ImpactKind;
use pmo_model::ProjectState;
use std::fmt;

/// Sectioned summary of one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Briefing {
    /// One-line title
    pub title: String,
    /// Scenario text as given
    pub scenario: String,
    /// Target state before the change
    pub before: Vec<String>,
    /// What changed on the target
    pub after: Vec<String>,
    /// One line per dependent
    pub cascade: Vec<String>,
    /// Warnings and missing-data notices
    pub warnings: Vec<String>,
}

impl Briefing {
    /// Build briefing from a result
    #[must_use]
    pub fn from_result(result: &ScenarioResult) -> Self {
        let action = result.action();
        let target = result.target();

        let mut warnings: Vec<String> = result.warnings().to_vec();
        warnings.extend(target.warnings.iter().map(ToString::to_string));
        for dependent in result.dependents() {
            warnings.extend(dependent.warnings.iter().map(ToString::to_string));
        }

        let mut after = delta_lines(&target.delta);
        if result.freed_budget() > 0.0 {
            after.push(format!("Freed budget: {}", format_money(result.freed_budget())));
        }
        if result.consumed_budget() > 0.0 {
            after.push(format!("Additional budget: {}", format_money(result.consumed_budget())));
        }

        Self {
            title: format!("Scenario: {action}"),
            scenario: action.source_text.clone(),
            before: state_lines(&target.before),
            after,
            cascade: result
                .dependents()
                .iter()
                .map(|d| {
                    let detail = match d.impact {
                        ImpactKind::BrokenDependency => {
                            format!("loses dependency on {}", action.target_name)
                        }
                        ImpactKind::CascadingDelay { days } => format!(
                            "delayed {days} days (end {} -> {})",
                            fmt_date(d.before.end_date),
                            fmt_date(d.after.end_date)
                        ),
                        ImpactKind::EarlierAvailability { days_earlier } => format!(
                            "dependency available {days_earlier} days earlier"
                        ),
                    };
                    format!("{} [{}]: {detail}", d.name(), d.impact.label())
                })
                .collect(),
            warnings,
        }
        .with_empty_cascade_note(&action.action)
    }

    fn with_empty_cascade_note(mut self, action: &Action) -> Self {
        if self.cascade.is_empty() {
            let note = match action {
                Action::BudgetChange { .. } => "Budget changes do not cascade to dependents",
                _ => "No dependent projects affected",
            };
            self.cascade.push(note.to_string());
        }
        self
    }

    /// Rendered text
    #[must_use]
    pub fn full_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Briefing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "Scenario: {}", self.scenario.trim())?;

        let sections = [
            ("Before", &self.before),
            ("After", &self.after),
            ("Cascade", &self.cascade),
            ("Warnings", &self.warnings),
        ];
        for (heading, lines) in sections {
            if lines.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{heading}:")?;
            for line in lines {
                writeln!(f, "  - {line}")?;
            }
        }
        Ok(())
    }
}

fn state_lines(state: &ProjectState) -> Vec<String> {
    vec![
        format!("Project: {}", state.name),
        format!("Budget: {}", fmt_money(state.budget)),
        format!("Actual spend: {}", fmt_money(state.actual_spend)),
        format!(
            "Schedule: {} to {}",
            fmt_date(state.start_date),
            fmt_date(state.end_date)
        ),
        format!("Scope: {:.0}%", state.scope_pct),
    ]
}

fn delta_lines(delta: &Delta) -> Vec<String> {
    match delta {
        Delta::Budget(d) => {
            let mut lines = vec![format!(
                "Budget: {} -> {}",
                fmt_money(d.budget_before),
                fmt_money(d.budget_after)
            )];
            if let (Some(was), Some(now)) = (d.burn_rate_before, d.burn_rate_after) {
                lines.push(format!("Burn rate: {:.0}% -> {:.0}%", was * 100.0, now * 100.0));
            }
            if let Some(within) = d.still_within_budget {
                lines.push(format!("Within budget: {}", if within { "yes" } else { "no" }));
            }
            lines.push(format!(
                "Runway: {} -> {} weeks",
                fmt_opt(d.runway_weeks_before),
                fmt_opt(d.runway_weeks_after)
            ));
            lines
        }
        Delta::Scope(d) => vec![
            format!("Scope: {:.0}% -> {:.0}%", d.scope_before, d.scope_after),
            format!(
                "End date: {} -> {} ({} days earlier)",
                fmt_date(d.end_before),
                fmt_date(d.end_after),
                d.days_earlier
            ),
        ],
        Delta::Delay(d) => vec![format!(
            "End date: {} -> {} (+{} days)",
            fmt_date(d.end_before),
            fmt_date(d.end_after),
            d.days
        )],
        Delta::Removal(_) => vec!["Status: Removed".to_string()],
    }
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "N/A".to_string(), |d| d.to_string())
}

fn fmt_money(amount: Option<f64>) -> String {
    amount.map_or_else(|| "N/A".to_string(), format_money)
}

fn fmt_opt(value: Option<i64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}
