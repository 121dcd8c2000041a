//! Per-project simulators
//!
//! [`simulate`] maps a baseline [`ProjectState`] and an [`Action`] to a new
//! state plus a [`Delta`] describing the change. Simulators are pure: the
//! baseline is borrowed, never written.
//!
//! Missing inputs never fail a simulation. The affected part of the delta is
//! left unchanged, the delta is marked `insufficient_data`, and an
//! [`InsufficientDataWarning`] says which field was missing.

use crate::action::{format_money, Action, BudgetAdjustment, BudgetDirection, DelayDuration};
use crate::config::{ScenarioConfig, Thresholds, DAYS_PER_WEEK};
use crate::error::{InsufficientDataWarning, MissingField};
use chrono::{Days, NaiveDate};
use pmo_model::{Lifecycle, ProjectState};
use serde::{Deserialize, Serialize};

/// Inputs every simulator shares
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationContext {
    /// Numeric thresholds
    pub thresholds: Thresholds,
    /// "Today" for runway calculations
    pub reference_date: NaiveDate,
}

impl SimulationContext {
    /// Create context
    #[inline]
    #[must_use]
    pub fn new(thresholds: Thresholds, reference_date: NaiveDate) -> Self {
        Self {
            thresholds,
            reference_date,
        }
    }

    /// Context for a configuration, resolving the reference date
    #[must_use]
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self::new(config.thresholds, config.effective_reference_date())
    }
}

/// Budget change on the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDelta {
    /// Baseline budget
    pub budget_before: Option<f64>,
    /// New budget, floored at zero
    pub budget_after: Option<f64>,
    /// Signed change actually applied
    pub change: f64,
    /// Spend over baseline budget
    pub burn_rate_before: Option<f64>,
    /// Spend over new budget
    pub burn_rate_after: Option<f64>,
    /// Spend to date fits inside the new budget
    pub still_within_budget: Option<bool>,
    /// Weeks of baseline budget left at the current burn
    pub runway_weeks_before: Option<i64>,
    /// Weeks of new budget left at the current burn
    pub runway_weeks_after: Option<i64>,
    /// Required input was missing
    pub insufficient_data: bool,
}

/// Scope cut on the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeDelta {
    /// Baseline scope percentage
    pub scope_before: f64,
    /// New scope percentage, floored at zero
    pub scope_after: f64,
    /// Baseline end date
    pub end_before: Option<NaiveDate>,
    /// New end date
    pub end_after: Option<NaiveDate>,
    /// Days the end date moved in
    pub days_earlier: i64,
    /// Required input was missing
    pub insufficient_data: bool,
}

/// Delay of the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayDelta {
    /// Delay as parsed
    pub duration: DelayDuration,
    /// Delay in days
    pub days: i64,
    /// Baseline end date
    pub end_before: Option<NaiveDate>,
    /// New end date
    pub end_after: Option<NaiveDate>,
    /// Required input was missing
    pub insufficient_data: bool,
}

/// Removal of the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalDelta {
    /// Lifecycle before removal
    pub lifecycle_before: Lifecycle,
    /// Unspent budget released
    pub freed_budget: f64,
    /// Required input was missing
    pub insufficient_data: bool,
}

/// What a simulator changed on the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delta {
    /// Budget change
    Budget(BudgetDelta),
    /// Scope cut
    Scope(ScopeDelta),
    /// Delay
    Delay(DelayDelta),
    /// Removal
    Removal(RemovalDelta),
}

impl Delta {
    /// True if part of the delta could not be computed
    #[must_use]
    pub fn insufficient_data(&self) -> bool {
        match self {
            Self::Budget(d) => d.insufficient_data,
            Self::Scope(d) => d.insufficient_data,
            Self::Delay(d) => d.insufficient_data,
            Self::Removal(d) => d.insufficient_data,
        }
    }
}

/// Result of simulating one action on one project
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// New project state
    pub state: ProjectState,
    /// Change description
    pub delta: Delta,
    /// Missing-data notices
    pub warnings: Vec<InsufficientDataWarning>,
    /// Human-readable alerts (over budget, shorter runway, burn rate)
    pub alerts: Vec<String>,
}

/// Apply `action` to `state`
#[must_use]
pub fn simulate(state: &ProjectState, action: &Action, ctx: &SimulationContext) -> SimulationOutcome {
    let outcome = match action {
        Action::BudgetChange {
            adjustment,
            direction,
        } => simulate_budget(state, adjustment, *direction, ctx),
        Action::ScopeCut { percent } => simulate_scope_cut(state, *percent),
        Action::Delay { duration } => simulate_delay(state, *duration, &ctx.thresholds),
        Action::Removal => simulate_removal(state),
    };

    for warning in &outcome.warnings {
        tracing::warn!("{}", warning);
    }
    outcome
}

fn simulate_budget(
    state: &ProjectState,
    adjustment: &BudgetAdjustment,
    direction: BudgetDirection,
    ctx: &SimulationContext,
) -> SimulationOutcome {
    let Some(before) = state.budget else {
        return SimulationOutcome {
            state: state.clone(),
            delta: Delta::Budget(BudgetDelta {
                budget_before: None,
                budget_after: None,
                change: 0.0,
                burn_rate_before: None,
                burn_rate_after: None,
                still_within_budget: None,
                runway_weeks_before: None,
                runway_weeks_after: None,
                insufficient_data: true,
            }),
            warnings: vec![InsufficientDataWarning::new(
                &state.key,
                MissingField::Budget,
                "no baseline budget to adjust",
            )],
            alerts: Vec::new(),
        };
    };

    let magnitude = adjustment.magnitude_for(before);
    let after = match direction {
        BudgetDirection::Increase => before + magnitude,
        BudgetDirection::Decrease => (before - magnitude).max(0.0),
    };

    let mut next = state.clone();
    next.budget = Some(after);

    let spend = state.spend_or_zero();
    let still_within_budget = spend <= after;
    let burn_rate_after = next.burn_rate();
    let runway_before = runway_weeks(state, ctx.reference_date);
    let runway_after = runway_weeks(&next, ctx.reference_date);

    let mut alerts = Vec::new();
    if !still_within_budget {
        alerts.push(format!(
            "New budget for {} ({}) is below actual spend ({}); the project is over budget",
            state.name,
            format_money(after),
            format_money(spend)
        ));
    }
    if direction == BudgetDirection::Decrease {
        if let (Some(was), Some(now)) = (runway_before, runway_after) {
            if now < was {
                alerts.push(format!(
                    "Budget decrease reduces {} runway from {was} to {now} weeks",
                    state.name
                ));
            }
        }
    }
    if let Some(rate) = burn_rate_after {
        if rate > ctx.thresholds.burn_rate_alert {
            alerts.push(format!(
                "{} burn rate {:.0}% exceeds the {:.0}% alert threshold",
                state.name,
                rate * 100.0,
                ctx.thresholds.burn_rate_alert * 100.0
            ));
        }
    }

    SimulationOutcome {
        delta: Delta::Budget(BudgetDelta {
            budget_before: Some(before),
            budget_after: Some(after),
            change: after - before,
            burn_rate_before: state.burn_rate(),
            burn_rate_after,
            still_within_budget: Some(still_within_budget),
            runway_weeks_before: runway_before,
            runway_weeks_after: runway_after,
            insufficient_data: false,
        }),
        state: next,
        warnings: Vec::new(),
        alerts,
    }
}

fn simulate_scope_cut(state: &ProjectState, percent: f64) -> SimulationOutcome {
    let scope_before = state.scope_pct;
    let scope_after = (scope_before - percent).max(0.0);

    let mut next = state.clone();
    next.scope_pct = scope_after;

    let mut warnings = Vec::new();
    let mut end_after = state.end_date;

    let missing = match (state.start_date, state.end_date, state.duration_days()) {
        (None, _, _) => Some((MissingField::StartDate, "no start date to scale the schedule from")),
        (_, None, _) => Some((MissingField::EndDate, "no end date to pull in")),
        (_, _, None) => Some((MissingField::Duration, "end date is before start date")),
        _ if scope_before <= 0.0 => Some((MissingField::Scope, "no remaining scope to scale by")),
        _ => None,
    };

    match (missing, state.start_date, state.duration_days()) {
        (None, Some(start), Some(duration)) => {
            let scaled = scale_days(duration, scope_after, scope_before);
            end_after = start.checked_add_days(Days::new(scaled.unsigned_abs())).or(state.end_date);
            next.end_date = end_after;
        }
        (Some((field, detail)), _, _) => {
            warnings.push(InsufficientDataWarning::new(&state.key, field, detail));
        }
        _ => {}
    }

    let days_earlier = match (state.end_date, end_after) {
        (Some(was), Some(now)) => (was - now).num_days(),
        _ => 0,
    };

    SimulationOutcome {
        delta: Delta::Scope(ScopeDelta {
            scope_before,
            scope_after,
            end_before: state.end_date,
            end_after,
            days_earlier,
            insufficient_data: !warnings.is_empty(),
        }),
        state: next,
        warnings,
        alerts: Vec::new(),
    }
}

/// `days * new / old` rounded down and clamped to `0..=days`
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale_days(days: i64, new: f64, old: f64) -> i64 {
    let scaled = (days as f64 * new / old).floor() as i64;
    scaled.clamp(0, days)
}

fn simulate_delay(
    state: &ProjectState,
    duration: DelayDuration,
    thresholds: &Thresholds,
) -> SimulationOutcome {
    let days = duration.days(thresholds);
    let mut next = state.clone();
    let mut warnings = Vec::new();

    let end_after = match shift(state.end_date, days) {
        Ok(moved) => Some(moved),
        Err(err) => {
            let detail = match err {
                ShiftError::Missing => "no end date to delay".to_string(),
                ShiftError::OutOfRange => {
                    format!("delay of {days} days moves the end date out of range")
                }
            };
            warnings.push(InsufficientDataWarning::new(
                &state.key,
                MissingField::EndDate,
                detail,
            ));
            state.end_date
        }
    };
    next.end_date = end_after;

    SimulationOutcome {
        delta: Delta::Delay(DelayDelta {
            duration,
            days,
            end_before: state.end_date,
            end_after,
            insufficient_data: !warnings.is_empty(),
        }),
        state: next,
        warnings,
        alerts: Vec::new(),
    }
}

fn simulate_removal(state: &ProjectState) -> SimulationOutcome {
    let mut next = state.clone();
    next.lifecycle = Lifecycle::Removed;

    let mut warnings = Vec::new();
    // Budget of an already removed project was released by the first removal.
    let freed_budget = if state.is_removed() {
        0.0
    } else if let Some(remaining) = state.remaining_budget() {
        remaining
    } else {
        warnings.push(InsufficientDataWarning::new(
            &state.key,
            MissingField::Budget,
            "no budget to release",
        ));
        0.0
    };

    SimulationOutcome {
        delta: Delta::Removal(RemovalDelta {
            lifecycle_before: state.lifecycle,
            freed_budget,
            insufficient_data: !warnings.is_empty(),
        }),
        state: next,
        warnings,
        alerts: Vec::new(),
    }
}

/// Why a date could not be moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShiftError {
    /// No date to move
    Missing,
    /// Result falls outside the representable calendar
    OutOfRange,
}

/// Move a date by a signed number of days
pub(crate) fn shift(date: Option<NaiveDate>, days: i64) -> Result<NaiveDate, ShiftError> {
    let date = date.ok_or(ShiftError::Missing)?;
    let step = Days::new(days.unsigned_abs());
    let moved = if days >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    };
    moved.ok_or(ShiftError::OutOfRange)
}

/// Weeks of unspent budget left at the average daily burn since start
///
/// `None` without a positive budget, positive spend and a start date.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn runway_weeks(state: &ProjectState, reference_date: NaiveDate) -> Option<i64> {
    let budget = state.budget.filter(|b| *b > 0.0)?;
    let spend = state.actual_spend.filter(|s| *s > 0.0)?;
    let start = state.start_date?;

    let elapsed_days = (reference_date - start).num_days().max(1);
    let daily_burn = spend / elapsed_days as f64;
    let remaining = budget - spend;
    if remaining <= 0.0 {
        return Some(0);
    }
    Some((remaining / daily_burn / DAYS_PER_WEEK as f64).floor() as i64)
}
