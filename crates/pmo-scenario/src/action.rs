//! Scenario actions
//!
//! [`Action`] is a closed set: every simulator and cascade rule matches on
//! it exhaustively, so a new kind of action is a compile error everywhere it
//! needs handling.

use crate::config::{Thresholds, DAYS_PER_WEEK};
use pmo_model::ProjectKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a budget change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetDirection {
    /// Add to the budget
    Increase,
    /// Take from the budget
    Decrease,
}

/// Currency symbol of an absolute budget amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// Pound sterling (£)
    Gbp,
    /// US dollar ($)
    Usd,
    /// Euro (€)
    Eur,
}

impl Currency {
    /// Currency for a leading symbol
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '£' => Some(Self::Gbp),
            '$' => Some(Self::Usd),
            '€' => Some(Self::Eur),
            _ => None,
        }
    }

    /// Symbol as written in scenario text
    #[must_use]
    pub fn symbol(&self) -> char {
        match self {
            Self::Gbp => '£',
            Self::Usd => '$',
            Self::Eur => '€',
        }
    }
}

/// Size of a budget change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAdjustment {
    /// Percentage of the baseline budget
    Percent(f64),
    /// Absolute amount
    Amount {
        /// Currency written in the scenario
        currency: Currency,
        /// Positive amount
        amount: f64,
    },
}

impl BudgetAdjustment {
    /// Unsigned change for a given baseline budget
    #[must_use]
    pub fn magnitude_for(&self, baseline: f64) -> f64 {
        match self {
            Self::Percent(pct) => baseline * pct / 100.0,
            Self::Amount { amount, .. } => *amount,
        }
    }
}

impl fmt::Display for BudgetAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(pct) => write!(f, "{}%", format_number(*pct)),
            Self::Amount { currency, amount } => {
                write!(f, "{}{}", currency.symbol(), format_money(*amount))
            }
        }
    }
}

/// Calendar unit of a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    /// Seven days
    Week,
    /// `weeks_per_month` weeks
    Month,
    /// `weeks_per_quarter` weeks
    Quarter,
}

impl DurationUnit {
    /// Parse singular or plural unit word
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().trim_end_matches('s') {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "quarter" => Some(Self::Quarter),
            _ => None,
        }
    }

    /// Weeks in one unit
    #[must_use]
    pub fn weeks(&self, thresholds: &Thresholds) -> i64 {
        match self {
            Self::Week => 1,
            Self::Month => i64::from(thresholds.weeks_per_month),
            Self::Quarter => i64::from(thresholds.weeks_per_quarter),
        }
    }

    fn word(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }
}

/// Length of a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelayDuration {
    /// Number of units (at least 1)
    pub count: u32,
    /// Unit
    pub unit: DurationUnit,
}

impl DelayDuration {
    /// Create duration
    #[inline]
    #[must_use]
    pub fn new(count: u32, unit: DurationUnit) -> Self {
        Self { count, unit }
    }

    /// Length in weeks
    #[must_use]
    pub fn weeks(&self, thresholds: &Thresholds) -> i64 {
        i64::from(self.count) * self.unit.weeks(thresholds)
    }

    /// Length in days
    #[must_use]
    pub fn days(&self, thresholds: &Thresholds) -> i64 {
        self.weeks(thresholds) * DAYS_PER_WEEK
    }
}

impl fmt::Display for DelayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.count == 1 { "" } else { "s" };
        write!(f, "{} {}{}", self.count, self.unit.word(), plural)
    }
}

/// Hypothetical change to one project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Budget moves up or down
    BudgetChange {
        /// Size of the change
        adjustment: BudgetAdjustment,
        /// Up or down
        direction: BudgetDirection,
    },
    /// Remaining scope shrinks by a percentage
    ScopeCut {
        /// Percentage points removed (0 < p <= 100)
        percent: f64,
    },
    /// End date moves later
    Delay {
        /// How much later
        duration: DelayDuration,
    },
    /// Project leaves the portfolio
    Removal,
}

impl Action {
    /// Stable snake_case label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::BudgetChange {
                direction: BudgetDirection::Increase,
                ..
            } => "budget_increase",
            Self::BudgetChange {
                direction: BudgetDirection::Decrease,
                ..
            } => "budget_decrease",
            Self::ScopeCut { .. } => "scope_cut",
            Self::Delay { .. } => "delay",
            Self::Removal => "removal",
        }
    }
}

/// Action bound to its target project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAction {
    /// Target identity
    pub target: ProjectKey,
    /// Target display name from the snapshot
    pub target_name: String,
    /// What happens to the target
    pub action: Action,
    /// Scenario text as given
    pub source_text: String,
}

impl ScenarioAction {
    /// Bind an action to a named project
    #[must_use]
    pub fn new(target_name: impl Into<String>, action: Action) -> Self {
        let target_name = target_name.into();
        Self {
            target: ProjectKey::new(&target_name),
            source_text: String::new(),
            target_name,
            action,
        }
    }

    /// With original scenario text
    #[inline]
    #[must_use]
    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = text.into();
        self
    }
}

impl fmt::Display for ScenarioAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.target_name;
        match &self.action {
            Action::BudgetChange {
                adjustment,
                direction,
            } => {
                let verb = match direction {
                    BudgetDirection::Increase => "Increase",
                    BudgetDirection::Decrease => "Decrease",
                };
                write!(f, "{verb} {name} budget by {adjustment}")
            }
            Action::ScopeCut { percent } => {
                write!(f, "Cut {name} scope by {}%", format_number(*percent))
            }
            Action::Delay { duration } => write!(f, "Delay {name} by {duration}"),
            Action::Removal => write!(f, "Remove {name}"),
        }
    }
}

/// Whole currency units with thousands separators
#[must_use]
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Number without a trailing `.0`
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
