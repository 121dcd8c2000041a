//! Thresholds and engine configuration
//!
//! Every magnitude threshold the engine uses is a named constant here.
//! [`Thresholds`] is the single override point; [`ScenarioConfig`] wraps it
//! together with the reference date used for runway calculations.

use crate::error::ConfigError;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Burn rate above which a budget change raises an alert
pub const DEFAULT_BURN_RATE_ALERT: f64 = 0.90;

/// Weeks counted for one month of delay
pub const DEFAULT_WEEKS_PER_MONTH: u32 = 4;

/// Weeks counted for one quarter of delay
pub const DEFAULT_WEEKS_PER_QUARTER: u32 = 13;

/// Cascade hop limit (`None` = unbounded)
pub const DEFAULT_MAX_CASCADE_DEPTH: Option<usize> = None;

/// Days in a week
pub const DAYS_PER_WEEK: i64 = 7;

/// Numeric thresholds used by parsing, simulation and cascade resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Spend/budget ratio that triggers a burn-rate alert
    pub burn_rate_alert: f64,
    /// Weeks in a month of delay
    pub weeks_per_month: u32,
    /// Weeks in a quarter of delay
    pub weeks_per_quarter: u32,
    /// Maximum cascade depth
    pub max_cascade_depth: Option<usize>,
}

impl Thresholds {
    /// Create thresholds from the default constants
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With burn-rate alert ratio
    #[inline]
    #[must_use]
    pub fn with_burn_rate_alert(mut self, ratio: f64) -> Self {
        self.burn_rate_alert = ratio;
        self
    }

    /// With maximum cascade depth
    #[inline]
    #[must_use]
    pub fn with_max_cascade_depth(mut self, depth: Option<usize>) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    /// Check that every threshold is usable
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.burn_rate_alert.is_finite() || self.burn_rate_alert <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "burn_rate_alert must be a positive number, got {}",
                self.burn_rate_alert
            )));
        }
        if self.weeks_per_month == 0 {
            return Err(ConfigError::Invalid("weeks_per_month must be at least 1".into()));
        }
        if self.weeks_per_quarter == 0 {
            return Err(ConfigError::Invalid("weeks_per_quarter must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            burn_rate_alert: DEFAULT_BURN_RATE_ALERT,
            weeks_per_month: DEFAULT_WEEKS_PER_MONTH,
            weeks_per_quarter: DEFAULT_WEEKS_PER_QUARTER,
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
        }
    }
}

/// Scenario engine configuration
///
/// ```toml
/// reference_date = "2026-02-19"
///
/// [thresholds]
/// burn_rate_alert = 0.85
/// max_cascade_depth = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Numeric thresholds
    pub thresholds: Thresholds,
    /// "Today" for runway calculations; local date when unset
    pub reference_date: Option<NaiveDate>,
}

impl ScenarioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With thresholds
    #[inline]
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// With fixed reference date
    #[inline]
    #[must_use]
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Reference date, falling back to the local calendar date
    #[must_use]
    pub fn effective_reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Parse configuration from TOML text
    ///
    /// Omitted keys keep their defaults.
    ///
    /// # Errors
    /// Returns error on malformed TOML or out-of-range thresholds
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.thresholds.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Loading scenario config from {}", path.display());
        Self::from_toml_str(&text)
    }
}
