//! Validation of user-entered KPI values and multi-year targets.
//!
//! Nothing here returns the crate error type. Bad input is an expected
//! outcome and comes back as data ([`ValueError`], [`TargetCheck`]) so the
//! caller can show it next to the field that produced it.
//!
//! Two severities:
//! - errors: malformed input (not a number, out of bounds). Blocks a save.
//! - warnings: well-formed but implausible targets (decline, runaway growth,
//!   stagnation). The save goes ahead and the warnings are shown.

use crate::types::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const VALUE_MIN: f64 = -1e12;
pub const VALUE_MAX: f64 = 1e12;

/// Ten years. Anything above is treated as a typo.
pub const MAX_PLAUSIBLE_DAYS: f64 = 3650.0;

// ---------------------------------------------------------------------------
// ValueError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueError {
    #[error("value is not a number")]
    NotANumber,

    #[error("negative values are not allowed")]
    NegativeNotAllowed,

    #[error("value must be between {min} and {max}")]
    OutOfRange { min: f64, max: f64 },

    #[error("percentage cannot exceed 100%")]
    PercentageExceeds100,

    #[error("days cannot be negative")]
    NegativeDays,

    #[error("{days} days is unrealistic (maximum {max})")]
    UnrealisticDays { days: f64, max: f64 },
}

/// Check a single numeric value against the global bounds and the rules for
/// its unit. Returns the value unchanged when it passes.
pub fn validate_value(value: f64, unit: Unit, allow_negative: bool) -> Result<f64, ValueError> {
    if !value.is_finite() {
        return Err(ValueError::NotANumber);
    }
    if value < 0.0 && !allow_negative {
        return Err(ValueError::NegativeNotAllowed);
    }
    if !(VALUE_MIN..=VALUE_MAX).contains(&value) {
        return Err(ValueError::OutOfRange {
            min: VALUE_MIN,
            max: VALUE_MAX,
        });
    }
    match unit {
        Unit::Percentage if value > 100.0 => Err(ValueError::PercentageExceeds100),
        Unit::Days if value < 0.0 => Err(ValueError::NegativeDays),
        Unit::Days if value > MAX_PLAUSIBLE_DAYS => Err(ValueError::UnrealisticDays {
            days: value,
            max: MAX_PLAUSIBLE_DAYS,
        }),
        _ => Ok(value),
    }
}

/// Parse raw text from an input box, then [`validate_value`] it.
///
/// Accepts thousands separators, a currency symbol, and a trailing `%`.
pub fn validate_input(input: &str, unit: Unit, allow_negative: bool) -> Result<f64, ValueError> {
    let cleaned: String = input
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Err(ValueError::NotANumber);
    }
    let value: f64 = cleaned.parse().map_err(|_| ValueError::NotANumber)?;
    validate_value(value, unit, allow_negative)
}

// ---------------------------------------------------------------------------
// GrowthPolicy
// ---------------------------------------------------------------------------

/// Thresholds for the target-growth warnings. These are coaching heuristics;
/// the defaults can be overridden in config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPolicy {
    #[serde(default = "default_year1_limit")]
    pub year1_limit_pct: f64,
    #[serde(default = "default_year2_limit")]
    pub year2_limit_pct: f64,
    #[serde(default = "default_year3_limit")]
    pub year3_limit_pct: f64,
    #[serde(default = "default_stagnation")]
    pub stagnation_pct: f64,
}

fn default_year1_limit() -> f64 {
    500.0
}

fn default_year2_limit() -> f64 {
    300.0
}

fn default_year3_limit() -> f64 {
    200.0
}

fn default_stagnation() -> f64 {
    5.0
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            year1_limit_pct: default_year1_limit(),
            year2_limit_pct: default_year2_limit(),
            year3_limit_pct: default_year3_limit(),
            stagnation_pct: default_stagnation(),
        }
    }
}

impl GrowthPolicy {
    /// Growth ceiling in percent for target year 1, 2 or 3.
    pub fn limit_pct(&self, year: u8) -> f64 {
        match year {
            1 => self.year1_limit_pct,
            2 => self.year2_limit_pct,
            _ => self.year3_limit_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// Target progression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    Current,
    Year1,
    Year2,
    Year3,
}

impl TargetField {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetField::Current => "current",
            TargetField::Year1 => "year1",
            TargetField::Year2 => "year2",
            TargetField::Year3 => "year3",
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetError {
    pub field: TargetField,
    pub error: ValueError,
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrowthWarning {
    Declining { year: u8, from: f64, to: f64 },
    ExcessiveGrowth { year: u8, growth_pct: f64, limit_pct: f64 },
    Stagnant { threshold_pct: f64 },
}

impl fmt::Display for GrowthWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthWarning::Declining { year, from, to } => {
                write!(f, "year {year} target ({to}) is lower than the year before ({from})")
            }
            GrowthWarning::ExcessiveGrowth {
                year,
                growth_pct,
                limit_pct,
            } => write!(
                f,
                "year {year} growth of {growth_pct:.0}% exceeds {limit_pct:.0}%; \
                 check the target is realistic"
            ),
            GrowthWarning::Stagnant { threshold_pct } => write!(
                f,
                "growth is under {threshold_pct:.0}% in every year; \
                 consider a more ambitious target"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TargetCheck {
    pub errors: Vec<TargetError>,
    pub warnings: Vec<GrowthWarning>,
}

impl TargetCheck {
    /// No errors. Warnings do not affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

pub fn validate_target_progression(
    current: f64,
    year1: f64,
    year2: f64,
    year3: f64,
    unit: Unit,
) -> TargetCheck {
    validate_target_progression_with(&GrowthPolicy::default(), current, year1, year2, year3, unit)
}

pub fn validate_target_progression_with(
    policy: &GrowthPolicy,
    current: f64,
    year1: f64,
    year2: f64,
    year3: f64,
    unit: Unit,
) -> TargetCheck {
    let values = [
        (TargetField::Current, current),
        (TargetField::Year1, year1),
        (TargetField::Year2, year2),
        (TargetField::Year3, year3),
    ];

    // Percentage bounds (0..=100) come from validate_value.
    let errors: Vec<TargetError> = values
        .iter()
        .filter_map(|&(field, v)| {
            validate_value(v, unit, false)
                .err()
                .map(|error| TargetError { field, error })
        })
        .collect();
    if !errors.is_empty() {
        return TargetCheck {
            errors,
            warnings: Vec::new(),
        };
    }

    if !unit.is_growth() {
        return TargetCheck::default();
    }

    let mut warnings = Vec::new();
    let mut growths: Vec<Option<f64>> = Vec::with_capacity(3);
    for year in 1..=3u8 {
        let prev = values[usize::from(year) - 1].1;
        let next = values[usize::from(year)].1;
        if prev <= 0.0 {
            growths.push(None);
            continue;
        }
        let growth = (next - prev) / prev;
        growths.push(Some(growth));

        if next < prev {
            warnings.push(GrowthWarning::Declining {
                year,
                from: prev,
                to: next,
            });
        }
        let limit_pct = policy.limit_pct(year);
        if growth * 100.0 > limit_pct {
            warnings.push(GrowthWarning::ExcessiveGrowth {
                year,
                growth_pct: growth * 100.0,
                limit_pct,
            });
        }
    }

    let stagnant = growths.iter().all(|g| {
        g.is_some_and(|g| (0.0..policy.stagnation_pct / 100.0).contains(&g))
    });
    if stagnant {
        warnings.push(GrowthWarning::Stagnant {
            threshold_pct: policy.stagnation_pct,
        });
    }

    TargetCheck {
        errors: Vec::new(),
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
