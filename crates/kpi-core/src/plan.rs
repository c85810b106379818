use crate::catalog::KpiCatalog;
use crate::error::{KpiError, Result};
use crate::validation::{
    validate_target_progression_with, validate_value, GrowthPolicy, TargetCheck, TargetError,
    TargetField,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UserKpi
// ---------------------------------------------------------------------------

/// A catalog KPI the user has put into their plan, with their numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserKpi {
    pub kpi_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year1_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year2_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year3_target: Option<f64>,
    pub selected_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserKpi {
    pub fn new(kpi_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            kpi_id: kpi_id.into(),
            current_value: None,
            year1_target: None,
            year2_target: None,
            year3_target: None,
            selected_at: now,
            updated_at: now,
        }
    }

    fn with_edit(&self, edit: &TargetEdit) -> [(TargetField, Option<f64>); 4] {
        [
            (TargetField::Current, edit.current.or(self.current_value)),
            (TargetField::Year1, edit.year1.or(self.year1_target)),
            (TargetField::Year2, edit.year2.or(self.year2_target)),
            (TargetField::Year3, edit.year3.or(self.year3_target)),
        ]
    }
}

/// Fields to overwrite on a [`UserKpi`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetEdit {
    pub current: Option<f64>,
    pub year1: Option<f64>,
    pub year2: Option<f64>,
    pub year3: Option<f64>,
}

impl TargetEdit {
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
            && self.year1.is_none()
            && self.year2.is_none()
            && self.year3.is_none()
    }
}

// ---------------------------------------------------------------------------
// KpiPlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiPlan {
    /// Bumped on every mutation.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub kpis: Vec<UserKpi>,
}

impl KpiPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kpi_id: &str) -> Option<&UserKpi> {
        self.kpis.iter().find(|k| k.kpi_id == kpi_id)
    }

    pub fn is_selected(&self, kpi_id: &str) -> bool {
        self.get(kpi_id).is_some()
    }

    /// Add a catalog KPI to the plan. Returns `false` if it was already there.
    pub fn select(
        &mut self,
        catalog: &KpiCatalog,
        kpi_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        catalog.require(kpi_id)?;
        if self.is_selected(kpi_id) {
            return Ok(false);
        }
        self.kpis.push(UserKpi::new(kpi_id, now));
        self.revision += 1;
        Ok(true)
    }

    /// Remove a KPI and its numbers. Returns `false` if it was not selected.
    pub fn deselect(&mut self, kpi_id: &str) -> bool {
        let before = self.kpis.len();
        self.kpis.retain(|k| k.kpi_id != kpi_id);
        let removed = self.kpis.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Apply a target edit after validating it against the KPI's unit.
    ///
    /// When every value (current plus three years) is known the whole
    /// progression is checked and growth warnings are reported. Otherwise
    /// only the supplied values are checked. Any error leaves the plan
    /// untouched.
    pub fn set_targets(
        &mut self,
        catalog: &KpiCatalog,
        kpi_id: &str,
        edit: TargetEdit,
        policy: &GrowthPolicy,
        now: DateTime<Utc>,
    ) -> Result<TargetCheck> {
        let unit = catalog.require(kpi_id)?.unit;
        let entry = self
            .kpis
            .iter_mut()
            .find(|k| k.kpi_id == kpi_id)
            .ok_or_else(|| KpiError::KpiNotSelected(kpi_id.to_string()))?;

        let merged = entry.with_edit(&edit);
        let check = match merged {
            [(_, Some(c)), (_, Some(y1)), (_, Some(y2)), (_, Some(y3))] => {
                validate_target_progression_with(policy, c, y1, y2, y3, unit)
            }
            _ => TargetCheck {
                errors: merged
                    .iter()
                    .filter_map(|&(field, v)| {
                        let error = validate_value(v?, unit, false).err()?;
                        Some(TargetError { field, error })
                    })
                    .collect(),
                warnings: Vec::new(),
            },
        };

        if !check.is_valid() {
            tracing::debug!(kpi = kpi_id, errors = check.errors.len(), "target edit rejected");
            return Ok(check);
        }

        entry.current_value = merged[0].1;
        entry.year1_target = merged[1].1;
        entry.year2_target = merged[2].1;
        entry.year3_target = merged[3].1;
        entry.updated_at = now;
        self.revision += 1;
        Ok(check)
    }

    /// Record today's value for a selected KPI. Growth warnings against any
    /// existing targets use `policy`.
    pub fn set_current(
        &mut self,
        catalog: &KpiCatalog,
        kpi_id: &str,
        value: f64,
        policy: &GrowthPolicy,
        now: DateTime<Utc>,
    ) -> Result<TargetCheck> {
        let edit = TargetEdit {
            current: Some(value),
            ..Default::default()
        };
        self.set_targets(catalog, kpi_id, edit, policy, now)
    }
}

// ---------------------------------------------------------------------------
// Quarterly split
// ---------------------------------------------------------------------------

/// Distribute an annual target across four quarters in proportion to
/// `weights`. Negative weights count as zero; all-zero weights split evenly.
/// The last quarter absorbs rounding so the parts always sum to `annual`.
pub fn quarterly_split(annual: f64, weights: [f64; 4]) -> [f64; 4] {
    let mut w = weights.map(|x| if x.is_finite() && x > 0.0 { x } else { 0.0 });
    let total: f64 = w.iter().sum();
    if total == 0.0 {
        w = [1.0; 4];
    }
    let total: f64 = w.iter().sum();

    let mut parts = [0.0; 4];
    let mut allocated = 0.0;
    for q in 0..3 {
        parts[q] = annual * w[q] / total;
        allocated += parts[q];
    }
    parts[3] = annual - allocated;
    parts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
