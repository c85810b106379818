use crate::catalog::KpiCatalog;
use crate::error::{KpiError, Result};
use crate::io::{read_yaml_or_default, write_yaml};
use crate::kpi::KpiDefinition;
use crate::paths;
use crate::types::{Stage, Tier, Unit};
use crate::validation::validate_value;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ProfileStep
// ---------------------------------------------------------------------------

/// One page of the business profile wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ProfileStep {
    Basics {
        business_name: String,
        #[serde(default)]
        industry: Option<String>,
    },
    Financials {
        annual_revenue: f64,
        #[serde(default)]
        target_revenue: Option<f64>,
    },
    Team {
        team_size: u32,
    },
}

impl ProfileStep {
    pub fn name(&self) -> &'static str {
        match self {
            ProfileStep::Basics { .. } => "basics",
            ProfileStep::Financials { .. } => "financials",
            ProfileStep::Team { .. } => "team",
        }
    }
}

// ---------------------------------------------------------------------------
// BusinessProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<u32>,
}

fn revenue(field: &str, value: f64) -> Result<f64> {
    validate_value(value, Unit::Currency, false)
        .map_err(|e| KpiError::InvalidProfile(format!("{field}: {e}")))
}

impl BusinessProfile {
    pub fn load(root: &Path) -> Result<Self> {
        read_yaml_or_default(&paths::profile_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        write_yaml(&paths::profile_path(root), self)
    }

    /// Validate a wizard step and merge it in. A rejected step changes
    /// nothing.
    pub fn apply(&mut self, step: ProfileStep) -> Result<()> {
        match step {
            ProfileStep::Basics {
                business_name,
                industry,
            } => {
                let name = business_name.trim();
                if name.is_empty() {
                    return Err(KpiError::InvalidProfile(
                        "business name is required".to_string(),
                    ));
                }
                self.business_name = Some(name.to_string());
                self.industry = industry
                    .map(|i| i.trim().to_ascii_lowercase())
                    .filter(|i| !i.is_empty());
            }
            ProfileStep::Financials {
                annual_revenue,
                target_revenue,
            } => {
                let annual = revenue("annual revenue", annual_revenue)?;
                let target = target_revenue
                    .map(|t| revenue("target revenue", t))
                    .transpose()?;
                self.annual_revenue = Some(annual);
                self.target_revenue = target;
            }
            ProfileStep::Team { team_size } => {
                self.team_size = Some(team_size);
            }
        }
        Ok(())
    }

    pub fn stage(&self) -> Option<Stage> {
        self.annual_revenue.map(Stage::from_annual_revenue)
    }

    pub fn is_complete(&self) -> bool {
        self.business_name.is_some() && self.annual_revenue.is_some() && self.team_size.is_some()
    }

    /// Catalog KPIs suited to this business: matching industry (or
    /// universal) and current stage, no deeper than `max_tier`. Unknown
    /// industry or stage does not narrow the list.
    pub fn recommended_kpis<'a>(
        &self,
        catalog: &'a KpiCatalog,
        max_tier: Tier,
    ) -> Vec<&'a KpiDefinition> {
        let stage = self.stage();
        catalog
            .get_all()
            .iter()
            .filter(|k| k.tier <= max_tier)
            .filter(|k| self.industry.as_deref().map_or(true, |i| k.applies_to_industry(i)))
            .filter(|k| stage.map_or(true, |s| k.applies_to_stage(s)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::tests::record;
    use tempfile::TempDir;

    #[test]
    fn steps_parse_from_tagged_yaml() {
        let yaml = "step: basics\nbusiness_name: Acme Plumbing\nindustry: Trades\n";
        let step: ProfileStep = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(step.name(), "basics");

        let json = r#"{"step":"financials","annual_revenue":420000}"#;
        let step: ProfileStep = serde_json::from_str(json).unwrap();
        assert_eq!(
            step,
            ProfileStep::Financials {
                annual_revenue: 420000.0,
                target_revenue: None
            }
        );
    }

    #[test]
    fn unknown_step_is_rejected_at_parse() {
        let json = r#"{"step":"favourite_colour","value":"blue"}"#;
        assert!(serde_json::from_str::<ProfileStep>(json).is_err());
    }

    #[test]
    fn apply_fills_profile_and_derives_stage() {
        let mut profile = BusinessProfile::default();
        profile
            .apply(ProfileStep::Basics {
                business_name: "  Acme Plumbing ".to_string(),
                industry: Some("Trades".to_string()),
            })
            .unwrap();
        profile
            .apply(ProfileStep::Financials {
                annual_revenue: 420_000.0,
                target_revenue: Some(750_000.0),
            })
            .unwrap();
        assert!(!profile.is_complete());
        profile.apply(ProfileStep::Team { team_size: 6 }).unwrap();

        assert!(profile.is_complete());
        assert_eq!(profile.business_name.as_deref(), Some("Acme Plumbing"));
        assert_eq!(profile.industry.as_deref(), Some("trades"));
        assert_eq!(profile.stage(), Some(Stage::Growth));
    }

    #[test]
    fn invalid_steps_change_nothing() {
        let mut profile = BusinessProfile::default();
        let err = profile
            .apply(ProfileStep::Basics {
                business_name: "   ".to_string(),
                industry: None,
            })
            .unwrap_err();
        assert!(matches!(err, KpiError::InvalidProfile(_)));

        let err = profile
            .apply(ProfileStep::Financials {
                annual_revenue: 100_000.0,
                target_revenue: Some(-5.0),
            })
            .unwrap_err();
        assert!(err.to_string().contains("target revenue"));
        assert_eq!(profile, BusinessProfile::default());
    }

    #[test]
    fn recommendations_follow_industry_stage_and_tier() {
        let mut retail = record("retail-basket");
        retail.industries = vec!["retail".to_string()];
        let mut advanced = record("advanced-one");
        advanced.tier = Some("advanced".to_string());
        let mut late = record("late-stage");
        late.stages = vec!["mature".to_string()];
        let mut catalog = KpiCatalog::new();
        catalog.register_many(vec![record("universal"), retail, advanced, late]);

        let profile = BusinessProfile {
            industry: Some("trades".to_string()),
            annual_revenue: Some(300_000.0),
            ..Default::default()
        };
        let ids: Vec<_> = profile
            .recommended_kpis(&catalog, Tier::Recommended)
            .iter()
            .map(|k| k.id.as_str())
            .collect();
        assert_eq!(ids, ["universal"]);

        let open = BusinessProfile::default();
        assert_eq!(open.recommended_kpis(&catalog, Tier::Advanced).len(), 4);
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        assert_eq!(BusinessProfile::load(dir.path()).unwrap(), BusinessProfile::default());
        let profile = BusinessProfile {
            business_name: Some("Acme".to_string()),
            team_size: Some(3),
            ..Default::default()
        };
        profile.save(dir.path()).unwrap();
        assert_eq!(BusinessProfile::load(dir.path()).unwrap(), profile);
    }
}
