use crate::error::{KpiError, Result};
use crate::types::{BusinessFunction, Frequency, Stage, Tier, Unit, ALL_INDUSTRIES};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A benchmark point: either a number in the KPI's unit or a text label
/// such as `"< 30 days"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BenchmarkValue {
    Numeric(f64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Benchmarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poor: Option<BenchmarkValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<BenchmarkValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good: Option<BenchmarkValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excellent: Option<BenchmarkValue>,
}

impl Benchmarks {
    pub fn is_empty(&self) -> bool {
        self.poor.is_none()
            && self.average.is_none()
            && self.good.is_none()
            && self.excellent.is_none()
    }
}

// ---------------------------------------------------------------------------
// KpiRecord (authoring input)
// ---------------------------------------------------------------------------

/// A KPI as authored in a catalog file. Every field is optional here so a
/// malformed entry can be reported precisely instead of failing the whole
/// file at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plain_name: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub why_it_matters: Option<String>,
    #[serde(default)]
    pub action_to_take: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub benchmarks: Benchmarks,
}

// ---------------------------------------------------------------------------
// KpiDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub id: String,
    pub name: String,
    pub plain_name: String,
    pub function: BusinessFunction,
    #[serde(default)]
    pub category: String,
    pub tier: Tier,
    pub industries: Vec<String>,
    pub stages: Vec<Stage>,
    pub unit: Unit,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub why_it_matters: String,
    #[serde(default)]
    pub action_to_take: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Benchmarks::is_empty")]
    pub benchmarks: Benchmarks,
}

impl KpiDefinition {
    /// True when the KPI declares `industry` or the universal tag.
    pub fn applies_to_industry(&self, industry: &str) -> bool {
        let industry = industry.trim().to_ascii_lowercase();
        if industry == ALL_INDUSTRIES {
            return true;
        }
        self.industries
            .iter()
            .any(|i| i == &industry || i == ALL_INDUSTRIES)
    }

    pub fn applies_to_stage(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Case-insensitive substring match over name, plain name, description,
    /// and tags. `needle` must already be lower-cased.
    pub(crate) fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.plain_name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

fn required(value: Option<String>, field: &'static str, id: &Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(KpiError::MissingField {
            field,
            id: id.clone(),
        }),
    }
}

impl TryFrom<KpiRecord> for KpiDefinition {
    type Error = KpiError;

    fn try_from(record: KpiRecord) -> Result<Self> {
        let id_hint = record.id.clone();
        let id = required(record.id, "id", &id_hint)?;
        validate_id(&id)?;
        let name = required(record.name, "name", &id_hint)?;
        let function: BusinessFunction = required(record.function, "function", &id_hint)?.parse()?;
        let tier: Tier = required(record.tier, "tier", &id_hint)?.parse()?;
        let unit: Unit = required(record.unit, "unit", &id_hint)?.parse()?;
        let frequency: Frequency = required(record.frequency, "frequency", &id_hint)?.parse()?;

        let industries: Vec<String> = record
            .industries
            .iter()
            .map(|i| i.trim().to_ascii_lowercase())
            .filter(|i| !i.is_empty())
            .collect();
        if industries.is_empty() {
            return Err(KpiError::MissingField {
                field: "industries",
                id: id_hint,
            });
        }

        if record.stages.is_empty() {
            return Err(KpiError::MissingField {
                field: "stages",
                id: id_hint,
            });
        }
        let stages = record
            .stages
            .iter()
            .map(|s| s.parse::<Stage>())
            .collect::<Result<Vec<_>>>()?;

        let plain_name = record
            .plain_name
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| name.clone());

        Ok(KpiDefinition {
            id,
            name,
            plain_name,
            function,
            category: record.category.unwrap_or_default(),
            tier,
            industries,
            stages,
            unit,
            frequency,
            formula: record.formula,
            description: record.description.unwrap_or_default(),
            why_it_matters: record.why_it_matters.unwrap_or_default(),
            action_to_take: record.action_to_take.unwrap_or_default(),
            tags: record.tags,
            benchmarks: record.benchmarks,
        })
    }
}

impl From<&KpiDefinition> for KpiRecord {
    fn from(def: &KpiDefinition) -> Self {
        KpiRecord {
            id: Some(def.id.clone()),
            name: Some(def.name.clone()),
            plain_name: Some(def.plain_name.clone()),
            function: Some(def.function.to_string()),
            category: Some(def.category.clone()),
            tier: Some(def.tier.to_string()),
            industries: def.industries.clone(),
            stages: def.stages.iter().map(|s| s.to_string()).collect(),
            unit: Some(def.unit.to_string()),
            frequency: Some(def.frequency.to_string()),
            formula: def.formula.clone(),
            description: Some(def.description.clone()),
            why_it_matters: Some(def.why_it_matters.clone()),
            action_to_take: Some(def.action_to_take.clone()),
            tags: def.tags.clone(),
            benchmarks: def.benchmarks.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").unwrap())
}

pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(KpiError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
