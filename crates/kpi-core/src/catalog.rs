use crate::error::{KpiError, Result};
use crate::kpi::{KpiDefinition, KpiRecord};
use crate::types::{BusinessFunction, Stage, Tier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../catalog/default.yaml");

// ---------------------------------------------------------------------------
// Registration outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    Inserted,
    /// An entry with the same id existed and was overwritten in place.
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReport {
    pub registered: usize,
    pub replaced: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<RegistrationFailure>,
}

impl RegistrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// KpiFilter
// ---------------------------------------------------------------------------

/// Conjunction of optional criteria. An empty filter matches every KPI.
#[derive(Debug, Clone, Default)]
pub struct KpiFilter {
    pub function: Option<BusinessFunction>,
    pub industry: Option<String>,
    pub stage: Option<Stage>,
    pub tier: Option<Tier>,
    pub query: Option<String>,
}

impl KpiFilter {
    fn matches(&self, kpi: &KpiDefinition, needle: Option<&str>) -> bool {
        self.function.map_or(true, |f| kpi.function == f)
            && self
                .industry
                .as_deref()
                .map_or(true, |i| kpi.applies_to_industry(i))
            && self.stage.map_or(true, |s| kpi.applies_to_stage(s))
            && self.tier.map_or(true, |t| kpi.tier == t)
            && needle.map_or(true, |n| kpi.matches_text(n))
    }
}

// ---------------------------------------------------------------------------
// KpiCatalog
// ---------------------------------------------------------------------------

/// In-memory KPI registry keyed by id, iterated in registration order.
///
/// Constructed explicitly and handed to whatever needs it; there is no
/// process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct KpiCatalog {
    entries: Vec<KpiDefinition>,
    index: HashMap<String, usize>,
}

impl KpiCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the library.
    pub fn builtin() -> Result<(Self, RegistrationReport)> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Parse a YAML list of KPI records and register each one.
    ///
    /// Malformed YAML fails the whole load; an individual bad record only
    /// shows up in the returned report.
    pub fn from_yaml_str(data: &str) -> Result<(Self, RegistrationReport)> {
        let records: Vec<KpiRecord> = serde_yaml::from_str(data)?;
        let mut catalog = Self::new();
        let report = catalog.register_many(records);
        Ok((catalog, report))
    }

    pub fn load(path: &Path) -> Result<(Self, RegistrationReport)> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    pub fn register(&mut self, record: KpiRecord) -> Result<Registered> {
        let kpi = KpiDefinition::try_from(record)?;
        Ok(self.insert(kpi))
    }

    /// Insert an already-typed definition, overwriting any entry with the
    /// same id. Last write wins.
    pub fn insert(&mut self, kpi: KpiDefinition) -> Registered {
        match self.index.get(&kpi.id) {
            Some(&pos) => {
                tracing::warn!(id = %kpi.id, "kpi already registered, overwriting");
                self.entries[pos] = kpi;
                Registered::Replaced
            }
            None => {
                tracing::debug!(id = %kpi.id, "registered kpi");
                self.index.insert(kpi.id.clone(), self.entries.len());
                self.entries.push(kpi);
                Registered::Inserted
            }
        }
    }

    pub fn register_many(&mut self, records: Vec<KpiRecord>) -> RegistrationReport {
        let mut report = RegistrationReport::default();
        for (index, record) in records.into_iter().enumerate() {
            let id = record.id.clone();
            match self.register(record) {
                Ok(outcome) => {
                    report.registered += 1;
                    if outcome == Registered::Replaced {
                        report.replaced += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(index, id = ?id, error = %e, "skipping invalid kpi record");
                    report.failed.push(RegistrationFailure {
                        index,
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            registered = report.registered,
            replaced = report.replaced,
            failed = report.failed.len(),
            "kpi batch registration finished"
        );
        report
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_all(&self) -> &[KpiDefinition] {
        &self.entries
    }

    pub fn get_by_id(&self, id: &str) -> Option<&KpiDefinition> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Like [`get_by_id`](Self::get_by_id) but with a `KpiNotFound` error.
    pub fn require(&self, id: &str) -> Result<&KpiDefinition> {
        self.get_by_id(id)
            .ok_or_else(|| KpiError::KpiNotFound(id.to_string()))
    }

    pub fn by_function(&self, function: BusinessFunction) -> Vec<&KpiDefinition> {
        self.entries
            .iter()
            .filter(|k| k.function == function)
            .collect()
    }

    /// KPIs declaring `industry` or the universal `all` tag. Querying `all`
    /// returns the whole catalog.
    pub fn by_industry(&self, industry: &str) -> Vec<&KpiDefinition> {
        self.entries
            .iter()
            .filter(|k| k.applies_to_industry(industry))
            .collect()
    }

    pub fn by_stage(&self, stage: Stage) -> Vec<&KpiDefinition> {
        self.entries
            .iter()
            .filter(|k| k.applies_to_stage(stage))
            .collect()
    }

    pub fn by_tier(&self, tier: Tier) -> Vec<&KpiDefinition> {
        self.entries.iter().filter(|k| k.tier == tier).collect()
    }

    pub fn filter(&self, filter: &KpiFilter) -> Vec<&KpiDefinition> {
        let needle = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        self.entries
            .iter()
            .filter(|k| filter.matches(k, needle.as_deref()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
