use crate::error::{KpiError, Result};
use crate::io::{read_yaml_or_default, write_yaml};
use crate::paths;
use crate::plan::KpiPlan;
use std::path::{Path, PathBuf};

/// Where a [`KpiPlan`] lives between sessions. The embedding application
/// picks the backend; the library only talks to this trait.
pub trait PlanStore {
    fn load_plan(&self) -> Result<KpiPlan>;
    fn save_plan(&mut self, plan: &KpiPlan) -> Result<()>;
}

// ---------------------------------------------------------------------------
// YamlPlanStore
// ---------------------------------------------------------------------------

/// Plan stored as YAML at `{root}/.kpi/plan.yaml`.
#[derive(Debug, Clone)]
pub struct YamlPlanStore {
    path: PathBuf,
}

impl YamlPlanStore {
    pub fn new(root: &Path) -> Self {
        Self {
            path: paths::plan_path(root),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for YamlPlanStore {
    /// A missing file is an empty plan.
    fn load_plan(&self) -> Result<KpiPlan> {
        read_yaml_or_default(&self.path)
    }

    fn save_plan(&mut self, plan: &KpiPlan) -> Result<()> {
        write_yaml(&self.path, plan)?;
        tracing::debug!(path = %self.path.display(), revision = plan.revision, "plan saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryPlanStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryPlanStore {
    pub saved: Option<KpiPlan>,
    pub save_count: usize,
    /// When set, the next save fails with this message.
    pub fail_next: Option<String>,
}

impl PlanStore for MemoryPlanStore {
    fn load_plan(&self) -> Result<KpiPlan> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    fn save_plan(&mut self, plan: &KpiPlan) -> Result<()> {
        if let Some(msg) = self.fail_next.take() {
            return Err(KpiError::Io(std::io::Error::other(msg)));
        }
        self.saved = Some(plan.clone());
        self.save_count += 1;
        Ok(())
    }
}
