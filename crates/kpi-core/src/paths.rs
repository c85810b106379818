use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const KPI_DIR: &str = ".kpi";
pub const CONFIG_FILE: &str = ".kpi/config.yaml";
pub const PLAN_FILE: &str = ".kpi/plan.yaml";
pub const PROFILE_FILE: &str = ".kpi/profile.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn kpi_dir(root: &Path) -> PathBuf {
    root.join(KPI_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn plan_path(root: &Path) -> PathBuf {
    root.join(PLAN_FILE)
}

pub fn profile_path(root: &Path) -> PathBuf {
    root.join(PROFILE_FILE)
}
