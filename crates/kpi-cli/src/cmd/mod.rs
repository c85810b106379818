pub mod catalog;
pub mod check;
pub mod config;
pub mod format;
pub mod plan;
pub mod profile;

use anyhow::Context;
use kpi_core::catalog::KpiCatalog;
use kpi_core::config::Config;
use std::path::Path;

/// Catalog resolution: `--catalog`, then `config.yaml`'s `catalog`, then
/// the built-in catalog. Bad records are logged and skipped.
pub fn load_catalog(
    root: &Path,
    explicit: Option<&Path>,
    config: &Config,
) -> anyhow::Result<KpiCatalog> {
    let configured = config.catalog_path(root);
    let (catalog, report) = match explicit.map(Path::to_path_buf).or(configured) {
        Some(path) => KpiCatalog::load(&path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => KpiCatalog::builtin().context("failed to load built-in catalog")?,
    };
    if !report.is_clean() {
        tracing::warn!(failed = report.failed.len(), "catalog loaded with rejected records");
    }
    Ok(catalog)
}

pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).context("failed to load config")
}
