use crate::autosave::AutosaveConfig;
use crate::error::Result;
use crate::format::NumberLocale;
use crate::io::{read_yaml_or_default, write_yaml};
use crate::paths;
use crate::validation::GrowthPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Contents of `.kpi/config.yaml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Catalog file replacing the built-in one. Relative paths resolve
    /// against the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub locale: NumberLocale,
    #[serde(default)]
    pub growth: GrowthPolicy,
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            catalog: None,
            locale: NumberLocale::default(),
            growth: GrowthPolicy::default(),
            autosave: AutosaveConfig::default(),
        }
    }
}

impl Config {
    /// Load from `{root}/.kpi/config.yaml`; a missing file gives defaults.
    pub fn load(root: &Path) -> Result<Self> {
        read_yaml_or_default(&paths::config_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        write_yaml(&paths::config_path(root), self)
    }

    pub fn catalog_path(&self, root: &Path) -> Option<PathBuf> {
        self.catalog.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != 1 {
            warnings.push(ConfigWarning::warning(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        let growth = &self.growth;
        for (name, value) in [
            ("growth.year1_limit_pct", growth.year1_limit_pct),
            ("growth.year2_limit_pct", growth.year2_limit_pct),
            ("growth.year3_limit_pct", growth.year3_limit_pct),
        ] {
            if !value.is_finite() || value <= 0.0 {
                warnings.push(ConfigWarning::error(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !growth.stagnation_pct.is_finite() || growth.stagnation_pct < 0.0 {
            warnings.push(ConfigWarning::error(format!(
                "growth.stagnation_pct must not be negative, got {}",
                growth.stagnation_pct
            )));
        } else if growth.stagnation_pct >= growth.year3_limit_pct {
            warnings.push(ConfigWarning::warning(
                "growth.stagnation_pct is not below the year 3 limit; every plan will warn",
            ));
        }

        let locale = &self.locale;
        if locale.decimal_separator.is_empty() {
            warnings.push(ConfigWarning::error("locale.decimal_separator is empty"));
        }
        if locale.group_separator == locale.decimal_separator {
            warnings.push(ConfigWarning::error(format!(
                "locale group and decimal separators are both '{}'",
                locale.decimal_separator
            )));
        }

        if self.autosave.debounce_ms == 0 {
            warnings.push(ConfigWarning::warning(
                "autosave.debounce_ms is 0; every edit saves immediately",
            ));
        }

        if let Some(catalog) = &self.catalog {
            if catalog.as_os_str().is_empty() {
                warnings.push(ConfigWarning::error("catalog path is empty"));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
