use thiserror::Error;

#[derive(Debug, Error)]
pub enum KpiError {
    #[error("kpi record is missing required field '{field}'{}", id_suffix(.id))]
    MissingField { field: &'static str, id: Option<String> },

    #[error("invalid kpi id '{0}': must be lowercase alphanumeric with hyphens or underscores")]
    InvalidId(String),

    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("unknown business function: {0}")]
    UnknownFunction(String),

    #[error("unknown tier: {0}")]
    UnknownTier(String),

    #[error("unknown frequency: {0}")]
    UnknownFrequency(String),

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("kpi not found: {0}")]
    KpiNotFound(String),

    #[error("kpi not in plan: {0}")]
    KpiNotSelected(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" (id: {id})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, KpiError>;
