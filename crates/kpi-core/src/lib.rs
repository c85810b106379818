pub mod autosave;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod kpi;
pub mod paths;
pub mod plan;
pub mod profile;
pub mod search;
pub mod store;
pub mod types;
pub mod validation;

pub use error::{KpiError, Result};
