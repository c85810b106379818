use crate::cmd::load_config;
use crate::output::print_json;
use clap::Subcommand;
use kpi_core::format::format_kpi_value_with;
use kpi_core::types::Unit;
use kpi_core::validation::{validate_input, validate_target_progression_with, TargetCheck};
use std::path::Path;

#[derive(Subcommand)]
pub enum CheckSubcommand {
    /// Validate a single value, e.g. "1,200", "$45", "12%"
    Value {
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long)]
        unit: Unit,
        /// Accept values below zero
        #[arg(long)]
        allow_negative: bool,
    },

    /// Validate current value and year 1-3 targets, with growth warnings
    Targets {
        #[arg(long)]
        unit: Unit,
        #[arg(allow_negative_numbers = true)]
        current: f64,
        #[arg(allow_negative_numbers = true)]
        year1: f64,
        #[arg(allow_negative_numbers = true)]
        year2: f64,
        #[arg(allow_negative_numbers = true)]
        year3: f64,
    },
}

pub fn run(root: &Path, subcmd: CheckSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CheckSubcommand::Value {
            value,
            unit,
            allow_negative,
        } => check_value(root, &value, unit, allow_negative, json),
        CheckSubcommand::Targets {
            unit,
            current,
            year1,
            year2,
            year3,
        } => check_targets(root, unit, [current, year1, year2, year3], json),
    }
}

// ---------------------------------------------------------------------------
// value
// ---------------------------------------------------------------------------

fn check_value(
    root: &Path,
    input: &str,
    unit: Unit,
    allow_negative: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let result = validate_input(input, unit, allow_negative);

    if json {
        let value = match &result {
            Ok(v) => serde_json::json!({ "valid": true, "value": v }),
            Err(e) => serde_json::json!({
                "valid": false,
                "error": e,
                "message": e.to_string(),
            }),
        };
        print_json(&value)?;
    } else {
        match &result {
            Ok(v) => println!("ok: {}", format_kpi_value_with(&config.locale, *v, unit, false)),
            Err(e) => println!("invalid: {e}"),
        }
    }

    if result.is_err() {
        anyhow::bail!("value is not valid for unit {unit}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// targets
// ---------------------------------------------------------------------------

fn check_targets(root: &Path, unit: Unit, values: [f64; 4], json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let [current, year1, year2, year3] = values;
    let check =
        validate_target_progression_with(&config.growth, current, year1, year2, year3, unit);

    if json {
        print_json(&serde_json::json!({
            "valid": check.is_valid(),
            "errors": check.errors,
            "warnings": check.warnings,
        }))?;
    } else {
        print_check(&check);
    }

    if !check.is_valid() {
        anyhow::bail!("targets are not valid");
    }
    Ok(())
}

/// Human-readable errors and warnings, shared with `plan set`.
pub fn print_check(check: &TargetCheck) {
    for e in &check.errors {
        println!("[error] {e}");
    }
    for w in &check.warnings {
        println!("[warning] {w}");
    }
    if check.is_valid() && !check.has_warnings() {
        println!("Targets look good.");
    }
}
