use crate::cmd::check::print_check;
use crate::cmd::{load_catalog, load_config};
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use kpi_core::format::{format_kpi_value_with, format_value_for_tag, NumberLocale};
use kpi_core::plan::{quarterly_split, KpiPlan, TargetEdit};
use kpi_core::store::{PlanStore, YamlPlanStore};
use kpi_core::types::Unit;
use std::path::Path;

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Show selected KPIs with their current values and targets
    Show,
    /// Add a catalog KPI to the plan
    Select { id: String },
    /// Remove a KPI and its targets from the plan
    Deselect { id: String },
    /// Set the current value and/or yearly targets for a selected KPI
    Set {
        id: String,
        #[arg(long, allow_negative_numbers = true)]
        current: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        year1: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        year2: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        year3: Option<f64>,
    },
    /// Split an annual target into quarters
    Split {
        annual: f64,
        /// Four comma-separated quarter weights, e.g. 1,1,2,2
        #[arg(long, value_delimiter = ',')]
        weights: Option<Vec<f64>>,
        /// Unit used to display the quarters
        #[arg(long, default_value = "number")]
        unit: String,
    },
}

pub fn run(
    root: &Path,
    catalog: Option<&Path>,
    subcmd: PlanSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        PlanSubcommand::Show => show(root, catalog, json),
        PlanSubcommand::Select { id } => select(root, catalog, &id, json),
        PlanSubcommand::Deselect { id } => deselect(root, &id, json),
        PlanSubcommand::Set {
            id,
            current,
            year1,
            year2,
            year3,
        } => {
            let edit = TargetEdit {
                current,
                year1,
                year2,
                year3,
            };
            set(root, catalog, &id, edit, json)
        }
        PlanSubcommand::Split {
            annual,
            weights,
            unit,
        } => split(root, annual, weights, &unit, json),
    }
}

fn load_plan(store: &YamlPlanStore) -> anyhow::Result<KpiPlan> {
    store
        .load_plan()
        .with_context(|| format!("failed to load plan from {}", store.path().display()))
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, catalog: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let catalog = load_catalog(root, catalog, &config)?;
    let plan = load_plan(&YamlPlanStore::new(root))?;

    if json {
        print_json(&plan)?;
        return Ok(());
    }

    if plan.kpis.is_empty() {
        println!("No KPIs selected. Use `kpi plan select <id>`.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = plan
        .kpis
        .iter()
        .map(|k| {
            let kpi = catalog.get_by_id(&k.kpi_id);
            let unit = kpi.map_or(Unit::Number, |d| d.unit);
            let value = |v: Option<f64>| cell(&config.locale, v, unit);
            vec![
                k.kpi_id.clone(),
                kpi.map_or_else(|| "(not in catalog)".to_string(), |d| d.name.clone()),
                value(k.current_value),
                value(k.year1_target),
                value(k.year2_target),
                value(k.year3_target),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "CURRENT", "YEAR 1", "YEAR 2", "YEAR 3"], rows);
    Ok(())
}

fn cell(locale: &NumberLocale, value: Option<f64>, unit: Unit) -> String {
    value.map_or_else(|| "-".to_string(), |v| format_kpi_value_with(locale, v, unit, false))
}

// ---------------------------------------------------------------------------
// select / deselect
// ---------------------------------------------------------------------------

fn select(root: &Path, catalog: Option<&Path>, id: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let catalog = load_catalog(root, catalog, &config)?;
    let mut store = YamlPlanStore::new(root);
    let mut plan = load_plan(&store)?;

    let added = plan.select(&catalog, id, Utc::now())?;
    if added {
        store.save_plan(&plan).context("failed to save plan")?;
    }

    if json {
        print_json(&serde_json::json!({ "id": id, "selected": true, "added": added }))?;
    } else if added {
        println!("Selected '{id}'.");
    } else {
        println!("'{id}' is already in the plan.");
    }
    Ok(())
}

fn deselect(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut store = YamlPlanStore::new(root);
    let mut plan = load_plan(&store)?;

    let removed = plan.deselect(id);
    if removed {
        store.save_plan(&plan).context("failed to save plan")?;
    }

    if json {
        print_json(&serde_json::json!({ "id": id, "removed": removed }))?;
    } else if removed {
        println!("Removed '{id}' from the plan.");
    } else {
        println!("'{id}' was not in the plan.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

fn set(
    root: &Path,
    catalog: Option<&Path>,
    id: &str,
    edit: TargetEdit,
    json: bool,
) -> anyhow::Result<()> {
    if edit.is_empty() {
        anyhow::bail!("nothing to set: pass at least one of --current, --year1, --year2, --year3");
    }
    let config = load_config(root)?;
    let catalog = load_catalog(root, catalog, &config)?;
    let mut store = YamlPlanStore::new(root);
    let mut plan = load_plan(&store)?;

    let check = plan.set_targets(&catalog, id, edit, &config.growth, Utc::now())?;
    if check.is_valid() {
        store.save_plan(&plan).context("failed to save plan")?;
    }

    if json {
        print_json(&serde_json::json!({
            "id": id,
            "saved": check.is_valid(),
            "errors": check.errors,
            "warnings": check.warnings,
        }))?;
    } else {
        print_check(&check);
    }

    if !check.is_valid() {
        anyhow::bail!("targets for '{id}' were not saved");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// split
// ---------------------------------------------------------------------------

fn split(
    root: &Path,
    annual: f64,
    weights: Option<Vec<f64>>,
    unit: &str,
    json: bool,
) -> anyhow::Result<()> {
    let weights: [f64; 4] = match weights {
        None => [1.0; 4],
        Some(w) => w
            .try_into()
            .map_err(|w: Vec<f64>| anyhow::anyhow!("expected 4 weights, got {}", w.len()))?,
    };
    let quarters = quarterly_split(annual, weights);

    if json {
        print_json(&serde_json::json!({ "annual": annual, "quarters": quarters }))?;
        return Ok(());
    }

    let config = load_config(root)?;
    let rows: Vec<Vec<String>> = quarters
        .iter()
        .enumerate()
        .map(|(i, q)| {
            vec![
                format!("Q{}", i + 1),
                format_value_for_tag(&config.locale, *q, unit, false),
            ]
        })
        .collect();
    print_table(&["QUARTER", "TARGET"], rows);
    Ok(())
}
