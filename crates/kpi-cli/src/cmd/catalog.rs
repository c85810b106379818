use crate::cmd::{load_catalog, load_config};
use crate::output::{print_json, print_table};
use clap::Args;
use kpi_core::catalog::KpiFilter;
use kpi_core::format::{format_kpi_value_with, NumberLocale};
use kpi_core::kpi::{BenchmarkValue, KpiDefinition};
use kpi_core::types::{BusinessFunction, Stage, Tier, Unit};
use std::path::Path;

#[derive(Args)]
pub struct ListArgs {
    /// Business function (marketing, sales, delivery, people, finance, systems)
    #[arg(long)]
    function: Option<BusinessFunction>,
    /// Industry; universal KPIs always match
    #[arg(long)]
    industry: Option<String>,
    /// Business stage (foundation, growth, scale, mature)
    #[arg(long)]
    stage: Option<Stage>,
    /// Tier (essential, recommended, advanced)
    #[arg(long)]
    tier: Option<Tier>,
    /// Text to match against names, descriptions, and tags
    #[arg(long)]
    search: Option<String>,
}

impl From<ListArgs> for KpiFilter {
    fn from(args: ListArgs) -> Self {
        KpiFilter {
            function: args.function,
            industry: args.industry,
            stage: args.stage,
            tier: args.tier,
            query: args.search,
        }
    }
}

// ---------------------------------------------------------------------------
// list / search
// ---------------------------------------------------------------------------

pub fn list(root: &Path, catalog: Option<&Path>, args: ListArgs, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let catalog = load_catalog(root, catalog, &config)?;
    let filter = KpiFilter::from(args);
    print_kpis(&catalog.filter(&filter), json)
}

pub fn search(root: &Path, catalog: Option<&Path>, query: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let catalog = load_catalog(root, catalog, &config)?;
    print_kpis(&catalog.search(query), json)
}

fn print_kpis(kpis: &[&KpiDefinition], json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&kpis)?;
        return Ok(());
    }

    if kpis.is_empty() {
        println!("No KPIs match.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = kpis
        .iter()
        .map(|k| {
            vec![
                k.id.clone(),
                k.name.clone(),
                k.function.to_string(),
                k.tier.to_string(),
                k.unit.to_string(),
                k.frequency.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "FUNCTION", "TIER", "UNIT", "FREQUENCY"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

pub fn show(root: &Path, catalog: Option<&Path>, id: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let catalog = load_catalog(root, catalog, &config)?;
    let kpi = catalog.require(id)?;

    if json {
        print_json(kpi)?;
        return Ok(());
    }

    println!("{}  ({})", kpi.name, kpi.id);
    if kpi.plain_name != kpi.name {
        println!("  In plain terms: {}", kpi.plain_name);
    }
    let category = if kpi.category.is_empty() {
        String::new()
    } else {
        format!(" / {}", kpi.category)
    };
    println!("  Function:   {}{category}", kpi.function);
    println!("  Tier:       {}", kpi.tier);
    println!("  Unit:       {}", kpi.unit);
    println!("  Frequency:  {}", kpi.frequency);
    println!("  Industries: {}", kpi.industries.join(", "));
    let stages: Vec<String> = kpi.stages.iter().map(|s| s.to_string()).collect();
    println!("  Stages:     {}", stages.join(", "));
    if let Some(formula) = &kpi.formula {
        println!("  Formula:    {formula}");
    }
    if !kpi.tags.is_empty() {
        println!("  Tags:       {}", kpi.tags.join(", "));
    }

    for (label, text) in [
        ("What it is", &kpi.description),
        ("Why it matters", &kpi.why_it_matters),
        ("What to do", &kpi.action_to_take),
    ] {
        if !text.is_empty() {
            println!();
            println!("{label}:");
            println!("  {text}");
        }
    }

    let b = &kpi.benchmarks;
    if !b.is_empty() {
        println!();
        println!("Benchmarks:");
        for (label, value) in [
            ("poor", &b.poor),
            ("average", &b.average),
            ("good", &b.good),
            ("excellent", &b.excellent),
        ] {
            if let Some(value) = value {
                println!("  {label:<10} {}", benchmark_text(&config.locale, value, kpi.unit));
            }
        }
    }
    Ok(())
}

fn benchmark_text(locale: &NumberLocale, value: &BenchmarkValue, unit: Unit) -> String {
    match value {
        BenchmarkValue::Numeric(v) => format_kpi_value_with(locale, *v, unit, false),
        BenchmarkValue::Label(text) => text.clone(),
    }
}
