use crate::cmd::{load_catalog, load_config};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use kpi_core::format::format_currency;
use kpi_core::profile::{BusinessProfile, ProfileStep};
use kpi_core::types::Tier;
use std::path::Path;

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the saved business profile and derived stage
    Show,
    /// Business name and industry
    Basics {
        #[arg(long)]
        name: String,
        #[arg(long)]
        industry: Option<String>,
    },
    /// Annual revenue today and the revenue you are aiming for
    Financials {
        #[arg(long)]
        revenue: f64,
        #[arg(long)]
        target: Option<f64>,
    },
    /// Number of people in the business
    Team {
        #[arg(long)]
        size: u32,
    },
    /// KPIs that fit this business's industry and stage
    Recommend {
        /// Deepest tier to include
        #[arg(long, default_value = "recommended")]
        tier: Tier,
    },
}

pub fn run(
    root: &Path,
    catalog: Option<&Path>,
    subcmd: ProfileSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ProfileSubcommand::Show => show(root, json),
        ProfileSubcommand::Basics { name, industry } => apply(
            root,
            ProfileStep::Basics {
                business_name: name,
                industry,
            },
            json,
        ),
        ProfileSubcommand::Financials { revenue, target } => apply(
            root,
            ProfileStep::Financials {
                annual_revenue: revenue,
                target_revenue: target,
            },
            json,
        ),
        ProfileSubcommand::Team { size } => {
            apply(root, ProfileStep::Team { team_size: size }, json)
        }
        ProfileSubcommand::Recommend { tier } => recommend(root, catalog, tier, json),
    }
}

fn load_profile(root: &Path) -> anyhow::Result<BusinessProfile> {
    BusinessProfile::load(root).context("failed to load profile")
}

fn apply(root: &Path, step: ProfileStep, json: bool) -> anyhow::Result<()> {
    let mut profile = load_profile(root)?;
    let name = step.name();
    profile.apply(step)?;
    profile.save(root).context("failed to save profile")?;

    if json {
        print_json(&profile)?;
    } else {
        println!("Saved {name}.");
        if !profile.is_complete() {
            println!("Profile incomplete: fill in basics, financials, and team.");
        }
    }
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let profile = load_profile(root)?;
    let stage = profile.stage();

    if json {
        print_json(&serde_json::json!({
            "profile": profile,
            "stage": stage,
            "complete": profile.is_complete(),
        }))?;
        return Ok(());
    }

    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    println!("Business:   {}", or_dash(profile.business_name.clone()));
    println!("Industry:   {}", or_dash(profile.industry.clone()));
    println!(
        "Revenue:    {}",
        or_dash(profile.annual_revenue.map(|r| format_currency(r, &config.locale)))
    );
    println!(
        "Target:     {}",
        or_dash(profile.target_revenue.map(|r| format_currency(r, &config.locale)))
    );
    println!("Team size:  {}", or_dash(profile.team_size.map(|n| n.to_string())));
    println!("Stage:      {}", or_dash(stage.map(|s| s.to_string())));
    Ok(())
}

fn recommend(root: &Path, catalog: Option<&Path>, tier: Tier, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let catalog = load_catalog(root, catalog, &config)?;
    let profile = load_profile(root)?;
    let kpis = profile.recommended_kpis(&catalog, tier);

    if json {
        print_json(&kpis)?;
        return Ok(());
    }

    if kpis.is_empty() {
        println!("No KPIs fit this profile.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = kpis
        .iter()
        .map(|k| {
            vec![
                k.id.clone(),
                k.plain_name.clone(),
                k.function.to_string(),
                k.tier.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "WHAT IT TRACKS", "FUNCTION", "TIER"], rows);
    Ok(())
}
