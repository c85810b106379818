mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    catalog::ListArgs, check::CheckSubcommand, config::ConfigSubcommand,
    format::FormatSubcommand, plan::PlanSubcommand, profile::ProfileSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kpi",
    about = "Browse the KPI catalog, check targets, and keep a KPI plan",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .kpi/)
    #[arg(long, global = true, env = "KPI_ROOT")]
    root: Option<PathBuf>,

    /// Catalog YAML file to use instead of the configured or built-in one
    #[arg(long, global = true, env = "KPI_CATALOG")]
    catalog: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog KPIs, optionally filtered
    List(ListArgs),

    /// Show one KPI in full
    Show { id: String },

    /// Case-insensitive text search over names, descriptions, and tags
    Search { query: String },

    /// Validate a value or a three-year target progression
    Check {
        #[command(subcommand)]
        subcommand: CheckSubcommand,
    },

    /// Format a value for display
    Format {
        #[command(subcommand)]
        subcommand: FormatSubcommand,
    },

    /// Manage the selected KPIs and their targets
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },

    /// Fill in the business profile and get KPI recommendations
    Profile {
        #[command(subcommand)]
        subcommand: ProfileSubcommand,
    },

    /// Inspect and validate .kpi/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let catalog = cli.catalog.as_deref();

    let result = match cli.command {
        Commands::List(args) => cmd::catalog::list(&root, catalog, args, cli.json),
        Commands::Show { id } => cmd::catalog::show(&root, catalog, &id, cli.json),
        Commands::Search { query } => cmd::catalog::search(&root, catalog, &query, cli.json),
        Commands::Check { subcommand } => cmd::check::run(&root, subcommand, cli.json),
        Commands::Format { subcommand } => cmd::format::run(&root, subcommand, cli.json),
        Commands::Plan { subcommand } => cmd::plan::run(&root, catalog, subcommand, cli.json),
        Commands::Profile { subcommand } => {
            cmd::profile::run(&root, catalog, subcommand, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
