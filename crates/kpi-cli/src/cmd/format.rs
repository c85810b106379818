use crate::cmd::load_config;
use crate::output::print_json;
use clap::Subcommand;
use kpi_core::format::{format_days, format_value_for_tag};
use std::path::Path;

#[derive(Subcommand)]
pub enum FormatSubcommand {
    /// Format a value in a unit (currency, percentage, number, days, ratio, score)
    Value {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Unit tag; unrecognized tags format as a plain number
        #[arg(long, default_value = "number")]
        unit: String,
        /// Abbreviate thousands and millions (1.5K, 2M)
        #[arg(long)]
        compact: bool,
    },

    /// Render a day count as days, weeks, months, or years
    Days {
        #[arg(allow_negative_numbers = true)]
        days: f64,
    },
}

pub fn run(root: &Path, subcmd: FormatSubcommand, json: bool) -> anyhow::Result<()> {
    let text = match subcmd {
        FormatSubcommand::Value {
            value,
            unit,
            compact,
        } => {
            let config = load_config(root)?;
            format_value_for_tag(&config.locale, value, &unit, compact)
        }
        FormatSubcommand::Days { days } => format_days(days),
    };

    if json {
        print_json(&serde_json::json!({ "formatted": text }))?;
    } else {
        println!("{text}");
    }
    Ok(())
}
