use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use osdash_core::{FilterCriteria, FilterOptions};
use osdash_report::{aggregate, parse_report};

mod render;

/// Service-order report analytics: parses one exported `.csv`/`.txt`
/// report and prints revenue, cost, margin, and ticket metrics.
#[derive(Parser, Debug)]
#[command(name = "osdash", version, about)]
struct Cli {
    /// Exported report file (.csv or .txt)
    file: PathBuf,

    /// Keep only orders opened on or after this date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Keep only orders opened on or before this date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Keep only orders with exactly this status
    #[arg(long)]
    status: Option<String>,

    /// Keep only orders with exactly this brand label
    #[arg(long)]
    brand: Option<String>,

    /// Keep only orders with exactly this acquisition channel
    #[arg(long)]
    origin: Option<String>,

    /// Print the distinct status/brand/origin values and exit
    #[arg(long)]
    list_filters: bool,

    /// Emit the whole summary as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// How many filtered records to list in the text output
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("erro: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let text = fs::read_to_string(&cli.file)
        .with_context(|| format!("não foi possível ler {}", cli.file.display()))?;

    let orders = match parse_report(&text) {
        Ok(orders) => orders,
        Err(err) => {
            // Structural failures carry a snippet of the file so the
            // user can see what the parser saw.
            eprintln!("--- início do arquivo ---");
            eprintln!("{}", err.snippet());
            eprintln!("--- fim do trecho ---");
            return Err(err.into());
        }
    };
    tracing::info!(records = orders.len(), file = %cli.file.display(), "report loaded");

    let options = FilterOptions::from_orders(&orders);
    if cli.list_filters {
        render::filter_options(&options);
        return Ok(());
    }

    let criteria = FilterCriteria {
        start_date: cli.start_date,
        end_date: cli.end_date,
        status: cli.status,
        brand: cli.brand,
        origin: cli.origin,
    };
    let summary = aggregate(&orders, &criteria);

    if cli.json {
        render::json(&summary, &options)?;
    } else {
        render::text(&summary, orders.len(), cli.limit);
    }
    Ok(())
}
