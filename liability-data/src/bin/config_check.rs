use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use liability_core::FilingStatus;
use liability_data::ConfigLoader;
use tracing_subscriber::EnvFilter;

/// Load and validate tax year configuration from CSV files.
///
/// The brackets file should have the following columns:
/// - tax_year: The tax year (e.g., 2025)
/// - schedule: The IRS schedule code (X, Y-1, Y-2, Z)
/// - kind: 'ordinary' or 'capital_gains'
/// - lower: The bracket's lower bound
/// - upper: The upper bound (empty for unbounded)
/// - rate: The marginal rate as a decimal (e.g., 0.10)
///
/// The parameters file carries one row per (tax_year, schedule) with the
/// standard deduction, SALT cap, AMT exemption and thresholds, and the QBI
/// threshold and phase-in range.
#[derive(Parser, Debug)]
#[command(name = "config-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing bracket schedules
    #[arg(short, long)]
    brackets: PathBuf,

    /// Path to the CSV file containing year parameters
    #[arg(short, long)]
    params: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let brackets_file = File::open(&args.brackets)
        .with_context(|| format!("Failed to open: {}", args.brackets.display()))?;
    let bracket_records = ConfigLoader::parse_brackets(brackets_file)
        .with_context(|| format!("Failed to parse CSV: {}", args.brackets.display()))?;
    println!("Parsed {} bracket records", bracket_records.len());

    let params_file = File::open(&args.params)
        .with_context(|| format!("Failed to open: {}", args.params.display()))?;
    let param_records = ConfigLoader::parse_params(params_file)
        .with_context(|| format!("Failed to parse CSV: {}", args.params.display()))?;
    println!("Parsed {} parameter records", param_records.len());

    let table = ConfigLoader::build_table(&bracket_records, &param_records)
        .context("Failed to build configuration table")?;

    println!(
        "Validated {} configurations across tax years {:?}",
        table.len(),
        table.tax_years()
    );
    for tax_year in table.tax_years() {
        for filing_status in FilingStatus::ALL {
            if let Ok(config) = table.get(tax_year, filing_status) {
                println!(
                    "  {} {}: {} ordinary brackets, {} capital gains brackets, standard deduction {}",
                    tax_year,
                    filing_status,
                    config.ordinary_brackets.brackets.len(),
                    config.capital_gains_brackets.brackets.len(),
                    config.standard_deduction,
                );
            }
        }
    }

    Ok(())
}
