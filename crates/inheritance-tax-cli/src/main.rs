mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use inheritance_tax_core::InheritanceTaxError;
use serde::{Deserialize, Serialize};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::division::{CalculateArgs, DivisionArgs};
use commands::family::HeirsArgs;
use commands::tax::TaxArgs;
use crate::config::CliConfig;

/// Japanese inheritance tax calculations
#[derive(Parser)]
#[command(
    name = "itax",
    version,
    about = "Japanese inheritance tax calculations",
    long_about = "A CLI for computing Japanese inheritance tax with exact decimal shares \
                  and whole-yen truncation. Resolves statutory heirs, computes the \
                  legal-share aggregate tax and apportions it over an actual division \
                  with the two-fold addition and the spouse reduction."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to ITAX_OUTPUT or itax.toml, then json)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Determine statutory heirs, shares and the basic deduction
    Heirs(HeirsArgs),
    /// Aggregate tax assuming statutory shares
    Tax(TaxArgs),
    /// Apportion the aggregate tax over the actual division
    Division(DivisionArgs),
    /// Print the progressive bracket table
    Brackets,
    /// Heirs, legal-share tax and optional division in one request
    Calculate(CalculateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match CliConfig::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: configuration: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    init_tracing(&settings.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Heirs(args) => commands::family::run_heirs(args),
        Commands::Tax(args) => commands::tax::run_tax(args),
        Commands::Division(args) => commands::division::run_division(args, settings.rounding),
        Commands::Brackets => commands::tax::run_brackets(),
        Commands::Calculate(args) => commands::division::run_calculate(args, settings.rounding),
        Commands::Version => {
            println!("itax {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            let format = cli.output.unwrap_or(settings.output);
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            report_error(e.as_ref());
            process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Validation failures list every offending field; anything else is one line.
fn report_error(e: &(dyn std::error::Error + 'static)) {
    let report = e
        .downcast_ref::<InheritanceTaxError>()
        .and_then(InheritanceTaxError::validation);
    match report {
        Some(report) => {
            eprintln!("{}: validation failed", "error".red().bold());
            for item in &report.errors {
                eprintln!("  {item}");
            }
        }
        None => eprintln!("{}: {}", "error".red().bold(), e),
    }
}
