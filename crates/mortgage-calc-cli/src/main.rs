mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::calculate::{CalculateArgs, ScenarioBArgs};
use commands::engine::{AmortizeArgs, InsuranceArgs, PaymentArgs};

/// Mortgage affordability calculations
#[derive(Parser)]
#[command(
    name = "mortcalc",
    version,
    about = "Mortgage affordability calculations",
    long_about = "A CLI for mortgage affordability calculations with decimal precision. \
                  Supports effective-rate payments, insurance premiums, amortization with \
                  lump-sum prepayments, payoff search and what-if scenario comparison."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full recalculation: payment, insurance, term balance, savings, payoff
    Calculate(CalculateArgs),
    /// Compare the primary inputs against a what-if Scenario B
    ScenarioB(ScenarioBArgs),
    /// Level payment from a nominal rate and compounding convention
    Payment(PaymentArgs),
    /// Mortgage insurance premium for a price and down payment
    Insurance(InsuranceArgs),
    /// Run the amortization engine directly (full, partial, payoff, schedule)
    Amortize(AmortizeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args),
        Commands::ScenarioB(args) => commands::calculate::run_scenario_b(args),
        Commands::Payment(args) => commands::engine::run_payment(args),
        Commands::Insurance(args) => commands::engine::run_insurance(args),
        Commands::Amortize(args) => commands::engine::run_amortize(args),
        Commands::Version => {
            println!("mortcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
