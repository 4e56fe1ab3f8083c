mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::capacity::CapacityArgs;
use commands::cities::CitiesArgs;
use commands::invest::InvestArgs;
use commands::loan::LoanArgs;
use commands::purchasing_power::PurchasingPowerArgs;
use commands::tax::TaxArgs;
use commands::value_evolution::ValueEvolutionArgs;

/// Real-estate investment, borrowing capacity and property value simulations
#[derive(Parser)]
#[command(
    name = "immo",
    version,
    about = "Real-estate investment, borrowing capacity and property value simulations",
    long_about = "A CLI for French residential real-estate simulations with decimal \
                  precision. Supports loan amortization, borrowing capacity, rental \
                  income tax, rental investment analysis, purchasing power and \
                  property value projections."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment, cost and amortization schedule of a loan
    Loan(LoanArgs),
    /// Maximum amount a household can borrow
    Capacity(CapacityArgs),
    /// Rental income tax under the four French regimes
    Tax(TaxArgs),
    /// Full rental investment simulation
    Invest(InvestArgs),
    /// Borrowing budget, accessible surfaces and city comparison
    PurchasingPower(PurchasingPowerArgs),
    /// Year-by-year property value projection
    ValueEvolution(ValueEvolutionArgs),
    /// List the city reference data
    Cities(CitiesArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::loan::run_loan(args),
        Commands::Capacity(args) => commands::capacity::run_capacity(args),
        Commands::Tax(args) => commands::tax::run_tax(args),
        Commands::Invest(args) => commands::invest::run_invest(args),
        Commands::PurchasingPower(args) => commands::purchasing_power::run_purchasing_power(args),
        Commands::ValueEvolution(args) => commands::value_evolution::run_value_evolution(args),
        Commands::Cities(args) => commands::cities::run_cities(args),
        Commands::Version => {
            println!("immo {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
