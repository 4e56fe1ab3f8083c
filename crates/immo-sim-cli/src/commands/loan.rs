use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_sim_core::financing::loan::{self, LoanTerms};

use super::read_structured;

/// Arguments for loan analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 3.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Borrower insurance, annual percent of the principal
    #[arg(long, default_value = "0")]
    pub insurance_rate: Decimal,

    /// Include the month-by-month schedule
    #[arg(long)]
    pub monthly_schedule: bool,
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = match read_structured(args.input.as_deref())? {
        Some(terms) => terms,
        None => LoanTerms {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            term_years: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            insurance_rate_pct: args.insurance_rate,
        },
    };

    let result = loan::analyze_loan(&terms, args.monthly_schedule)?;
    Ok(serde_json::to_value(result)?)
}
