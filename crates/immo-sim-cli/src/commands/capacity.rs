use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_sim_core::financing::capacity::{
    self, BorrowingCapacityInput, SolverConfig, DEFAULT_INSURANCE_RATE_PCT,
    DEFAULT_MIN_LIVING_EXPENSE,
};

use super::read_structured;

/// Arguments for borrowing capacity
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CapacityArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net monthly household income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Monthly repayments on existing loans
    #[arg(long, default_value = "0")]
    pub current_debt: Decimal,

    /// Maximum debt-to-income ratio in percent
    #[arg(long, default_value = "35")]
    pub debt_ratio: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Borrower insurance, annual percent of the principal
    #[arg(long)]
    pub insurance_rate: Option<Decimal>,

    /// Minimum monthly budget left after debt service
    #[arg(long)]
    pub min_living_expense: Option<Decimal>,

    /// Solver iteration cap
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

pub fn run_capacity(args: CapacityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let capacity_input: BorrowingCapacityInput = match read_structured(args.input.as_deref())? {
        Some(input) => input,
        None => BorrowingCapacityInput {
            monthly_income: args
                .income
                .ok_or("--income is required (or provide --input)")?,
            current_debt: args.current_debt,
            debt_ratio_pct: args.debt_ratio,
            annual_rate_pct: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            loan_term_years: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            insurance_rate_pct: args.insurance_rate.unwrap_or(DEFAULT_INSURANCE_RATE_PCT),
            min_living_expense: args.min_living_expense.unwrap_or(DEFAULT_MIN_LIVING_EXPENSE),
        },
    };

    let mut config = SolverConfig::default();
    if let Some(max) = args.max_iterations {
        config.max_iterations = max;
    }

    let result = capacity::analyze_borrowing_capacity(&capacity_input, config)?;
    Ok(serde_json::to_value(result)?)
}
