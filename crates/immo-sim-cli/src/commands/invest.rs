use clap::Args;
use serde_json::Value;

use immo_sim_core::market::CityCatalog;
use immo_sim_core::simulators::investment::{self, InvestmentInput};

use super::{load_catalog, require_structured};

/// Arguments for a rental investment simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct InvestArgs {
    /// Path to JSON/YAML input file (or pipe JSON on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON city catalog replacing the built-in one
    #[arg(long)]
    pub cities: Option<String>,

    /// Override the projection horizon in years
    #[arg(long)]
    pub horizon: Option<u32>,
}

pub fn run_invest(args: InvestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut invest_input: InvestmentInput =
        require_structured(args.input.as_deref(), "an investment simulation")?;
    if args.horizon.is_some() {
        invest_input.horizon_years = args.horizon;
    }

    let custom = load_catalog(args.cities.as_deref())?;
    let catalog = custom.as_ref().unwrap_or_else(|| CityCatalog::builtin());

    let result = investment::simulate_investment(&invest_input, catalog)?;
    Ok(serde_json::to_value(result)?)
}
