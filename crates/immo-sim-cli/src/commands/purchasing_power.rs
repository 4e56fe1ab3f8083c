use clap::Args;
use serde_json::Value;

use immo_sim_core::market::CityCatalog;
use immo_sim_core::simulators::purchasing_power::{self, PurchasingPowerInput};

use super::{load_catalog, require_structured};

/// Arguments for a purchasing power simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PurchasingPowerArgs {
    /// Path to JSON/YAML input file (or pipe JSON on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON city catalog replacing the built-in one
    #[arg(long)]
    pub cities: Option<String>,
}

pub fn run_purchasing_power(
    args: PurchasingPowerArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let pp_input: PurchasingPowerInput =
        require_structured(args.input.as_deref(), "a purchasing power simulation")?;

    let custom = load_catalog(args.cities.as_deref())?;
    let catalog = custom.as_ref().unwrap_or_else(|| CityCatalog::builtin());

    let result = purchasing_power::simulate_purchasing_power(&pp_input, catalog)?;
    Ok(serde_json::to_value(result)?)
}
