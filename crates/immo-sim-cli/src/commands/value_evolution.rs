use clap::Args;
use serde_json::Value;

use immo_sim_core::market::CityCatalog;
use immo_sim_core::simulators::value_evolution::{self, ValueEvolutionInput};

use super::{load_catalog, require_structured};

/// Arguments for a property value projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ValueEvolutionArgs {
    /// Path to JSON/YAML input file (or pipe JSON on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON city catalog replacing the built-in one
    #[arg(long)]
    pub cities: Option<String>,

    /// Random seed for a reproducible projection
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_value_evolution(args: ValueEvolutionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut ve_input: ValueEvolutionInput =
        require_structured(args.input.as_deref(), "a value evolution projection")?;
    if args.seed.is_some() {
        ve_input.seed = args.seed;
    }

    let custom = load_catalog(args.cities.as_deref())?;
    let catalog = custom.as_ref().unwrap_or_else(|| CityCatalog::builtin());

    let result = value_evolution::simulate_value_evolution(&ve_input, catalog)?;
    Ok(serde_json::to_value(result)?)
}
