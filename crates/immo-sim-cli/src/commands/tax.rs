use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_sim_core::fiscal::regimes::{
    self, FiscalProfile, FiscalRegime, RentalTaxInput, DEFAULT_SOCIAL_TAX_RATE_PCT,
};

use super::read_structured;

/// Arguments for rental income tax
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TaxArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// MicroFoncier, Real, LmnpMicroBic or LmnpReal
    #[arg(long, default_value = "MicroFoncier")]
    pub regime: String,

    /// Annual rent collected
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Annual deductible expenses (real regimes only)
    #[arg(long, default_value = "0")]
    pub expenses: Decimal,

    /// Marginal income tax rate in percent
    #[arg(long)]
    pub marginal_rate: Option<Decimal>,

    /// Social levies rate in percent
    #[arg(long)]
    pub social_rate: Option<Decimal>,
}

pub fn run_tax(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: RentalTaxInput = match read_structured(args.input.as_deref())? {
        Some(input) => input,
        None => RentalTaxInput {
            annual_rent: args
                .rent
                .ok_or("--rent is required (or provide --input)")?,
            annual_expenses: args.expenses,
            profile: FiscalProfile {
                regime: parse_regime(&args.regime)?,
                marginal_tax_rate_pct: args
                    .marginal_rate
                    .ok_or("--marginal-rate is required (or provide --input)")?,
                social_tax_rate_pct: args.social_rate.unwrap_or(DEFAULT_SOCIAL_TAX_RATE_PCT),
            },
        },
    };

    let result = regimes::analyze_rental_tax(&tax_input);
    Ok(serde_json::to_value(result)?)
}

fn parse_regime(name: &str) -> Result<FiscalRegime, Box<dyn std::error::Error>> {
    FiscalRegime::ALL
        .into_iter()
        .find(|r| format!("{r:?}").eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let expected = "MicroFoncier, Real, LmnpMicroBic or LmnpReal";
            format!("Unknown regime '{name}' (expected {expected})").into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regime_ignores_case() {
        assert_eq!(parse_regime("lmnpreal").unwrap(), FiscalRegime::LmnpReal);
        assert_eq!(parse_regime("MicroFoncier").unwrap(), FiscalRegime::MicroFoncier);
        assert!(parse_regime("pinel").is_err());
    }
}
