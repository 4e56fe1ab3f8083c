use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use immo_sim_core::market::{CityCatalog, PropertyType};

use super::load_catalog;

/// Arguments for the city listing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CitiesArgs {
    /// JSON city catalog replacing the built-in one
    #[arg(long)]
    pub cities: Option<String>,

    /// Show a single city
    #[arg(long)]
    pub name: Option<String>,

    /// Rank cities by the surface this budget buys
    #[arg(long)]
    pub budget: Option<Decimal>,

    /// Apartment, House or Studio (used with --budget)
    #[arg(long, default_value = "Apartment")]
    pub property_type: String,

    /// Number of cities in the ranking
    #[arg(long, default_value = "10")]
    pub top: usize,
}

pub fn run_cities(args: CitiesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let custom = load_catalog(args.cities.as_deref())?;
    let catalog = custom.as_ref().unwrap_or_else(|| CityCatalog::builtin());

    if let Some(ref name) = args.name {
        let city = catalog.require(name)?;
        return Ok(json!({
            "result": city,
            "attractivity_index": city.attractivity_index(),
            "growth_category": city.growth_category(),
        }));
    }

    if let Some(budget) = args.budget {
        let property_type = parse_property_type(&args.property_type)?;
        let ranked = catalog.affordable_surfaces(budget, property_type, args.top);
        return Ok(serde_json::to_value(ranked)?);
    }

    Ok(serde_json::to_value(catalog.cities())?)
}

fn parse_property_type(name: &str) -> Result<PropertyType, Box<dyn std::error::Error>> {
    PropertyType::PRICED
        .into_iter()
        .find(|t| format!("{t:?}").eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            format!("Unknown property type '{name}' (expected Apartment, House or Studio)").into()
        })
}
