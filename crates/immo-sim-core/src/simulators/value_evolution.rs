use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ImmoSimError;
use crate::financing::loan::LoanTerms;
use crate::market::cities::{CityCatalog, CityMarketInfo, PropertyAge, PropertyType};
use crate::projection::engine::{project, validate_horizon, ProjectionAssumptions};
use crate::projection::growth::{
    renovation_impact_pct, CompositeMarketGrowth, RenovationBoost, INFLATION_PCT,
};
use crate::returns::yields::{annualized_growth, total_growth};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::ImmoSimResult;

fn default_rooms() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEvolutionInput {
    /// Required; the growth model starts from this city's price trend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub property_type: PropertyType,
    pub area: Decimal,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
    #[serde(default)]
    pub property_age: PropertyAge,
    pub current_value: Money,
    pub projection_years: u32,
    #[serde(default)]
    pub renovation_budget: Money,
    /// Fixes the random component; omitted means a fresh draw each run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueYear {
    pub year: u32,
    pub value: Money,
    /// Growth applied to reach this year; 0 for the baseline
    pub growth_pct: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfluenceKind {
    Market,
    Demographics,
    UrbanProjects,
    Inflation,
    PropertyCharacteristics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceFactor {
    pub kind: InfluenceKind,
    pub name: String,
    pub description: String,
    pub weight: Decimal,
    pub score: Decimal,
    /// score × weight
    pub impact: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub property_type: PropertyType,
    pub property_age: PropertyAge,
    pub area: Decimal,
    pub rooms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEvolutionResult {
    pub initial_value: Money,
    pub final_value: Money,
    pub total_growth_pct: Percent,
    /// Compound annual growth over the horizon
    pub annualized_growth_pct: Percent,
    pub yearly_values: Vec<ValueYear>,
    pub influence_factors: Vec<InfluenceFactor>,
    pub city: CityMarketInfo,
    pub property: PropertyDetails,
    /// Yearly growth added by the renovation once phased in
    pub renovation_impact_pct: Percent,
    /// Type price per m² × area × age factor, for comparison with the
    /// stated value
    pub estimated_market_value: Money,
    pub growth_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Year-by-year value path under the composite market model. The path is
/// random unless `seed` is set.
pub fn simulate_value_evolution(
    input: &ValueEvolutionInput,
    catalog: &CityCatalog,
) -> ImmoSimResult<ComputationOutput<ValueEvolutionResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let city_name = input.city.as_deref().ok_or_else(|| ImmoSimError::InvalidInput {
        field: "city".into(),
        reason: "Value evolution needs a reference city".into(),
    })?;
    let city = catalog.require(city_name)?;

    validate_input(input, &mut warnings)?;

    let base = match input.seed {
        Some(seed) => CompositeMarketGrowth::seeded(city.annual_price_growth_pct, seed),
        None => CompositeMarketGrowth::from_entropy(city.annual_price_growth_pct),
    };
    let renovation_impact = renovation_impact_pct(input.renovation_budget, input.current_value);
    let mut growth = RenovationBoost::new(base, renovation_impact);

    let assumptions = ProjectionAssumptions {
        initial_value: input.current_value,
        loan: LoanTerms::new(Decimal::ZERO, Decimal::ZERO, 0),
        monthly_rent: Decimal::ZERO,
        vacancy_rate_pct: Decimal::ZERO,
        unpaid_rate_pct: Decimal::ZERO,
        rent_increase_pct: Decimal::ZERO,
        monthly_expenses: Decimal::ZERO,
        horizon_years: input.projection_years,
    };
    let summary = project(&assumptions, &mut growth)?;

    let yearly_values: Vec<ValueYear> = summary
        .years
        .iter()
        .map(|y| ValueYear {
            year: y.year,
            value: y.property_value,
            growth_pct: y.growth_pct,
        })
        .collect();
    let final_value = summary.final_property_value;

    let estimated_market_value = city.price_per_sqm_for(input.property_type)
        * input.area
        * input.property_age.value_factor();

    let result = ValueEvolutionResult {
        initial_value: input.current_value,
        final_value,
        total_growth_pct: total_growth(input.current_value, final_value)?,
        annualized_growth_pct: annualized_growth(
            input.current_value,
            final_value,
            input.projection_years,
        )?,
        yearly_values,
        influence_factors: influence_factors(city, input.property_age, input.property_type),
        city: city.clone(),
        property: PropertyDetails {
            property_type: input.property_type,
            property_age: input.property_age,
            area: input.area,
            rooms: input.rooms,
        },
        renovation_impact_pct: renovation_impact,
        estimated_market_value,
        growth_model: summary.growth_model,
        seed: input.seed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Property value evolution (city trend, macro spread, 8-year cycle, bounded noise, renovation uplift)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

/// The five value drivers scored for this city and property, largest
/// impact first.
pub fn influence_factors(
    city: &CityMarketInfo,
    age: PropertyAge,
    property_type: PropertyType,
) -> Vec<InfluenceFactor> {
    let dynamism = Decimal::from(city.economic_dynamism);

    let age_adjustment = match age {
        PropertyAge::New => dec!(2),
        PropertyAge::Recent => dec!(1),
        PropertyAge::Standard => Decimal::ZERO,
        PropertyAge::Old => dec!(-1),
        PropertyAge::VeryOld => dec!(-2),
    };
    let type_adjustment = match property_type {
        PropertyType::Apartment => dec!(0.5),
        PropertyType::House => dec!(1),
        PropertyType::Studio => dec!(-0.5),
        PropertyType::Loft => dec!(1.5),
        PropertyType::Other => Decimal::ZERO,
    };

    let factor = |kind, name: &str, description: &str, weight: Decimal, score: Decimal| InfluenceFactor {
        kind,
        name: name.to_string(),
        description: description.to_string(),
        weight,
        score,
        impact: score * weight,
    };

    let mut factors = vec![
        factor(
            InfluenceKind::Market,
            "Local property market",
            "General price trend in the city and its region.",
            dec!(0.40),
            city.annual_price_growth_pct * dec!(1.5),
        ),
        factor(
            InfluenceKind::Demographics,
            "Demographics",
            "Population growth and attractiveness of the city.",
            dec!(0.20),
            city.population_growth_pct * dec!(3) + dynamism * dec!(0.5),
        ),
        factor(
            InfluenceKind::UrbanProjects,
            "Urban projects",
            "Planned or ongoing developments and infrastructure.",
            dec!(0.15),
            dynamism * dec!(0.8),
        ),
        factor(
            InfluenceKind::Inflation,
            "Inflation",
            "Pass-through of general inflation to property prices.",
            dec!(0.10),
            INFLATION_PCT * dec!(2),
        ),
        factor(
            InfluenceKind::PropertyCharacteristics,
            "Property characteristics",
            "Type, size and condition of the property.",
            dec!(0.15),
            dec!(5) + age_adjustment + type_adjustment,
        ),
    ];
    factors.sort_by(|a, b| b.impact.cmp(&a.impact));
    factors
}

fn validate_input(input: &ValueEvolutionInput, warnings: &mut Vec<String>) -> ImmoSimResult<()> {
    if input.current_value <= Decimal::ZERO {
        return Err(ImmoSimError::InvalidInput {
            field: "current_value".into(),
            reason: "Current value must be positive".into(),
        });
    }
    validate_horizon(input.projection_years, "projection_years")?;
    if input.current_value < dec!(10000) {
        warnings.push(format!(
            "Current value of {:.0} is below the 10 000 minimum",
            input.current_value
        ));
    }
    if input.area < dec!(9) {
        warnings.push(format!("Area of {} m² is below the 9 m² minimum", input.area));
    }
    if input.rooms == 0 {
        warnings.push("A property needs at least one room".into());
    }
    if input.projection_years == 0 {
        warnings.push("Projection horizon of 0 years: only the baseline is returned".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> ValueEvolutionInput {
        ValueEvolutionInput {
            city: Some("Nantes".into()),
            property_type: PropertyType::Apartment,
            area: dec!(65),
            rooms: 3,
            property_age: PropertyAge::Recent,
            current_value: dec!(260000),
            projection_years: 10,
            renovation_budget: Decimal::ZERO,
            seed: Some(2024),
        }
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let a = simulate_value_evolution(&sample_input(), CityCatalog::builtin()).unwrap();
        let b = simulate_value_evolution(&sample_input(), CityCatalog::builtin()).unwrap();
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn test_baseline_and_length() {
        let out = simulate_value_evolution(&sample_input(), CityCatalog::builtin()).unwrap();
        let years = &out.result.yearly_values;
        assert_eq!(years.len(), 11);
        assert_eq!(years[0].value, dec!(260000));
        assert_eq!(years[0].growth_pct, Decimal::ZERO);
        assert_eq!(out.result.final_value, years[10].value);
        assert_eq!(out.result.growth_model, "composite_market");
    }

    #[test]
    fn test_missing_city_is_invalid_input() {
        let mut input = sample_input();
        input.city = None;
        assert!(matches!(
            simulate_value_evolution(&input, CityCatalog::builtin()),
            Err(ImmoSimError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unknown_city_is_error() {
        let mut input = sample_input();
        input.city = Some("Nowhere".into());
        assert!(matches!(
            simulate_value_evolution(&input, CityCatalog::builtin()),
            Err(ImmoSimError::CityNotFound(_))
        ));
    }

    #[test]
    fn test_renovation_lifts_growth() {
        let plain = simulate_value_evolution(&sample_input(), CityCatalog::builtin()).unwrap();
        let mut input = sample_input();
        input.renovation_budget = dec!(26000);
        let renovated = simulate_value_evolution(&input, CityCatalog::builtin()).unwrap();
        // 26000 / 260000 * 100 * 0.7 = 7, capped at 5
        assert_eq!(renovated.result.renovation_impact_pct, dec!(5));
        assert!(renovated.result.final_value > plain.result.final_value);
        let y1 = renovated.result.yearly_values[1].growth_pct - plain.result.yearly_values[1].growth_pct;
        assert_eq!(y1, dec!(2.5));
    }

    #[test]
    fn test_estimated_market_value() {
        let out = simulate_value_evolution(&sample_input(), CityCatalog::builtin()).unwrap();
        // 4100 * 65 * 1.05
        assert_eq!(out.result.estimated_market_value, dec!(279825));
    }

    #[test]
    fn test_influence_factors_sorted() {
        let nantes = CityCatalog::builtin().require("Nantes").unwrap();
        let factors = influence_factors(nantes, PropertyAge::Recent, PropertyType::Apartment);
        assert_eq!(factors.len(), 5);
        assert!(factors.windows(2).all(|w| w[0].impact >= w[1].impact));
        let market = factors.iter().find(|f| f.kind == InfluenceKind::Market).unwrap();
        assert_eq!(market.score, dec!(5.25));
        assert_eq!(market.impact, dec!(2.1));
    }

    #[test]
    fn test_growth_totals_consistent() {
        let out = simulate_value_evolution(&sample_input(), CityCatalog::builtin()).unwrap();
        let r = &out.result;
        assert_eq!(
            r.total_growth_pct,
            total_growth(r.initial_value, r.final_value).unwrap()
        );
    }
}
