use std::sync::OnceLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ImmoSimError;
use crate::returns::yields::round_half_away;
use crate::types::{pct, Money, Percent};
use crate::ImmoSimResult;

/// Yearly appreciation assumed when no city is supplied.
pub const DEFAULT_ANNUAL_GROWTH_PCT: Percent = dec!(1.5);

/// City comparisons list this many cities unless told otherwise.
pub const DEFAULT_COMPARISON_SIZE: usize = 10;

/// Average price per m² at which a city scores zero on price.
const PRICE_ATTRACTIVITY_CEILING: Decimal = dec!(12000);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    Apartment,
    House,
    Studio,
    Loft,
    Other,
}

impl PropertyType {
    /// Types with a dedicated price column in the reference data.
    pub const PRICED: [PropertyType; 3] =
        [PropertyType::Apartment, PropertyType::House, PropertyType::Studio];
}

/// Construction-age bracket of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyAge {
    New,
    Recent,
    #[default]
    Standard,
    Old,
    VeryOld,
}

impl PropertyAge {
    /// Premium or discount on the market price per m².
    pub fn value_factor(self) -> Decimal {
        match self {
            PropertyAge::New => dec!(1.1),
            PropertyAge::Recent => dec!(1.05),
            PropertyAge::Standard => Decimal::ONE,
            PropertyAge::Old => dec!(0.95),
            PropertyAge::VeryOld => dec!(0.9),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthCategory {
    Negative,
    Low,
    Medium,
    High,
}

/// Market reference figures for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMarketInfo {
    pub name: String,
    #[serde(default)]
    pub region: String,
    /// Average price per m², all property types
    pub price_per_sqm: Money,
    pub annual_price_growth_pct: Percent,
    #[serde(default)]
    pub apartment_price_per_sqm: Money,
    #[serde(default)]
    pub house_price_per_sqm: Money,
    #[serde(default)]
    pub studio_price_per_sqm: Money,
    /// Monthly rent per m²
    pub rent_per_sqm: Money,
    pub property_tax_rate_pct: Percent,
    /// 0-10
    pub economic_dynamism: u8,
    /// 0-10
    #[serde(default)]
    pub transport_quality: u8,
    pub population_growth_pct: Percent,
}

/// Surface a budget buys in one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordableSurface {
    pub city: String,
    pub price_per_sqm: Money,
    pub surface_sqm: Decimal,
    pub attractivity_index: Decimal,
}

/// Immutable set of cities, looked up by exact name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCatalog {
    cities: Vec<CityMarketInfo>,
}

// ---------------------------------------------------------------------------
// City figures
// ---------------------------------------------------------------------------

impl CityMarketInfo {
    /// 0-10 blend of economy, transport, population growth and price level.
    pub fn attractivity_index(&self) -> Decimal {
        let economic = Decimal::from(self.economic_dynamism) * dec!(0.4);
        let transport = Decimal::from(self.transport_quality) * dec!(0.2);
        let growth = self.population_growth_pct * dec!(2);
        let price = (Decimal::ONE - self.price_per_sqm / PRICE_ATTRACTIVITY_CEILING) * dec!(3);
        (economic + transport + growth + price).clamp(Decimal::ZERO, dec!(10))
    }

    pub fn growth_category(&self) -> GrowthCategory {
        let growth = self.annual_price_growth_pct;
        if growth < Decimal::ZERO {
            GrowthCategory::Negative
        } else if growth < Decimal::ONE {
            GrowthCategory::Low
        } else if growth < dec!(2.5) {
            GrowthCategory::Medium
        } else {
            GrowthCategory::High
        }
    }

    /// Type-specific price per m², the city average for other types or when
    /// the type column is missing.
    pub fn price_per_sqm_for(&self, property_type: PropertyType) -> Money {
        let specific = match property_type {
            PropertyType::Apartment => self.apartment_price_per_sqm,
            PropertyType::House => self.house_price_per_sqm,
            PropertyType::Studio => self.studio_price_per_sqm,
            PropertyType::Loft | PropertyType::Other => Decimal::ZERO,
        };
        if specific > Decimal::ZERO {
            specific
        } else {
            self.price_per_sqm
        }
    }

    /// Market rent for `area` m², whole euros.
    pub fn suggest_monthly_rent(&self, area: Decimal) -> Money {
        if area <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_half_away(self.rent_per_sqm * area)
    }

    /// Yearly property tax for a purchase price, whole euros.
    pub fn suggest_property_tax(&self, price: Money) -> Money {
        if price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_half_away(price * pct(self.property_tax_rate_pct))
    }

    /// m² reachable with `budget`; 0 when the city has no usable price.
    pub fn affordable_surface(&self, budget: Money, property_type: PropertyType) -> Decimal {
        let price = self.price_per_sqm_for(property_type);
        if price <= Decimal::ZERO || budget <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        budget / price
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

static BUILTIN: OnceLock<CityCatalog> = OnceLock::new();

impl CityCatalog {
    pub fn new(cities: Vec<CityMarketInfo>) -> Self {
        Self { cities }
    }

    /// The bundled catalog of 20 French cities, built on first use.
    pub fn builtin() -> &'static CityCatalog {
        BUILTIN.get_or_init(|| CityCatalog::new(builtin_cities()))
    }

    /// Catalog from a JSON array of cities.
    pub fn from_json(json: &str) -> ImmoSimResult<Self> {
        let cities: Vec<CityMarketInfo> = serde_json::from_str(json)?;
        if cities.is_empty() {
            return Err(ImmoSimError::InsufficientData(
                "city catalog contains no cities".into(),
            ));
        }
        Ok(Self::new(cities))
    }

    pub fn cities(&self) -> &[CityMarketInfo] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Exact, case-sensitive name lookup.
    pub fn find(&self, name: &str) -> Option<&CityMarketInfo> {
        self.cities.iter().find(|c| c.name == name)
    }

    pub fn require(&self, name: &str) -> ImmoSimResult<&CityMarketInfo> {
        self.find(name)
            .ok_or_else(|| ImmoSimError::CityNotFound(name.to_string()))
    }

    pub fn suggest_monthly_rent(&self, name: &str, area: Decimal) -> ImmoSimResult<Money> {
        Ok(self.require(name)?.suggest_monthly_rent(area))
    }

    pub fn suggest_property_tax(&self, name: &str, price: Money) -> ImmoSimResult<Money> {
        Ok(self.require(name)?.suggest_property_tax(price))
    }

    /// Cities ranked by the surface `budget` buys, largest first. Cities
    /// where nothing is reachable are left out.
    pub fn affordable_surfaces(
        &self,
        budget: Money,
        property_type: PropertyType,
        top_n: usize,
    ) -> Vec<AffordableSurface> {
        if budget <= Decimal::ZERO {
            return Vec::new();
        }
        let mut ranked: Vec<AffordableSurface> = self
            .cities
            .iter()
            .map(|c| AffordableSurface {
                city: c.name.clone(),
                price_per_sqm: c.price_per_sqm_for(property_type),
                surface_sqm: c.affordable_surface(budget, property_type),
                attractivity_index: c.attractivity_index(),
            })
            .filter(|s| s.surface_sqm > Decimal::ZERO)
            .collect();
        ranked.sort_by(|a, b| b.surface_sqm.cmp(&a.surface_sqm));
        ranked.truncate(top_n);
        ranked
    }
}

#[allow(clippy::too_many_arguments)]
fn city(
    name: &str,
    region: &str,
    price_per_sqm: Money,
    annual_price_growth_pct: Percent,
    [apartment, house, studio]: [Money; 3],
    rent_per_sqm: Money,
    property_tax_rate_pct: Percent,
    economic_dynamism: u8,
    transport_quality: u8,
    population_growth_pct: Percent,
) -> CityMarketInfo {
    CityMarketInfo {
        name: name.to_string(),
        region: region.to_string(),
        price_per_sqm,
        annual_price_growth_pct,
        apartment_price_per_sqm: apartment,
        house_price_per_sqm: house,
        studio_price_per_sqm: studio,
        rent_per_sqm,
        property_tax_rate_pct,
        economic_dynamism,
        transport_quality,
        population_growth_pct,
    }
}

fn builtin_cities() -> Vec<CityMarketInfo> {
    vec![
        city("Paris", "Île-de-France", dec!(10500), dec!(1.5), [dec!(11200), dec!(9800), dec!(12300)], dec!(31.2), dec!(1.2), 9, 9, dec!(0.3)),
        city("Lyon", "Auvergne-Rhône-Alpes", dec!(5200), dec!(3.2), [dec!(5500), dec!(4800), dec!(6000)], dec!(15.5), dec!(0.9), 8, 8, dec!(0.7)),
        city("Marseille", "Provence-Alpes-Côte d'Azur", dec!(3200), dec!(2.1), [dec!(3400), dec!(3000), dec!(3800)], dec!(13.2), dec!(1.4), 6, 6, dec!(0.3)),
        city("Bordeaux", "Nouvelle-Aquitaine", dec!(4500), dec!(2.8), [dec!(4800), dec!(4200), dec!(5300)], dec!(14.8), dec!(1.1), 7, 7, dec!(1.1)),
        city("Lille", "Hauts-de-France", dec!(3300), dec!(2.3), [dec!(3500), dec!(3100), dec!(4000)], dec!(13.5), dec!(1.3), 7, 7, dec!(0.4)),
        city("Nantes", "Pays de la Loire", dec!(3800), dec!(3.5), [dec!(4100), dec!(3600), dec!(4500)], dec!(13.8), dec!(1.0), 8, 7, dec!(1.2)),
        city("Strasbourg", "Grand Est", dec!(3400), dec!(2.2), [dec!(3600), dec!(3200), dec!(4000)], dec!(13.0), dec!(1.2), 7, 8, dec!(0.5)),
        city("Montpellier", "Occitanie", dec!(3300), dec!(2.6), [dec!(3500), dec!(3100), dec!(3900)], dec!(14.0), dec!(1.5), 7, 6, dec!(1.3)),
        city("Rennes", "Bretagne", dec!(3500), dec!(3.2), [dec!(3700), dec!(3300), dec!(4100)], dec!(13.2), dec!(1.1), 7, 7, dec!(0.9)),
        city("Nice", "Provence-Alpes-Côte d'Azur", dec!(4300), dec!(1.8), [dec!(4600), dec!(4000), dec!(5000)], dec!(16.5), dec!(1.3), 6, 7, dec!(0.2)),
        city("Toulouse", "Occitanie", dec!(3500), dec!(2.9), [dec!(3700), dec!(3300), dec!(4100)], dec!(13.5), dec!(1.2), 8, 7, dec!(1.0)),
        city("Grenoble", "Auvergne-Rhône-Alpes", dec!(2800), dec!(1.5), [dec!(3000), dec!(2600), dec!(3300)], dec!(12.5), dec!(1.2), 7, 7, dec!(0.3)),
        city("Dijon", "Bourgogne-Franche-Comté", dec!(2500), dec!(1.8), [dec!(2700), dec!(2300), dec!(3000)], dec!(11.8), dec!(1.3), 6, 6, dec!(0.2)),
        city("Angers", "Pays de la Loire", dec!(2600), dec!(2.7), [dec!(2800), dec!(2400), dec!(3100)], dec!(11.5), dec!(1.1), 6, 6, dec!(0.6)),
        city("Tours", "Centre-Val de Loire", dec!(2600), dec!(2.2), [dec!(2800), dec!(2400), dec!(3100)], dec!(11.8), dec!(1.2), 6, 6, dec!(0.4)),
        city("Reims", "Grand Est", dec!(2400), dec!(2.0), [dec!(2600), dec!(2200), dec!(2900)], dec!(11.2), dec!(1.3), 5, 6, dec!(0.3)),
        city("Caen", "Normandie", dec!(2400), dec!(1.7), [dec!(2600), dec!(2200), dec!(2900)], dec!(11.0), dec!(1.4), 5, 5, dec!(0.2)),
        city("Le Mans", "Pays de la Loire", dec!(1800), dec!(1.5), [dec!(2000), dec!(1600), dec!(2200)], dec!(9.8), dec!(1.3), 5, 6, dec!(0.1)),
        city("Clermont-Ferrand", "Auvergne-Rhône-Alpes", dec!(2200), dec!(1.9), [dec!(2400), dec!(2000), dec!(2700)], dec!(10.5), dec!(1.3), 6, 5, dec!(0.3)),
        city("Aix-en-Provence", "Provence-Alpes-Côte d'Azur", dec!(4600), dec!(2.0), [dec!(4900), dec!(4300), dec!(5400)], dec!(15.8), dec!(1.2), 7, 6, dec!(0.6)),
    ]
}
