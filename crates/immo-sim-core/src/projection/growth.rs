//! Yearly appreciation strategies driving the projection engine.
//!
//! The investment projection compounds the city's historical rate
//! ([`CityRateGrowth`]). The value-evolution projection layers noise, a
//! macro spread and a property cycle on top of it
//! (`CompositeMarketGrowth`).

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::Percent;

/// Long-run economic growth, percent per year.
pub const ECONOMIC_GROWTH_PCT: Percent = dec!(1.5);
/// Long-run inflation, percent per year.
pub const INFLATION_PCT: Percent = dec!(1.8);
/// Share of a renovation budget (as % of value) that turns into growth.
pub const RENOVATION_EFFICIENCY: Decimal = dec!(0.7);
/// Ceiling on the yearly growth a renovation can add, percent.
pub const MAX_RENOVATION_IMPACT_PCT: Percent = dec!(5);

const PI: Decimal = dec!(3.1415926535897932384626433833);
const CYCLE_AMPLITUDE: Decimal = dec!(0.5);
/// The cycle term repeats every 8 years.
const CYCLE_PERIOD_YEARS: u32 = 8;

/// Supplies the appreciation, in percent, applied when moving into `year`.
pub trait GrowthModel {
    fn annual_growth_pct(&mut self, year: u32) -> Percent;

    fn name(&self) -> &'static str;
}

/// Constant yearly rate, usually the city's historical price growth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityRateGrowth {
    pub rate_pct: Percent,
}

impl CityRateGrowth {
    pub fn new(rate_pct: Percent) -> Self {
        Self { rate_pct }
    }
}

impl GrowthModel for CityRateGrowth {
    fn annual_growth_pct(&mut self, _year: u32) -> Percent {
        self.rate_pct
    }

    fn name(&self) -> &'static str {
        "city_rate"
    }
}

/// Half-width of the random band around the base rate: 2 points in year
/// 0, narrowing by 0.1 per year down to 0.5.
pub fn noise_amplitude(year: u32) -> Decimal {
    (dec!(2) - dec!(0.1) * Decimal::from(year)).max(dec!(0.5))
}

/// `sin(year × π/4) × 0.5`, the property-cycle contribution.
pub fn cycle_term(year: u32) -> Decimal {
    let phase = Decimal::from(year % CYCLE_PERIOD_YEARS) * PI / dec!(4);
    phase.checked_sin().unwrap_or(Decimal::ZERO) * CYCLE_AMPLITUDE
}

/// Macro contribution: a fifth of the growth/inflation spread.
pub fn economic_term() -> Decimal {
    (ECONOMIC_GROWTH_PCT - INFLATION_PCT) * dec!(0.2)
}

/// Yearly growth a renovation budget adds once fully phased in.
pub fn renovation_impact_pct(budget: Decimal, value: Decimal) -> Percent {
    if budget <= Decimal::ZERO || value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (budget / value * dec!(100) * RENOVATION_EFFICIENCY).min(MAX_RENOVATION_IMPACT_PCT)
}

/// Adds a renovation impact on top of another model, phased in linearly
/// over the first two years.
#[derive(Debug, Clone)]
pub struct RenovationBoost<G> {
    inner: G,
    impact_pct: Percent,
}

impl<G: GrowthModel> RenovationBoost<G> {
    pub fn new(inner: G, impact_pct: Percent) -> Self {
        Self { inner, impact_pct }
    }

    pub fn applied_impact(&self, year: u32) -> Percent {
        let phase = (Decimal::from(year) / dec!(2)).min(Decimal::ONE);
        self.impact_pct * phase
    }
}

impl<G: GrowthModel> GrowthModel for RenovationBoost<G> {
    fn annual_growth_pct(&mut self, year: u32) -> Percent {
        self.inner.annual_growth_pct(year) + self.applied_impact(year)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(feature = "value_evolution")]
mod composite {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{cycle_term, economic_term, noise_amplitude, GrowthModel};
    use crate::types::Percent;

    /// Base city rate plus shrinking random noise, the macro spread and an
    /// 8-year sinusoidal cycle. Reproducible when built from a seed.
    #[derive(Debug, Clone)]
    pub struct CompositeMarketGrowth {
        base_rate_pct: Percent,
        rng: StdRng,
    }

    impl CompositeMarketGrowth {
        pub fn seeded(base_rate_pct: Percent, seed: u64) -> Self {
            Self {
                base_rate_pct,
                rng: StdRng::seed_from_u64(seed),
            }
        }

        pub fn from_entropy(base_rate_pct: Percent) -> Self {
            Self {
                base_rate_pct,
                rng: StdRng::from_entropy(),
            }
        }

        /// Uniform draw in [0, 1] at six decimal places.
        fn unit_draw(&mut self) -> Decimal {
            Decimal::new(self.rng.gen_range(0..=1_000_000i64), 6)
        }
    }

    impl GrowthModel for CompositeMarketGrowth {
        fn annual_growth_pct(&mut self, year: u32) -> Percent {
            let noise = (self.unit_draw() - dec!(0.5)) * dec!(2) * noise_amplitude(year);
            self.base_rate_pct + noise + economic_term() + cycle_term(year)
        }

        fn name(&self) -> &'static str {
            "composite_market"
        }
    }
}

#[cfg(feature = "value_evolution")]
pub use composite::CompositeMarketGrowth;
