pub mod engine;
pub mod growth;

pub use engine::{
    project, projection_horizon, validate_horizon, ProjectionAssumptions, ProjectionSummary,
    ProjectionYear, MAX_PROJECTION_YEARS,
};
pub use growth::{CityRateGrowth, GrowthModel, RenovationBoost};
#[cfg(feature = "value_evolution")]
pub use growth::CompositeMarketGrowth;
