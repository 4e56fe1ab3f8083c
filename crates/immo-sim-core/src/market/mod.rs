pub mod cities;

pub use cities::{CityCatalog, CityMarketInfo, GrowthCategory, PropertyAge, PropertyType};
