//! End-to-end simulations composed from the calculation core.

#[cfg(feature = "investment")]
pub mod investment;
#[cfg(feature = "purchasing_power")]
pub mod purchasing_power;
#[cfg(feature = "value_evolution")]
pub mod value_evolution;
