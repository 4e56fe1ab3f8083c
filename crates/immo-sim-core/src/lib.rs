pub mod advisory;
pub mod error;
pub mod financing;
pub mod fiscal;
pub mod market;
pub mod projection;
pub mod returns;
pub mod simulators;
pub mod time_value;
pub mod types;

pub use error::ImmoSimError;
pub use types::*;

/// Standard result type for all simulation operations
pub type ImmoSimResult<T> = Result<T, ImmoSimError>;
