use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImmoSimError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ImmoSimError {
    fn from(e: serde_json::Error) -> Self {
        ImmoSimError::SerializationError(e.to_string())
    }
}
