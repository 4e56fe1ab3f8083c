pub mod capacity;
pub mod cities;
pub mod invest;
pub mod loan;
pub mod purchasing_power;
pub mod tax;
pub mod value_evolution;

use serde::de::DeserializeOwned;

use immo_sim_core::market::CityCatalog;

use crate::input;

/// Typed input from `--input <file>` or piped stdin, `None` when neither
/// is given.
pub fn read_structured<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_input(path)?));
    }
    match input::stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Like `read_structured`, for commands with no flag form.
pub fn require_structured<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    read_structured(path)?
        .ok_or_else(|| format!("--input file (or JSON on stdin) is required for {what}").into())
}

/// A custom catalog loaded from `--cities <file>`, if any. Callers fall
/// back to `CityCatalog::builtin()`.
pub fn load_catalog(path: Option<&str>) -> Result<Option<CityCatalog>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = input::file::read_to_string(path)?;
            Ok(Some(CityCatalog::from_json(&json)?))
        }
        None => Ok(None),
    }
}
