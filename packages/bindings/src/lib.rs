use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use immo_sim_core::financing::capacity::{self, BorrowingCapacityInput, SolverConfig};
use immo_sim_core::financing::loan::{self, LoanTerms};
use immo_sim_core::fiscal::regimes::{self, RentalTaxInput};
use immo_sim_core::market::CityCatalog;
use immo_sim_core::simulators::{investment, purchasing_power, value_evolution};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct LoanRequest {
    #[serde(flatten)]
    terms: LoanTerms,
    #[serde(default)]
    include_monthly_schedule: bool,
}

#[derive(Deserialize)]
struct CapacityRequest {
    #[serde(flatten)]
    input: BorrowingCapacityInput,
    #[serde(default)]
    solver: Option<SolverConfig>,
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let request: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan::analyze_loan(&request.terms, request.include_monthly_schedule)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn borrowing_capacity(input_json: String) -> NapiResult<String> {
    let request: CapacityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = capacity::analyze_borrowing_capacity(
        &request.input,
        request.solver.unwrap_or_default(),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rental_tax(input_json: String) -> NapiResult<String> {
    let input: RentalTaxInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = regimes::analyze_rental_tax(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulators
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_investment(input_json: String) -> NapiResult<String> {
    let input: investment::InvestmentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = investment::simulate_investment(&input, CityCatalog::builtin())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_purchasing_power(input_json: String) -> NapiResult<String> {
    let input: purchasing_power::PurchasingPowerInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = purchasing_power::simulate_purchasing_power(&input, CityCatalog::builtin())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_value_evolution(input_json: String) -> NapiResult<String> {
    let input: value_evolution::ValueEvolutionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = value_evolution::simulate_value_evolution(&input, CityCatalog::builtin())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[napi]
pub fn list_cities() -> NapiResult<String> {
    serde_json::to_string(CityCatalog::builtin().cities()).map_err(to_napi_error)
}
