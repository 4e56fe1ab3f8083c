use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::advisory::recommendations::{purchasing_power_advice, PurchasingPowerSignals, Recommendation};
use crate::financing::capacity::{
    solve_borrowing_capacity, total_budget, BorrowingCapacityInput, SolverConfig, TotalBudget,
    DEFAULT_APPLICATION_FEES, DEFAULT_INSURANCE_RATE_PCT,
};
use crate::financing::loan::{total_loan_payment, validate_term, LoanPaymentBreakdown};
use crate::market::cities::{
    AffordableSurface, CityCatalog, CityMarketInfo, PropertyType, DEFAULT_COMPARISON_SIZE,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, HUNDRED};
use crate::ImmoSimResult;

/// Minimum monthly budget left to the household in this simulator.
pub const PURCHASING_POWER_MIN_LIVING_EXPENSE: Money = dec!(1050);

fn default_insurance_rate() -> Percent {
    DEFAULT_INSURANCE_RATE_PCT
}

fn default_min_living_expense() -> Money {
    PURCHASING_POWER_MIN_LIVING_EXPENSE
}

fn default_application_fees() -> Money {
    DEFAULT_APPLICATION_FEES
}

fn default_comparison_size() -> usize {
    DEFAULT_COMPARISON_SIZE
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasingPowerInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub monthly_income: Money,
    #[serde(default)]
    pub additional_income: Money,
    #[serde(default)]
    pub current_debt: Money,
    #[serde(default)]
    pub personal_contribution: Money,
    pub annual_rate_pct: Percent,
    pub loan_term_years: u32,
    pub debt_ratio_pct: Percent,
    pub notary_fee_rate_pct: Percent,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default = "default_insurance_rate")]
    pub insurance_rate_pct: Percent,
    #[serde(default = "default_min_living_expense")]
    pub min_living_expense: Money,
    #[serde(default = "default_application_fees")]
    pub application_fees: Money,
    #[serde(default = "default_comparison_size")]
    pub comparison_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSection {
    pub monthly_income: Money,
    pub additional_income: Money,
    pub total_monthly_income: Money,
    pub current_debt: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasingFinancing {
    pub personal_contribution: Money,
    pub borrowing_capacity: Money,
    pub solver_converged: bool,
    pub solver_iterations: u32,
    pub budget: TotalBudget,
    pub payment: LoanPaymentBreakdown,
    /// (instalment + existing debt) / income, in percent
    pub debt_ratio_actual_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasingPowerResult {
    pub income: IncomeSection,
    pub financing: PurchasingFinancing,
    pub city: Option<CityMarketInfo>,
    /// m² reachable in the selected city for each priced property type
    pub accessible_surfaces: BTreeMap<String, Decimal>,
    pub city_comparison: Vec<AffordableSurface>,
    pub advice: Vec<Recommendation>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Borrowing capacity, purchase budget and what it buys, here and elsewhere.
pub fn simulate_purchasing_power(
    input: &PurchasingPowerInput,
    catalog: &CityCatalog,
) -> ImmoSimResult<ComputationOutput<PurchasingPowerResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_term(input.loan_term_years, "loan_term_years")?;

    let city = match input.city.as_deref() {
        Some(name) => Some(catalog.require(name)?),
        None => None,
    };

    let total_income = input.monthly_income + input.additional_income;
    if total_income < dec!(500) {
        warnings.push(format!(
            "Total monthly income of {:.0} is below the 500 minimum",
            total_income
        ));
    }
    if input.debt_ratio_pct > dec!(40) {
        warnings.push(format!(
            "Debt ratio of {:.1}% exceeds the 40% French lending ceiling",
            input.debt_ratio_pct
        ));
    }
    if input.annual_rate_pct <= Decimal::ZERO {
        warnings.push("Interest rate is not positive".into());
    }

    let solution = solve_borrowing_capacity(
        &BorrowingCapacityInput {
            monthly_income: total_income,
            current_debt: input.current_debt,
            debt_ratio_pct: input.debt_ratio_pct,
            annual_rate_pct: input.annual_rate_pct,
            loan_term_years: input.loan_term_years,
            insurance_rate_pct: input.insurance_rate_pct,
            min_living_expense: input.min_living_expense,
        },
        SolverConfig::default(),
    );
    if !solution.converged {
        warnings.push(format!(
            "Capacity solver stopped after {} iterations with a payment gap of {:.2}",
            solution.iterations, solution.payment_gap
        ));
    }
    if solution.living_floor_applied {
        warnings.push(format!(
            "Payment capped by the minimum living budget of {:.0}",
            input.min_living_expense
        ));
    }

    let capacity = solution.capacity;
    let budget = total_budget(
        capacity,
        input.personal_contribution,
        input.notary_fee_rate_pct,
        input.application_fees,
    );
    let payment = total_loan_payment(
        capacity,
        input.annual_rate_pct,
        input.loan_term_years,
        input.insurance_rate_pct,
    );
    let debt_ratio_actual_pct = if total_income > Decimal::ZERO {
        (payment.total_payment + input.current_debt) / total_income * HUNDRED
    } else {
        Decimal::ZERO
    };

    let accessible_surfaces = match city {
        Some(c) => PropertyType::PRICED
            .iter()
            .map(|&t| (format!("{t:?}"), c.affordable_surface(budget.net_budget, t)))
            .collect(),
        None => BTreeMap::new(),
    };
    let city_comparison =
        catalog.affordable_surfaces(budget.net_budget, input.property_type, input.comparison_size);

    let advice = purchasing_power_advice(&PurchasingPowerSignals {
        monthly_income: total_income,
        borrowing_capacity: capacity,
        net_budget: budget.net_budget,
        debt_ratio_pct: debt_ratio_actual_pct,
        loan_term_years: input.loan_term_years,
        contribution: input.personal_contribution,
    });

    let result = PurchasingPowerResult {
        income: IncomeSection {
            monthly_income: input.monthly_income,
            additional_income: input.additional_income,
            total_monthly_income: total_income,
            current_debt: input.current_debt,
        },
        financing: PurchasingFinancing {
            personal_contribution: input.personal_contribution,
            borrowing_capacity: capacity,
            solver_converged: solution.converged,
            solver_iterations: solution.iterations,
            budget,
            payment,
            debt_ratio_actual_pct,
        },
        city: city.cloned(),
        accessible_surfaces,
        city_comparison,
        advice,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Purchasing power (debt-ratio capacity, fees, surface by city)",
        input,
        warnings,
        elapsed,
        result,
    ))
}
