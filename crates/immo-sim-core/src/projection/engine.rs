use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::growth::GrowthModel;
use crate::error::ImmoSimError;
use crate::financing::loan::LoanTerms;
use crate::types::{pct, Money, Percent, MONTHS_PER_YEAR};
use crate::ImmoSimResult;

/// Shortest projection, in years, whatever the loan term.
pub const MIN_PROJECTION_YEARS: u32 = 20;
/// Longest projection accepted.
pub const MAX_PROJECTION_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the yearly projection needs, already resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionAssumptions {
    /// Property value at year 0
    pub initial_value: Money,
    pub loan: LoanTerms,
    /// Gross monthly rent before vacancy and unpaid rent
    pub monthly_rent: Money,
    pub vacancy_rate_pct: Percent,
    pub unpaid_rate_pct: Percent,
    /// Yearly rent indexation; running costs inflate at half this rate
    pub rent_increase_pct: Percent,
    /// Monthly running costs excluding the loan
    pub monthly_expenses: Money,
    pub horizon_years: u32,
}

/// State at the end of one projection year. Year 0 is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub property_value: Money,
    /// Appreciation applied to reach this year, in percent
    pub growth_pct: Percent,
    pub loan_balance: Money,
    /// Rent actually collected this year
    pub yearly_rent: Money,
    /// Running costs plus loan payments
    pub yearly_expenses: Money,
    pub yearly_cashflow: Money,
    pub cumulative_cashflow: Money,
    pub equity: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub growth_model: String,
    pub horizon_years: u32,
    pub years: Vec<ProjectionYear>,
    pub final_property_value: Money,
    pub final_loan_balance: Money,
    pub total_cashflow: Money,
    pub final_equity: Money,
}

impl ProjectionSummary {
    /// Cash-flows of years 1..=horizon, in order.
    pub fn yearly_cashflows(&self) -> Vec<Money> {
        self.years
            .iter()
            .skip(1)
            .map(|y| y.yearly_cashflow)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn projection_horizon(loan_term_years: u32) -> u32 {
    loan_term_years.max(MIN_PROJECTION_YEARS)
}

/// `InvalidInput` on `field` when `years` exceeds `MAX_PROJECTION_YEARS`.
pub fn validate_horizon(years: u32, field: &str) -> ImmoSimResult<()> {
    if years > MAX_PROJECTION_YEARS {
        return Err(ImmoSimError::InvalidInput {
            field: field.into(),
            reason: format!(
                "Projection horizon must not exceed {MAX_PROJECTION_YEARS} years, got {years}"
            ),
        });
    }
    Ok(())
}

fn overflow(year: u32) -> ImmoSimError {
    ImmoSimError::Overflow {
        context: format!("projection year {year}"),
    }
}

/// Steps the property, loan and rental flows one year at a time.
///
/// The loan balance is read off the annual amortization schedule and is
/// 0 once the term has run out. Rent compounds at `rent_increase_pct`,
/// running costs at half of it. Income tax is left out of the yearly
/// cash-flow.
///
/// Fails for a horizon above `MAX_PROJECTION_YEARS`, or when compounding
/// leaves the `Decimal` range.
pub fn project(
    assumptions: &ProjectionAssumptions,
    growth: &mut impl GrowthModel,
) -> ImmoSimResult<ProjectionSummary> {
    validate_horizon(assumptions.horizon_years, "horizon_years")?;

    let loan = &assumptions.loan;
    let schedule = loan.annual_schedule();
    let yearly_loan_payment = loan.payment_breakdown().total_payment * MONTHS_PER_YEAR;
    let occupancy = (Decimal::ONE - pct(assumptions.vacancy_rate_pct))
        * (Decimal::ONE - pct(assumptions.unpaid_rate_pct));
    let rent_factor = Decimal::ONE + pct(assumptions.rent_increase_pct);
    let expense_factor = Decimal::ONE + pct(assumptions.rent_increase_pct) / dec!(2);
    let base_yearly_rent = assumptions.monthly_rent * MONTHS_PER_YEAR;
    let base_yearly_expenses = assumptions.monthly_expenses * MONTHS_PER_YEAR;

    let initial_balance = if schedule.is_empty() {
        Decimal::ZERO
    } else {
        loan.principal.max(Decimal::ZERO)
    };

    let mut years = Vec::with_capacity(assumptions.horizon_years as usize + 1);
    years.push(ProjectionYear {
        year: 0,
        property_value: assumptions.initial_value,
        growth_pct: Decimal::ZERO,
        loan_balance: initial_balance,
        yearly_rent: Decimal::ZERO,
        yearly_expenses: Decimal::ZERO,
        yearly_cashflow: Decimal::ZERO,
        cumulative_cashflow: Decimal::ZERO,
        equity: assumptions.initial_value - initial_balance,
    });

    let mut value = assumptions.initial_value;
    let mut rent_index = Decimal::ONE;
    let mut expense_index = Decimal::ONE;
    let mut cumulative = Decimal::ZERO;

    for year in 1..=assumptions.horizon_years {
        if year > 1 {
            rent_index = rent_index.checked_mul(rent_factor).ok_or_else(|| overflow(year))?;
            expense_index = expense_index
                .checked_mul(expense_factor)
                .ok_or_else(|| overflow(year))?;
        }

        let growth_pct = growth.annual_growth_pct(year);
        value = value
            .checked_mul(Decimal::ONE + pct(growth_pct))
            .ok_or_else(|| overflow(year))?
            .max(Decimal::ZERO);

        let yearly_rent = base_yearly_rent
            .checked_mul(rent_index)
            .and_then(|r| r.checked_mul(occupancy))
            .ok_or_else(|| overflow(year))?;
        let running_costs = base_yearly_expenses
            .checked_mul(expense_index)
            .ok_or_else(|| overflow(year))?;
        let in_term = year <= loan.term_years;
        let loan_payments = if in_term { yearly_loan_payment } else { Decimal::ZERO };
        let yearly_expenses = running_costs
            .checked_add(loan_payments)
            .ok_or_else(|| overflow(year))?;
        let yearly_cashflow = yearly_rent
            .checked_sub(yearly_expenses)
            .ok_or_else(|| overflow(year))?;
        cumulative = cumulative
            .checked_add(yearly_cashflow)
            .ok_or_else(|| overflow(year))?;

        let loan_balance = if in_term {
            schedule
                .get(year as usize - 1)
                .map(|e| e.remaining_principal.max(Decimal::ZERO))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        years.push(ProjectionYear {
            year,
            property_value: value,
            growth_pct,
            loan_balance,
            yearly_rent,
            yearly_expenses,
            yearly_cashflow,
            cumulative_cashflow: cumulative,
            equity: value - loan_balance,
        });
    }

    let last = &years[years.len() - 1];
    Ok(ProjectionSummary {
        growth_model: growth.name().to_string(),
        horizon_years: assumptions.horizon_years,
        final_property_value: last.property_value,
        final_loan_balance: last.loan_balance,
        total_cashflow: last.cumulative_cashflow,
        final_equity: last.equity,
        years,
    })
}
