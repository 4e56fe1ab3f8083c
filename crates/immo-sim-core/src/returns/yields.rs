use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::error::ImmoSimError;
use crate::types::{pct, Money, Percent, HUNDRED};
use crate::ImmoSimResult;

/// Annual rent over acquisition cost, in percent. 0 when the cost is not
/// positive.
pub fn gross_yield(annual_rent: Money, total_cost: Money) -> Percent {
    if total_cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    annual_rent / total_cost * HUNDRED
}

/// Annual rent net of operating expenses over acquisition cost, in percent.
pub fn net_yield(annual_rent: Money, total_cost: Money, annual_expenses: Money) -> Percent {
    if total_cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (annual_rent - annual_expenses) / total_cost * HUNDRED
}

pub fn notary_fees(price: Money, notary_fee_rate_pct: Percent) -> Money {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    price * pct(notary_fee_rate_pct)
}

/// `current × (1 + g)^years`. Identity when there is nothing to grow or no
/// time to grow it in; `Overflow` when the result leaves the `Decimal` range.
pub fn future_value(
    current: Money,
    annual_growth_pct: Percent,
    years: u32,
) -> ImmoSimResult<Money> {
    if years == 0 || current <= Decimal::ZERO || annual_growth_pct.is_zero() {
        return Ok(current);
    }
    (Decimal::ONE + pct(annual_growth_pct))
        .checked_powi(i64::from(years))
        .and_then(|factor| current.checked_mul(factor))
        .ok_or_else(|| overflow("future value"))
}

fn overflow(context: &str) -> ImmoSimError {
    ImmoSimError::Overflow {
        context: context.into(),
    }
}

/// Rent left after the loan, every other monthly expense and tax.
pub fn monthly_cashflow(
    adjusted_rent: Money,
    loan_payment: Money,
    other_monthly_expenses: Money,
    monthly_tax: Money,
) -> Money {
    adjusted_rent - (loan_payment + other_monthly_expenses + monthly_tax)
}

pub fn price_per_sqm(price: Money, area: Decimal) -> Money {
    if area <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    price / area
}

/// Rough taxe foncière from a value and a local rate, whole euros.
pub fn estimate_property_tax(value: Money, tax_rate_pct: Percent) -> Money {
    if value <= Decimal::ZERO || tax_rate_pct <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_away(value * pct(tax_rate_pct))
}

/// Rounds to whole units, halves away from zero.
pub fn round_half_away(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Compound annual growth between two values over `years`, in percent.
pub fn annualized_growth(
    initial: Money,
    final_value: Money,
    years: u32,
) -> ImmoSimResult<Percent> {
    if years == 0 || initial <= Decimal::ZERO || final_value <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let ratio = final_value
        .checked_div(initial)
        .ok_or_else(|| overflow("annualized growth"))?;
    let exponent = Decimal::ONE / Decimal::from(years);
    ratio
        .checked_powd(exponent)
        .and_then(|root| (root - Decimal::ONE).checked_mul(HUNDRED))
        .ok_or_else(|| overflow("annualized growth"))
}

/// Total growth between two values, in percent.
pub fn total_growth(initial: Money, final_value: Money) -> ImmoSimResult<Percent> {
    if initial <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    final_value
        .checked_div(initial)
        .and_then(|ratio| (ratio - Decimal::ONE).checked_mul(HUNDRED))
        .ok_or_else(|| overflow("total growth"))
}

/// Flat building depreciation used for LMNP réel: price over 25 years.
pub fn straight_line_depreciation(price: Money) -> Money {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    price / dec!(25)
}
