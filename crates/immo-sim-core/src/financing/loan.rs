use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ImmoSimError;
use crate::types::{pct, with_metadata, ComputationOutput, Money, Percent, Rate, MONTHS_PER_YEAR};
use crate::ImmoSimResult;

/// Longest repayment period accepted by the simulators, in years.
pub const MAX_LOAN_TERM_YEARS: u32 = 50;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fixed-rate amortising loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: Money,
    /// Nominal annual interest rate in percent; 0 means an interest-free loan
    pub annual_rate_pct: Percent,
    /// Repayment period in years
    pub term_years: u32,
    /// Borrower insurance, annual percent of the initial principal
    #[serde(default)]
    pub insurance_rate_pct: Percent,
}

/// One line of an amortization table. `period` is a month number for the
/// monthly schedule and a year number for the annual one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub period: u32,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_principal: Money,
}

/// Monthly instalment split between loan repayment and insurance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanPaymentBreakdown {
    pub total_payment: Money,
    pub loan_payment: Money,
    pub insurance_payment: Money,
}

/// Full cost analysis of a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub monthly_payment: Money,
    pub monthly_insurance: Money,
    pub total_monthly_payment: Money,
    pub total_interest: Money,
    pub total_insurance: Money,
    /// Principal + interest + insurance over the whole term
    pub total_cost: Money,
    pub annual_schedule: Vec<AmortizationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_schedule: Option<Vec<AmortizationEntry>>,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_pct: Percent, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate_pct,
            term_years,
            insurance_rate_pct: Decimal::ZERO,
        }
    }

    pub fn with_insurance(mut self, insurance_rate_pct: Percent) -> Self {
        self.insurance_rate_pct = insurance_rate_pct;
        self
    }

    /// Rejects terms longer than `MAX_LOAN_TERM_YEARS`. Other degenerate
    /// terms are "no loan" and only produce warnings.
    pub fn validate(&self) -> ImmoSimResult<()> {
        validate_term(self.term_years, "term_years")
    }

    pub fn monthly_payment(&self) -> Money {
        monthly_payment(self.principal, self.annual_rate_pct, self.term_years)
    }

    pub fn monthly_insurance(&self) -> Money {
        monthly_insurance(self.principal, self.insurance_rate_pct)
    }

    pub fn payment_breakdown(&self) -> LoanPaymentBreakdown {
        total_loan_payment(
            self.principal,
            self.annual_rate_pct,
            self.term_years,
            self.insurance_rate_pct,
        )
    }

    pub fn schedule(&self) -> Vec<AmortizationEntry> {
        amortization_schedule(self.principal, self.annual_rate_pct, self.term_years)
    }

    pub fn annual_schedule(&self) -> Vec<AmortizationEntry> {
        annual_amortization_schedule(self.principal, self.annual_rate_pct, self.term_years)
    }

    pub fn total_interest(&self) -> Money {
        total_interest(self.principal, self.annual_rate_pct, self.term_years)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub(crate) fn validate_term(years: u32, field: &str) -> ImmoSimResult<()> {
    if years > MAX_LOAN_TERM_YEARS {
        return Err(ImmoSimError::InvalidInput {
            field: field.into(),
            reason: format!("Loan term must not exceed {MAX_LOAN_TERM_YEARS} years, got {years}"),
        });
    }
    Ok(())
}

/// Number of monthly instalments, `None` outside 1..=`MAX_LOAN_TERM_YEARS`.
pub fn term_months(years: u32) -> Option<u32> {
    (1..=MAX_LOAN_TERM_YEARS).contains(&years).then(|| years * 12)
}

/// Monthly rate as a plain fraction from an annual percent.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    pct(annual_rate_pct) / MONTHS_PER_YEAR
}

/// Standard annuity payment: P * r / (1 - (1+r)^-n).
///
/// A non-positive principal, a negative rate or a term outside
/// 1..=`MAX_LOAN_TERM_YEARS` means "no loan" and yields 0. A zero rate
/// repays the principal in equal instalments.
pub fn monthly_payment(principal: Money, annual_rate_pct: Percent, years: u32) -> Money {
    let Some(n) = term_months(years) else {
        return Decimal::ZERO;
    };
    if principal <= Decimal::ZERO || annual_rate_pct < Decimal::ZERO {
        return Decimal::ZERO;
    }

    let months = Decimal::from(n);
    let rate = monthly_rate(annual_rate_pct);
    if rate.is_zero() {
        return principal / months;
    }

    // P * r * c / (c - 1) with c = (1 + r)^n, same value as the textbook form
    match (Decimal::ONE + rate).checked_powi(i64::from(n)) {
        Some(compound) => {
            let denominator = compound - Decimal::ONE;
            if denominator.is_zero() {
                principal / months
            } else {
                principal * rate * compound / denominator
            }
        }
        // (1 + r)^n beyond Decimal range: the payment is interest-only in the limit
        None => principal * rate,
    }
}

/// Monthly borrower insurance on the initial principal.
pub fn monthly_insurance(principal: Money, insurance_rate_pct: Percent) -> Money {
    if principal <= Decimal::ZERO || insurance_rate_pct <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    principal * pct(insurance_rate_pct) / MONTHS_PER_YEAR
}

/// Monthly loan payment plus borrower insurance.
pub fn total_loan_payment(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
    insurance_rate_pct: Percent,
) -> LoanPaymentBreakdown {
    let loan_payment = monthly_payment(principal, annual_rate_pct, years);
    let insurance_payment = monthly_insurance(principal, insurance_rate_pct);
    LoanPaymentBreakdown {
        total_payment: loan_payment + insurance_payment,
        loan_payment,
        insurance_payment,
    }
}

/// Month-by-month amortization table. The last entry's remaining principal
/// is forced to exactly zero.
pub fn amortization_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
) -> Vec<AmortizationEntry> {
    let payment = monthly_payment(principal, annual_rate_pct, years);
    let Some(total_months) = term_months(years).filter(|_| !payment.is_zero()) else {
        return Vec::new();
    };

    let rate = monthly_rate(annual_rate_pct);
    let mut remaining = principal;

    (1..=total_months)
        .map(|month| {
            let interest_portion = remaining * rate;
            let principal_portion = payment - interest_portion;
            remaining -= principal_portion;
            if month == total_months {
                remaining = Decimal::ZERO;
            }
            AmortizationEntry {
                period: month,
                payment,
                principal_portion,
                interest_portion,
                remaining_principal: remaining,
            }
        })
        .collect()
}

/// The monthly table grouped in 12-month buckets. Each year's remaining
/// principal is the one of its last month.
pub fn annual_amortization_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
) -> Vec<AmortizationEntry> {
    amortization_schedule(principal, annual_rate_pct, years)
        .chunks(12)
        .zip(1u32..)
        .map(|(months, year)| AmortizationEntry {
            period: year,
            payment: months.iter().map(|m| m.payment).sum(),
            principal_portion: months.iter().map(|m| m.principal_portion).sum(),
            interest_portion: months.iter().map(|m| m.interest_portion).sum(),
            remaining_principal: months
                .last()
                .map(|m| m.remaining_principal)
                .unwrap_or(Decimal::ZERO),
        })
        .collect()
}

/// Interest paid over the life of the loan.
pub fn total_interest(principal: Money, annual_rate_pct: Percent, years: u32) -> Money {
    let payment = monthly_payment(principal, annual_rate_pct, years);
    match term_months(years) {
        Some(n) if !payment.is_zero() => payment * Decimal::from(n) - principal,
        _ => Decimal::ZERO,
    }
}

/// Outstanding principal at the end of `years`; 0 once the term is over.
pub fn remaining_balance_after_years(terms: &LoanTerms, years: u32) -> Money {
    if years == 0 {
        return terms.principal.max(Decimal::ZERO);
    }
    terms
        .annual_schedule()
        .get(years as usize - 1)
        .map(|entry| entry.remaining_principal)
        .unwrap_or(Decimal::ZERO)
}

/// Cost analysis of a loan with its annual (and optionally monthly) table.
pub fn analyze_loan(
    terms: &LoanTerms,
    include_monthly: bool,
) -> ImmoSimResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    terms.validate()?;

    if terms.principal <= Decimal::ZERO {
        warnings.push("Principal is not positive: treated as no loan".into());
    }
    if terms.annual_rate_pct < Decimal::ZERO {
        warnings.push("Negative interest rate: treated as no loan".into());
    }
    if terms.term_years == 0 {
        warnings.push("Loan term of 0 years: treated as no loan".into());
    }

    let breakdown = terms.payment_breakdown();
    let months = Decimal::from(term_months(terms.term_years).unwrap_or(0));
    let total_interest = terms.total_interest();
    let total_insurance = breakdown.insurance_payment * months;
    let total_cost = if breakdown.loan_payment.is_zero() {
        Decimal::ZERO
    } else {
        terms.principal + total_interest + total_insurance
    };

    let monthly_schedule = terms.schedule();
    let annual_schedule = annual_amortization_schedule(
        terms.principal,
        terms.annual_rate_pct,
        terms.term_years,
    );

    let output = LoanAnalysis {
        monthly_payment: breakdown.loan_payment,
        monthly_insurance: breakdown.insurance_payment,
        total_monthly_payment: breakdown.total_payment,
        total_interest,
        total_insurance,
        total_cost,
        annual_schedule,
        monthly_schedule: include_monthly.then_some(monthly_schedule),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity loan with monthly amortization",
        terms,
        warnings,
        elapsed,
        output,
    ))
}
