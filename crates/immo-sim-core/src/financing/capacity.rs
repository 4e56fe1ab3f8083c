use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::loan::{monthly_payment, monthly_rate, term_months, validate_term};
use crate::types::{pct, with_metadata, ComputationOutput, Money, Percent, MONTHS_PER_YEAR};
use crate::ImmoSimResult;

/// Annual borrower insurance assumed when none is given (% of principal).
pub const DEFAULT_INSURANCE_RATE_PCT: Decimal = dec!(0.36);
/// Minimum monthly budget left to live on after all debt service.
pub const DEFAULT_MIN_LIVING_EXPENSE: Decimal = dec!(1000);
/// Bank application fees deducted from the purchase budget.
pub const DEFAULT_APPLICATION_FEES: Decimal = dec!(1000);

fn default_insurance_rate() -> Percent {
    DEFAULT_INSURANCE_RATE_PCT
}

fn default_min_living_expense() -> Money {
    DEFAULT_MIN_LIVING_EXPENSE
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fixed-point solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Starting principal
    pub initial_guess: Money,
    /// Accepted gap between the target and the computed payment
    pub tolerance: Money,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: dec!(100000),
            tolerance: Decimal::ONE,
            max_iterations: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowingCapacityInput {
    /// Net monthly household income
    pub monthly_income: Money,
    /// Monthly repayments already committed to other loans
    #[serde(default)]
    pub current_debt: Money,
    /// Maximum share of income that may go to debt service, in percent
    pub debt_ratio_pct: Percent,
    pub annual_rate_pct: Percent,
    pub loan_term_years: u32,
    #[serde(default = "default_insurance_rate")]
    pub insurance_rate_pct: Percent,
    #[serde(default = "default_min_living_expense")]
    pub min_living_expense: Money,
}

/// Maximum monthly instalment a borrower can take on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentCap {
    pub max_payment: Money,
    /// The minimum living budget, not the debt ratio, set the cap
    pub living_floor_applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacitySolution {
    /// Principal that can be borrowed, truncated to a whole currency unit
    pub capacity: Money,
    pub max_monthly_payment: Money,
    pub converged: bool,
    pub iterations: u32,
    /// Target payment minus the payment at the returned principal
    pub payment_gap: Money,
    pub living_floor_applied: bool,
}

/// What a borrowing capacity plus a personal contribution buys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalBudget {
    /// Loan + contribution
    pub gross_budget: Money,
    /// Left for the property itself once fees are paid
    pub net_budget: Money,
    pub notary_fees: Money,
    pub application_fees: Money,
}

impl CapacitySolution {
    fn zero(max_monthly_payment: Money, living_floor_applied: bool) -> Self {
        Self {
            capacity: Decimal::ZERO,
            max_monthly_payment,
            converged: true,
            iterations: 0,
            payment_gap: Decimal::ZERO,
            living_floor_applied,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Cap the monthly instalment by the debt ratio, then make sure the
/// household keeps at least `min_living_expense` per month.
pub fn max_monthly_payment(
    monthly_income: Money,
    current_debt: Money,
    debt_ratio_pct: Percent,
    min_living_expense: Money,
) -> PaymentCap {
    let none = PaymentCap {
        max_payment: Decimal::ZERO,
        living_floor_applied: false,
    };
    if monthly_income <= Decimal::ZERO {
        return none;
    }

    let by_ratio = monthly_income * pct(debt_ratio_pct) - current_debt;
    if by_ratio <= Decimal::ZERO {
        return none;
    }

    let left_to_live = monthly_income - current_debt - by_ratio;
    if left_to_live < min_living_expense {
        let by_floor = monthly_income - current_debt - min_living_expense;
        return PaymentCap {
            max_payment: by_floor.max(Decimal::ZERO),
            living_floor_applied: true,
        };
    }

    PaymentCap {
        max_payment: by_ratio,
        living_floor_applied: false,
    }
}

/// Principal whose loan payment plus insurance equals `max_payment`.
///
/// Insurance is proportional to the principal, so the guess is rescaled by
/// `max_payment / total_payment` until the gap falls under the tolerance.
/// Running out of iterations is not an error: the last iterate is returned
/// with `converged == false`.
pub fn solve_capacity_from_payment(
    max_payment: Money,
    annual_rate_pct: Percent,
    years: u32,
    insurance_rate_pct: Percent,
    config: SolverConfig,
) -> CapacitySolution {
    let Some(months) = term_months(years).filter(|_| max_payment > Decimal::ZERO) else {
        return CapacitySolution::zero(max_payment.max(Decimal::ZERO), false);
    };

    let monthly_insurance_rate = pct(insurance_rate_pct.max(Decimal::ZERO)) / MONTHS_PER_YEAR;

    if monthly_rate(annual_rate_pct) <= Decimal::ZERO {
        let capacity = if monthly_insurance_rate > Decimal::ZERO {
            max_payment / monthly_insurance_rate
        } else {
            max_payment * Decimal::from(months)
        };
        return CapacitySolution {
            capacity: capacity.floor(),
            ..CapacitySolution::zero(max_payment, false)
        };
    }

    let total_payment_at = |principal: Money| {
        monthly_payment(principal, annual_rate_pct, years) + principal * monthly_insurance_rate
    };

    let mut principal = if config.initial_guess > Decimal::ZERO {
        config.initial_guess
    } else {
        SolverConfig::default().initial_guess
    };
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let total = total_payment_at(principal);
        if (max_payment - total).abs() < config.tolerance || total.is_zero() {
            break;
        }
        principal *= max_payment / total;
        iterations += 1;
    }

    let payment_gap = max_payment - total_payment_at(principal);

    CapacitySolution {
        capacity: principal.floor(),
        max_monthly_payment: max_payment,
        converged: payment_gap.abs() < config.tolerance,
        iterations,
        payment_gap,
        living_floor_applied: false,
    }
}

/// Full capacity solve from income and debt figures.
pub fn solve_borrowing_capacity(
    input: &BorrowingCapacityInput,
    config: SolverConfig,
) -> CapacitySolution {
    let cap = max_monthly_payment(
        input.monthly_income,
        input.current_debt,
        input.debt_ratio_pct,
        input.min_living_expense,
    );
    if cap.max_payment <= Decimal::ZERO {
        return CapacitySolution::zero(Decimal::ZERO, cap.living_floor_applied);
    }

    CapacitySolution {
        living_floor_applied: cap.living_floor_applied,
        ..solve_capacity_from_payment(
            cap.max_payment,
            input.annual_rate_pct,
            input.loan_term_years,
            input.insurance_rate_pct,
            config,
        )
    }
}

/// Maximum principal a household can borrow, in whole currency units.
pub fn borrowing_capacity(
    monthly_income: Money,
    current_debt: Money,
    debt_ratio_pct: Percent,
    annual_rate_pct: Percent,
    years: u32,
    insurance_rate_pct: Percent,
    min_living_expense: Money,
) -> Money {
    let input = BorrowingCapacityInput {
        monthly_income,
        current_debt,
        debt_ratio_pct,
        annual_rate_pct,
        loan_term_years: years,
        insurance_rate_pct,
        min_living_expense,
    };
    solve_borrowing_capacity(&input, SolverConfig::default()).capacity
}

/// Split a borrowing capacity plus contribution into fees and purchase budget.
pub fn total_budget(
    borrowing_capacity: Money,
    personal_contribution: Money,
    notary_fee_rate_pct: Percent,
    application_fees: Money,
) -> TotalBudget {
    let gross_budget = borrowing_capacity + personal_contribution;
    let notary_fees = gross_budget * pct(notary_fee_rate_pct);
    TotalBudget {
        gross_budget,
        net_budget: gross_budget - notary_fees - application_fees,
        notary_fees,
        application_fees,
    }
}

/// Capacity solve wrapped with warnings and metadata. Fails only for a
/// term longer than `MAX_LOAN_TERM_YEARS`.
pub fn analyze_borrowing_capacity(
    input: &BorrowingCapacityInput,
    config: SolverConfig,
) -> ImmoSimResult<ComputationOutput<CapacitySolution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_term(input.loan_term_years, "loan_term_years")?;

    let solution = solve_borrowing_capacity(input, config);

    if input.monthly_income <= Decimal::ZERO {
        warnings.push("Monthly income is not positive: no borrowing capacity".into());
    } else if solution.max_monthly_payment.is_zero() {
        warnings.push("Existing debt already uses the whole debt-ratio allowance".into());
    }
    if solution.living_floor_applied {
        warnings.push(format!(
            "Payment capped by the minimum living budget of {:.0} rather than the {:.1}% debt ratio",
            input.min_living_expense, input.debt_ratio_pct
        ));
    }
    if !solution.converged {
        warnings.push(format!(
            "Capacity solver stopped after {} iterations with a payment gap of {:.2}",
            solution.iterations, solution.payment_gap
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Borrowing capacity (debt ratio, living-budget floor, fixed-point principal solve)",
        input,
        warnings,
        elapsed,
        solution,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> BorrowingCapacityInput {
        BorrowingCapacityInput {
            monthly_income: dec!(4000),
            current_debt: Decimal::ZERO,
            debt_ratio_pct: dec!(35),
            annual_rate_pct: dec!(3.5),
            loan_term_years: 25,
            insurance_rate_pct: dec!(0.36),
            min_living_expense: dec!(1000),
        }
    }

    #[test]
    fn test_max_payment_by_debt_ratio() {
        let cap = max_monthly_payment(dec!(4000), dec!(200), dec!(35), dec!(1000));
        assert_eq!(cap.max_payment, dec!(1200));
        assert!(!cap.living_floor_applied);
    }

    #[test]
    fn test_max_payment_living_floor_overrides_ratio() {
        // 3000 * 35% = 1050 leaves 1950, below the 2000 floor
        let cap = max_monthly_payment(dec!(3000), Decimal::ZERO, dec!(35), dec!(2000));
        assert_eq!(cap.max_payment, dec!(1000));
        assert!(cap.living_floor_applied);
    }

    #[test]
    fn test_max_payment_existing_debt_exhausts_ratio() {
        let cap = max_monthly_payment(dec!(2000), dec!(1900), dec!(33), dec!(1000));
        assert_eq!(cap.max_payment, Decimal::ZERO);
    }

    #[test]
    fn test_capacity_matches_closed_form() {
        let solution = solve_borrowing_capacity(&sample_input(), SolverConfig::default());
        assert!(solution.converged);
        assert_eq!(solution.max_monthly_payment, dec!(1400));

        // payment per unit of principal: loan annuity + insurance
        let per_unit = monthly_payment(dec!(1000000), dec!(3.5), 25) / dec!(1000000)
            + dec!(0.0036) / dec!(12);
        let expected = dec!(1400) / per_unit;
        assert!(
            (solution.capacity - expected).abs() < dec!(2),
            "got {}, expected {}",
            solution.capacity,
            expected
        );
        assert_eq!(solution.capacity, solution.capacity.floor());
    }

    #[test]
    fn test_zero_rate_uses_insurance_only() {
        let solution = solve_capacity_from_payment(
            dec!(600),
            Decimal::ZERO,
            20,
            dec!(0.36),
            SolverConfig::default(),
        );
        // 600 / 0.0003
        assert_eq!(solution.capacity, dec!(2000000));
        assert_eq!(solution.iterations, 0);
    }

    #[test]
    fn test_zero_rate_zero_insurance_is_straight_line() {
        let solution = solve_capacity_from_payment(
            dec!(500),
            Decimal::ZERO,
            10,
            Decimal::ZERO,
            SolverConfig::default(),
        );
        assert_eq!(solution.capacity, dec!(60000));
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let config = SolverConfig {
            initial_guess: dec!(100000),
            tolerance: dec!(0.000000001),
            max_iterations: 0,
        };
        let solution =
            solve_capacity_from_payment(dec!(1400), dec!(3.5), 25, dec!(0.36), config);
        assert!(!solution.converged);
        assert_eq!(solution.capacity, dec!(100000));
        assert!(solution.payment_gap > Decimal::ZERO);
    }

    #[test]
    fn test_borrowing_capacity_boundary_returns_zero() {
        let capacity = borrowing_capacity(
            dec!(2000),
            dec!(1900),
            dec!(33),
            dec!(3.5),
            20,
            dec!(0.36),
            dec!(1000),
        );
        assert_eq!(capacity, Decimal::ZERO);
    }

    #[test]
    fn test_total_budget() {
        let budget = total_budget(dec!(200000), dec!(20000), dec!(8), dec!(1000));
        assert_eq!(budget.gross_budget, dec!(220000));
        assert_eq!(budget.notary_fees, dec!(17600));
        assert_eq!(budget.net_budget, dec!(201400));
    }

    #[test]
    fn test_analyze_reports_living_floor() {
        let mut input = sample_input();
        input.monthly_income = dec!(3000);
        input.min_living_expense = dec!(2000);
        let out = analyze_borrowing_capacity(&input, SolverConfig::default()).unwrap();
        assert!(out.result.living_floor_applied);
        assert_eq!(out.result.max_monthly_payment, dec!(1000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_overlong_term_yields_no_capacity() {
        let solution = solve_capacity_from_payment(
            dec!(1200),
            Decimal::ZERO,
            u32::MAX,
            Decimal::ZERO,
            SolverConfig::default(),
        );
        assert_eq!(solution.capacity, Decimal::ZERO);
    }

    #[test]
    fn test_analyze_rejects_overlong_term() {
        let mut input = sample_input();
        input.loan_term_years = 50;
        assert!(analyze_borrowing_capacity(&input, SolverConfig::default()).is_ok());
        input.loan_term_years = 51;
        assert!(matches!(
            analyze_borrowing_capacity(&input, SolverConfig::default()),
            Err(crate::ImmoSimError::InvalidInput { ref field, .. }) if field == "loan_term_years"
        ));
    }
}
