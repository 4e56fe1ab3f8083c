use immo_sim_core::financing::capacity::{
    analyze_borrowing_capacity, borrowing_capacity, solve_capacity_from_payment,
    BorrowingCapacityInput, SolverConfig,
};
use immo_sim_core::financing::loan::{
    amortization_schedule, analyze_loan, annual_amortization_schedule, monthly_payment,
    remaining_balance_after_years, total_interest, LoanTerms, MAX_LOAN_TERM_YEARS,
};
use immo_sim_core::ImmoSimError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Loan math
// ===========================================================================

#[test]
fn test_reference_mortgage_payment() {
    // 200k over 20 years at 3%: r = 0.0025, n = 240
    let payment = monthly_payment(dec!(200000), dec!(3), 20);
    assert!(
        (payment - dec!(1109.195)).abs() < dec!(0.01),
        "Expected ~1109.20, got {payment}"
    );
}

#[test]
fn test_schedule_closes_and_repays_principal() {
    let cases = [
        (dec!(200000), dec!(3), 20u32),
        (dec!(85000), dec!(1.2), 7),
        (dec!(450000), dec!(4.75), 25),
        (dec!(12000), dec!(9.9), 5),
    ];
    for (principal, rate, years) in cases {
        let schedule = amortization_schedule(principal, rate, years);
        assert_eq!(schedule.len() as u32, years * 12);
        let last = schedule.last().unwrap();
        assert_eq!(last.remaining_principal, Decimal::ZERO);

        let repaid: Decimal = schedule.iter().map(|e| e.principal_portion).sum();
        let relative = ((repaid - principal) / principal).abs();
        assert!(
            relative < dec!(0.000001),
            "{principal} @ {rate}% / {years}y repaid {repaid}"
        );
    }
}

#[test]
fn test_zero_rate_straight_line() {
    for (principal, years) in [(dec!(120000), 10u32), (dec!(99999), 7), (dec!(1), 1)] {
        assert_eq!(
            monthly_payment(principal, Decimal::ZERO, years),
            principal / Decimal::from(years * 12)
        );
    }
    assert_eq!(total_interest(dec!(120000), Decimal::ZERO, 10), Decimal::ZERO);
}

#[test]
fn test_degenerate_loans_are_no_loan() {
    assert_eq!(monthly_payment(Decimal::ZERO, dec!(3), 20), Decimal::ZERO);
    assert_eq!(monthly_payment(dec!(-5000), dec!(3), 20), Decimal::ZERO);
    assert_eq!(monthly_payment(dec!(100000), dec!(-1), 20), Decimal::ZERO);
    assert_eq!(monthly_payment(dec!(100000), dec!(3), 0), Decimal::ZERO);
    assert!(amortization_schedule(dec!(100000), dec!(3), 0).is_empty());
}

#[test]
fn test_terms_beyond_limit_are_no_loan() {
    assert!(monthly_payment(dec!(100000), dec!(3), MAX_LOAN_TERM_YEARS) > Decimal::ZERO);
    for years in [MAX_LOAN_TERM_YEARS + 1, 400_000_000, u32::MAX] {
        assert_eq!(monthly_payment(dec!(100000), dec!(3), years), Decimal::ZERO);
        assert!(amortization_schedule(dec!(100000), dec!(3), years).is_empty());
        assert_eq!(total_interest(dec!(100000), dec!(3), years), Decimal::ZERO);
    }
}

#[test]
fn test_loan_analysis_term_limit() {
    let at_limit = LoanTerms::new(dec!(200000), dec!(3.5), MAX_LOAN_TERM_YEARS);
    let out = analyze_loan(&at_limit, false).unwrap();
    assert_eq!(out.result.annual_schedule.len(), 50);

    let over = LoanTerms::new(dec!(200000), dec!(3.5), MAX_LOAN_TERM_YEARS + 1);
    let err = analyze_loan(&over, false).unwrap_err();
    assert!(matches!(err, ImmoSimError::InvalidInput { ref field, .. } if field == "term_years"));
}

#[test]
fn test_annual_schedule_matches_monthly_year_ends() {
    let monthly = amortization_schedule(dec!(300000), dec!(3.8), 25);
    let annual = annual_amortization_schedule(dec!(300000), dec!(3.8), 25);
    assert_eq!(annual.len(), 25);
    for (i, year) in annual.iter().enumerate() {
        assert_eq!(year.period as usize, i + 1);
        assert_eq!(year.remaining_principal, monthly[(i + 1) * 12 - 1].remaining_principal);
    }
}

#[test]
fn test_remaining_balance_after_years() {
    let terms = LoanTerms::new(dec!(150000), dec!(2.5), 15);
    assert_eq!(remaining_balance_after_years(&terms, 0), dec!(150000));
    let five = remaining_balance_after_years(&terms, 5);
    assert!(five > Decimal::ZERO && five < dec!(150000));
    assert_eq!(remaining_balance_after_years(&terms, 15), Decimal::ZERO);
    assert_eq!(remaining_balance_after_years(&terms, 30), Decimal::ZERO);
}

// ===========================================================================
// Borrowing capacity
// ===========================================================================

#[test]
fn test_capacity_boundary_existing_debt() {
    // 2000 * 33% - 1900 < 0
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
fn test_capacity_analysis_term_limit() {
    let mut input = BorrowingCapacityInput {
        monthly_income: dec!(4000),
        current_debt: Decimal::ZERO,
        debt_ratio_pct: dec!(35),
        annual_rate_pct: dec!(3.5),
        loan_term_years: MAX_LOAN_TERM_YEARS,
        insurance_rate_pct: dec!(0.36),
        min_living_expense: dec!(1000),
    };
    let out = analyze_borrowing_capacity(&input, SolverConfig::default()).unwrap();
    assert!(out.result.capacity > Decimal::ZERO);

    input.loan_term_years = MAX_LOAN_TERM_YEARS + 1;
    let err = analyze_borrowing_capacity(&input, SolverConfig::default()).unwrap_err();
    assert!(
        matches!(err, ImmoSimError::InvalidInput { ref field, .. } if field == "loan_term_years")
    );
}

#[test]
fn test_capacity_monotonic_in_income() {
    let mut previous = Decimal::ZERO;
    for income in (1500..=9000).step_by(250) {
        let capacity = borrowing_capacity(
            Decimal::from(income),
            dec!(200),
            dec!(35),
            dec!(3.8),
            25,
            dec!(0.36),
            dec!(1000),
        );
        assert!(
            capacity >= previous,
            "capacity fell from {previous} to {capacity} at income {income}"
        );
        previous = capacity;
    }
}

#[test]
fn test_capacity_non_increasing_in_rate() {
    let mut previous = Decimal::MAX;
    for tenths in (5..=100).step_by(5) {
        let rate = Decimal::new(tenths, 1);
        let capacity = borrowing_capacity(
            dec!(4500),
            Decimal::ZERO,
            dec!(35),
            rate,
            20,
            dec!(0.36),
            dec!(1000),
        );
        assert!(
            capacity <= previous,
            "capacity rose from {previous} to {capacity} at {rate}%"
        );
        previous = capacity;
    }
}

#[test]
fn test_solver_converges_on_realistic_grid() {
    let config = SolverConfig::default();
    for tenths in (5..=100).step_by(5) {
        let rate = Decimal::new(tenths, 1);
        for years in [5u32, 10, 15, 20, 25, 30] {
            let solution = solve_capacity_from_payment(dec!(1500), rate, years, dec!(0.36), config);
            assert!(solution.converged, "{rate}% / {years}y did not converge");
            assert!(solution.iterations <= config.max_iterations);
            assert!(solution.payment_gap.abs() < config.tolerance + Decimal::ONE);
        }
    }
}

#[test]
fn test_solver_reports_non_convergence_without_failing() {
    let config = SolverConfig {
        max_iterations: 0,
        ..SolverConfig::default()
    };
    let solution = solve_capacity_from_payment(dec!(1500), dec!(3.5), 25, dec!(0.36), config);
    assert!(!solution.converged);
    assert_eq!(solution.capacity, dec!(100000));
}
