use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::advisory::optimization::{optimization_scenarios, OptimizationScenario, ScenarioInputs};
use crate::advisory::recommendations::{investment_recommendations, InvestmentSignals, Recommendation};
use crate::error::ImmoSimError;
use crate::financing::loan::{validate_term, AmortizationEntry, LoanTerms};
use crate::fiscal::regimes::{compute_tax, FiscalProfile, FiscalRegime, TaxBreakdown};
use crate::market::cities::{CityCatalog, CityMarketInfo, PropertyType, DEFAULT_ANNUAL_GROWTH_PCT};
use crate::projection::engine::{
    project, projection_horizon, validate_horizon, ProjectionAssumptions, ProjectionSummary,
};
use crate::projection::growth::CityRateGrowth;
use crate::returns::scoring::{performance_breakdown, PerformanceBreakdown, PerformanceInputs};
use crate::returns::yields::{
    gross_yield, monthly_cashflow, net_yield, notary_fees, price_per_sqm, straight_line_depreciation,
};
use crate::time_value::investment_irr;
use crate::types::{pct, with_metadata, ComputationOutput, Money, Percent, MONTHS_PER_YEAR};
use crate::ImmoSimResult;

fn default_notary_fee_rate() -> Percent {
    dec!(7.5)
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalIncome {
    pub gross_monthly_rent: Money,
    #[serde(default)]
    pub vacancy_rate_pct: Percent,
    #[serde(default)]
    pub unpaid_rate_pct: Percent,
    /// Property manager's cut of collected rent
    #[serde(default)]
    pub management_fee_rate_pct: Percent,
    /// Yearly rent indexation
    #[serde(default)]
    pub rent_increase_pct: Percent,
}

impl RentalIncome {
    /// Rent actually collected after vacancy and unpaid rent.
    pub fn adjusted_monthly_rent(&self) -> Money {
        self.gross_monthly_rent
            * (Decimal::ONE - pct(self.vacancy_rate_pct))
            * (Decimal::ONE - pct(self.unpaid_rate_pct))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseProfile {
    #[serde(default)]
    pub property_tax_annual: Money,
    #[serde(default)]
    pub condo_fees_annual: Money,
    /// Maintenance provision as a share of collected rent
    #[serde(default)]
    pub maintenance_rate_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentInput {
    /// Reference city; an unknown name is an error, no name means default
    /// market assumptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub purchase_price: Money,
    /// Living area in m²
    pub area: Decimal,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub renovation_cost: Money,
    #[serde(default)]
    pub furnished: bool,
    #[serde(default)]
    pub down_payment: Money,
    /// Defaults to total investment minus down payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Money>,
    pub annual_rate_pct: Percent,
    pub loan_term_years: u32,
    #[serde(default)]
    pub insurance_rate_pct: Percent,
    #[serde(default = "default_notary_fee_rate")]
    pub notary_fee_rate_pct: Percent,
    pub rental: RentalIncome,
    #[serde(default)]
    pub expenses: ExpenseProfile,
    pub fiscal: FiscalProfile,
    /// Defaults to max(20, loan term)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_years: Option<u32>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySection {
    pub purchase_price: Money,
    pub area: Decimal,
    pub property_type: PropertyType,
    pub renovation_cost: Money,
    pub furnished: bool,
    pub price_per_sqm: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingSection {
    pub down_payment: Money,
    pub loan_amount: Money,
    pub annual_rate_pct: Percent,
    pub loan_term_years: u32,
    pub monthly_payment: Money,
    pub monthly_insurance: Money,
    pub notary_fees: Money,
    /// Price + notary fees + renovation
    pub total_investment: Money,
    pub total_interest: Money,
    pub annual_schedule: Vec<AmortizationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalSection {
    pub monthly_rent: Money,
    pub adjusted_monthly_rent: Money,
    pub annual_rent: Money,
    pub vacancy_rate_pct: Percent,
    pub unpaid_rate_pct: Percent,
    pub rent_increase_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSection {
    pub monthly_management_fees: Money,
    pub monthly_property_tax: Money,
    pub monthly_condo_fees: Money,
    pub monthly_maintenance: Money,
    pub monthly_expenses_without_loan: Money,
    /// Loan, insurance, running costs and tax
    pub total_monthly_expenses: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalSection {
    pub profile: FiscalProfile,
    /// Expenses offered to the réel regimes, depreciation included
    pub deductible_expenses: Money,
    pub annual_depreciation: Money,
    pub tax: TaxBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSection {
    pub gross_yield_pct: Percent,
    pub net_yield_pct: Percent,
    pub monthly_cashflow: Money,
    pub annual_cashflow: Money,
    pub performance_index: Decimal,
    pub scores: PerformanceBreakdown,
    /// Equity IRR over the projection horizon
    pub irr_pct: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentProjection {
    pub growth_rate_pct: Percent,
    pub summary: ProjectionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub city: Option<CityMarketInfo>,
    pub property: PropertySection,
    pub financing: FinancingSection,
    pub rental_income: RentalSection,
    pub expenses: ExpenseSection,
    pub fiscality: FiscalSection,
    pub performance: PerformanceSection,
    pub projection: InvestmentProjection,
    pub recommendations: Vec<Recommendation>,
    pub optimization_scenarios: Vec<OptimizationScenario>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full rental-investment simulation: financing, rent, running costs, tax,
/// yields, a yearly projection at the city's growth rate, advice and
/// what-if scenarios.
pub fn simulate_investment(
    input: &InvestmentInput,
    catalog: &CityCatalog,
) -> ImmoSimResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let city = match input.city.as_deref() {
        Some(name) => Some(catalog.require(name)?),
        None => None,
    };

    // Financing
    let notary = notary_fees(input.purchase_price, input.notary_fee_rate_pct);
    let total_investment = input.purchase_price + notary + input.renovation_cost;
    let loan_amount = input
        .loan_amount
        .unwrap_or(total_investment - input.down_payment)
        .max(Decimal::ZERO);
    let terms = LoanTerms::new(loan_amount, input.annual_rate_pct, input.loan_term_years)
        .with_insurance(input.insurance_rate_pct);
    let payment = terms.payment_breakdown();
    let annual_schedule = terms.annual_schedule();

    if input.down_payment >= total_investment {
        warnings.push("Down payment covers the whole investment: no loan needed".into());
    }

    // Rent and running costs
    let adjusted_rent = input.rental.adjusted_monthly_rent();
    let monthly_management = adjusted_rent * pct(input.rental.management_fee_rate_pct);
    let monthly_maintenance = adjusted_rent * pct(input.expenses.maintenance_rate_pct);
    let monthly_property_tax = input.expenses.property_tax_annual / MONTHS_PER_YEAR;
    let monthly_condo = input.expenses.condo_fees_annual / MONTHS_PER_YEAR;
    let expenses_without_loan =
        monthly_management + monthly_property_tax + monthly_condo + monthly_maintenance;

    // Tax
    let annual_depreciation = if input.fiscal.regime == FiscalRegime::LmnpReal {
        straight_line_depreciation(input.purchase_price)
    } else {
        Decimal::ZERO
    };
    let deductible_expenses =
        (expenses_without_loan + payment.total_payment) * MONTHS_PER_YEAR + annual_depreciation;
    let tax = compute_tax(&input.fiscal, adjusted_rent * MONTHS_PER_YEAR, deductible_expenses);

    // Returns
    let cashflow = monthly_cashflow(
        adjusted_rent,
        payment.total_payment,
        expenses_without_loan,
        tax.monthly_tax,
    );
    let gross_rent_annual = input.rental.gross_monthly_rent * MONTHS_PER_YEAR;
    let gross = gross_yield(gross_rent_annual, total_investment);
    let net = net_yield(
        gross_rent_annual,
        total_investment,
        (expenses_without_loan + tax.monthly_tax) * MONTHS_PER_YEAR,
    );

    // Projection
    let growth_rate_pct = city
        .map(|c| c.annual_price_growth_pct)
        .unwrap_or(DEFAULT_ANNUAL_GROWTH_PCT);
    let horizon = input
        .horizon_years
        .unwrap_or_else(|| projection_horizon(input.loan_term_years));
    let assumptions = ProjectionAssumptions {
        initial_value: input.purchase_price,
        loan: terms,
        monthly_rent: input.rental.gross_monthly_rent,
        vacancy_rate_pct: input.rental.vacancy_rate_pct,
        unpaid_rate_pct: input.rental.unpaid_rate_pct,
        rent_increase_pct: input.rental.rent_increase_pct,
        monthly_expenses: expenses_without_loan,
        horizon_years: horizon,
    };
    let summary = project(&assumptions, &mut CityRateGrowth::new(growth_rate_pct))?;

    let equity_invested = (total_investment - loan_amount).max(Decimal::ZERO);
    let irr_pct = investment_irr(
        equity_invested,
        &summary.yearly_cashflows(),
        summary.final_equity,
    );
    if irr_pct.is_none() {
        warnings.push("Equity IRR could not be computed for this cash-flow profile".into());
    }

    // Scoring
    let loan_to_value = if total_investment > Decimal::ZERO {
        loan_amount / total_investment
    } else {
        Decimal::ZERO
    };
    let debt_service = if payment.loan_payment.is_zero() {
        Decimal::ONE
    } else {
        payment.loan_payment
    };
    let scores = performance_breakdown(&PerformanceInputs {
        gross_yield_pct: gross,
        net_yield_pct: net,
        monthly_cashflow: cashflow,
        appreciation_rate_pct: growth_rate_pct,
        loan_to_value,
        debt_service_coverage: adjusted_rent / debt_service,
    });

    let recommendations = investment_recommendations(&InvestmentSignals {
        city,
        purchase_price: input.purchase_price,
        area: input.area,
        monthly_rent: input.rental.gross_monthly_rent,
        monthly_cashflow: cashflow,
        gross_yield_pct: gross,
        net_yield_pct: net,
        regime: input.fiscal.regime,
        furnished: input.furnished,
        loan_term_years: input.loan_term_years,
        annual_rate_pct: input.annual_rate_pct,
        down_payment: input.down_payment,
        total_investment,
        management_fee_pct: input.rental.management_fee_rate_pct,
        vacancy_rate_pct: input.rental.vacancy_rate_pct,
    });

    let optimization_scenarios = optimization_scenarios(&ScenarioInputs {
        purchase_price: input.purchase_price,
        area: input.area,
        monthly_rent: input.rental.gross_monthly_rent,
        management_fee_pct: input.rental.management_fee_rate_pct,
        maintenance_rate_pct: input.expenses.maintenance_rate_pct,
        renovation_cost: input.renovation_cost,
        furnished: input.furnished,
        regime: input.fiscal.regime,
        loan_term_years: input.loan_term_years,
        annual_rate_pct: input.annual_rate_pct,
    });

    let result = SimulationResult {
        city: city.cloned(),
        property: PropertySection {
            purchase_price: input.purchase_price,
            area: input.area,
            property_type: input.property_type,
            renovation_cost: input.renovation_cost,
            furnished: input.furnished,
            price_per_sqm: price_per_sqm(input.purchase_price, input.area),
        },
        financing: FinancingSection {
            down_payment: input.down_payment,
            loan_amount,
            annual_rate_pct: input.annual_rate_pct,
            loan_term_years: input.loan_term_years,
            monthly_payment: payment.loan_payment,
            monthly_insurance: payment.insurance_payment,
            notary_fees: notary,
            total_investment,
            total_interest: terms.total_interest(),
            annual_schedule,
        },
        rental_income: RentalSection {
            monthly_rent: input.rental.gross_monthly_rent,
            adjusted_monthly_rent: adjusted_rent,
            annual_rent: adjusted_rent * MONTHS_PER_YEAR,
            vacancy_rate_pct: input.rental.vacancy_rate_pct,
            unpaid_rate_pct: input.rental.unpaid_rate_pct,
            rent_increase_pct: input.rental.rent_increase_pct,
        },
        expenses: ExpenseSection {
            monthly_management_fees: monthly_management,
            monthly_property_tax,
            monthly_condo_fees: monthly_condo,
            monthly_maintenance,
            monthly_expenses_without_loan: expenses_without_loan,
            total_monthly_expenses: payment.total_payment + expenses_without_loan + tax.monthly_tax,
        },
        fiscality: FiscalSection {
            profile: input.fiscal,
            deductible_expenses,
            annual_depreciation,
            tax,
        },
        performance: PerformanceSection {
            gross_yield_pct: gross,
            net_yield_pct: net,
            monthly_cashflow: cashflow,
            annual_cashflow: cashflow * MONTHS_PER_YEAR,
            performance_index: scores.index,
            scores,
            irr_pct,
        },
        projection: InvestmentProjection {
            growth_rate_pct,
            summary,
        },
        recommendations,
        optimization_scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rental investment simulation (annuity loan, regime-based tax, city-rate projection)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

fn validate_input(input: &InvestmentInput, warnings: &mut Vec<String>) -> ImmoSimResult<()> {
    if input.purchase_price <= Decimal::ZERO {
        return Err(ImmoSimError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }
    if input.area <= Decimal::ZERO {
        return Err(ImmoSimError::InvalidInput {
            field: "area".into(),
            reason: "Area must be positive".into(),
        });
    }
    validate_term(input.loan_term_years, "loan_term_years")?;
    if let Some(horizon) = input.horizon_years {
        validate_horizon(horizon, "horizon_years")?;
    }
    if input.purchase_price < dec!(10000) {
        warnings.push(format!(
            "Purchase price of {:.0} is below the 10 000 minimum",
            input.purchase_price
        ));
    }
    if input.area < dec!(9) {
        warnings.push(format!("Area of {} m² is below the 9 m² minimum", input.area));
    }
    if input.rental.gross_monthly_rent < dec!(100) {
        warnings.push(format!(
            "Monthly rent of {:.0} is below the 100 minimum",
            input.rental.gross_monthly_rent
        ));
    }
    if input.annual_rate_pct <= Decimal::ZERO {
        warnings.push("Interest rate is not positive".into());
    }
    if input.loan_term_years == 0 {
        warnings.push("Loan term of 0 years: treated as no loan".into());
    }
    if input.fiscal.regime.is_furnished() != input.furnished {
        warnings.push(format!(
            "{} is meant for {} lets but the property is {}",
            input.fiscal.regime.label(),
            if input.fiscal.regime.is_furnished() { "furnished" } else { "unfurnished" },
            if input.furnished { "furnished" } else { "unfurnished" },
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> InvestmentInput {
        InvestmentInput {
            city: Some("Lyon".into()),
            purchase_price: dec!(200000),
            area: dec!(50),
            property_type: PropertyType::Apartment,
            renovation_cost: Decimal::ZERO,
            furnished: false,
            down_payment: dec!(20000),
            loan_amount: None,
            annual_rate_pct: dec!(3.5),
            loan_term_years: 20,
            insurance_rate_pct: Decimal::ZERO,
            notary_fee_rate_pct: dec!(7.5),
            rental: RentalIncome {
                gross_monthly_rent: dec!(850),
                vacancy_rate_pct: dec!(5),
                unpaid_rate_pct: dec!(2),
                management_fee_rate_pct: dec!(7),
                rent_increase_pct: dec!(1),
            },
            expenses: ExpenseProfile {
                property_tax_annual: dec!(1200),
                condo_fees_annual: dec!(1200),
                maintenance_rate_pct: dec!(5),
            },
            fiscal: FiscalProfile {
                regime: FiscalRegime::MicroFoncier,
                marginal_tax_rate_pct: dec!(30),
                social_tax_rate_pct: dec!(17.2),
            },
            horizon_years: None,
        }
    }

    #[test]
    fn test_financing_defaults() {
        let out = simulate_investment(&sample_input(), CityCatalog::builtin()).unwrap();
        let f = &out.result.financing;
        assert_eq!(f.notary_fees, dec!(15000));
        assert_eq!(f.total_investment, dec!(215000));
        assert_eq!(f.loan_amount, dec!(195000));
        assert_eq!(f.annual_schedule.len(), 20);
    }

    #[test]
    fn test_rent_and_expenses() {
        let out = simulate_investment(&sample_input(), CityCatalog::builtin()).unwrap();
        let r = &out.result;
        // 850 * 0.95 * 0.98
        assert_eq!(r.rental_income.adjusted_monthly_rent, dec!(791.35));
        assert_eq!(r.expenses.monthly_property_tax, dec!(100));
        assert_eq!(r.expenses.monthly_condo_fees, dec!(100));
    }

    #[test]
    fn test_gross_yield_uses_unadjusted_rent() {
        let out = simulate_investment(&sample_input(), CityCatalog::builtin()).unwrap();
        let expected = dec!(10200) / dec!(215000) * dec!(100);
        assert_eq!(out.result.performance.gross_yield_pct, expected);
    }

    #[test]
    fn test_cashflow_identity() {
        let out = simulate_investment(&sample_input(), CityCatalog::builtin()).unwrap();
        let r = &out.result;
        assert_eq!(
            r.performance.monthly_cashflow,
            r.rental_income.adjusted_monthly_rent - r.expenses.total_monthly_expenses
        );
        assert_eq!(r.performance.annual_cashflow, r.performance.monthly_cashflow * dec!(12));
    }

    #[test]
    fn test_projection_uses_city_rate_and_horizon() {
        let out = simulate_investment(&sample_input(), CityCatalog::builtin()).unwrap();
        let p = &out.result.projection;
        assert_eq!(p.growth_rate_pct, dec!(3.2));
        assert_eq!(p.summary.years.len(), 21);
        assert_eq!(p.summary.final_loan_balance, Decimal::ZERO);
    }

    #[test]
    fn test_default_growth_without_city() {
        let mut input = sample_input();
        input.city = None;
        let out = simulate_investment(&input, CityCatalog::builtin()).unwrap();
        assert_eq!(out.result.projection.growth_rate_pct, dec!(1.5));
        assert!(out.result.city.is_none());
    }

    #[test]
    fn test_unknown_city_is_error() {
        let mut input = sample_input();
        input.city = Some("Gotham".into());
        let err = simulate_investment(&input, CityCatalog::builtin()).unwrap_err();
        assert!(matches!(err, ImmoSimError::CityNotFound(_)));
    }

    #[test]
    fn test_lmnp_real_adds_depreciation() {
        let mut input = sample_input();
        input.furnished = true;
        input.fiscal.regime = FiscalRegime::LmnpReal;
        let out = simulate_investment(&input, CityCatalog::builtin()).unwrap();
        assert_eq!(out.result.fiscality.annual_depreciation, dec!(8000));
        assert!(out.warnings.iter().all(|w| !w.contains("meant for")));
    }

    #[test]
    fn test_regime_mismatch_warns() {
        let mut input = sample_input();
        input.fiscal.regime = FiscalRegime::LmnpMicroBic;
        let out = simulate_investment(&input, CityCatalog::builtin()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("meant for furnished")));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut input = sample_input();
        input.purchase_price = Decimal::ZERO;
        assert!(matches!(
            simulate_investment(&input, CityCatalog::builtin()),
            Err(ImmoSimError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_explicit_loan_amount_wins() {
        let mut input = sample_input();
        input.loan_amount = Some(dec!(150000));
        let out = simulate_investment(&input, CityCatalog::builtin()).unwrap();
        assert_eq!(out.result.financing.loan_amount, dec!(150000));
    }
}
