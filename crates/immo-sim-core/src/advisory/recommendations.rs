use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::fiscal::regimes::FiscalRegime;
use crate::market::CityMarketInfo;
use crate::types::{Money, Percent, MONTHS_PER_YEAR};

/// Yearly rent above which the réel regime usually beats micro-foncier.
const MICRO_FONCIER_RENT_THRESHOLD: Decimal = dec!(15000);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationKind {
    HighPurchasePrice,
    RentBelowMarket,
    NegativeCashflow,
    LowCashflow,
    LowGrossYield,
    LowNetYield,
    SwitchToRealRegime,
    SwitchToMicroFoncier,
    ConsiderFurnished,
    LongExpensiveLoan,
    LowDownPayment,
    HighManagementFees,
    HighVacancy,
    LowContribution,
    LongLoanTerm,
    ExtendLoanTerm,
    HighDebtRatio,
    LimitedBudget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, title: &str, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Figures the investment rules look at.
#[derive(Debug, Clone, Copy)]
pub struct InvestmentSignals<'a> {
    pub city: Option<&'a CityMarketInfo>,
    pub purchase_price: Money,
    pub area: Decimal,
    /// Gross monthly rent as entered
    pub monthly_rent: Money,
    pub monthly_cashflow: Money,
    pub gross_yield_pct: Percent,
    pub net_yield_pct: Percent,
    pub regime: FiscalRegime,
    pub furnished: bool,
    pub loan_term_years: u32,
    pub annual_rate_pct: Percent,
    pub down_payment: Money,
    pub total_investment: Money,
    pub management_fee_pct: Percent,
    pub vacancy_rate_pct: Percent,
}

/// Figures the purchasing-power rules look at.
#[derive(Debug, Clone, Copy)]
pub struct PurchasingPowerSignals {
    pub monthly_income: Money,
    pub borrowing_capacity: Money,
    pub net_budget: Money,
    pub debt_ratio_pct: Percent,
    pub loan_term_years: u32,
    pub contribution: Money,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Investment advice. Rules are evaluated in a fixed order and the output
/// keeps that order.
pub fn investment_recommendations(s: &InvestmentSignals<'_>) -> Vec<Recommendation> {
    use RecommendationKind::*;
    let mut out = Vec::new();

    if let Some(city) = s.city {
        if s.area > Decimal::ZERO {
            let price_per_sqm = s.purchase_price / s.area;
            let rent_per_sqm = s.monthly_rent / s.area;

            if price_per_sqm > city.price_per_sqm * dec!(1.15) {
                out.push(Recommendation::new(
                    HighPurchasePrice,
                    "High purchase price",
                    format!(
                        "The price per m² ({:.0}) is above the {} average ({:.0}). Check that the property justifies the premium.",
                        price_per_sqm, city.name, city.price_per_sqm
                    ),
                ));
            }

            if rent_per_sqm < city.rent_per_sqm * dec!(0.85) {
                out.push(Recommendation::new(
                    RentBelowMarket,
                    "Rent possibly below market",
                    format!(
                        "The rent per m² ({:.2}) is below the {} average ({:.2}). There may be room to raise it.",
                        rent_per_sqm, city.name, city.rent_per_sqm
                    ),
                ));
            }
        }
    }

    if s.monthly_cashflow < Decimal::ZERO {
        out.push(Recommendation::new(
            NegativeCashflow,
            "Negative cash-flow",
            format!(
                "The investment loses {:.0} per month. Raise the rent, cut expenses or put more money down.",
                s.monthly_cashflow.abs()
            ),
        ));
    } else if s.monthly_cashflow < dec!(100) {
        out.push(Recommendation::new(
            LowCashflow,
            "Low cash-flow",
            format!(
                "A monthly cash-flow of {:.0} is positive but thin and may not absorb unexpected costs.",
                s.monthly_cashflow
            ),
        ));
    }

    if s.gross_yield_pct < dec!(4) {
        out.push(Recommendation::new(
            LowGrossYield,
            "Low gross yield",
            format!(
                "A gross yield of {:.2}% is under the usual 4% threshold; returns rely on long-term appreciation.",
                s.gross_yield_pct
            ),
        ));
    }

    if s.net_yield_pct < dec!(2) {
        out.push(Recommendation::new(
            LowNetYield,
            "Low net yield",
            format!(
                "A net yield of {:.2}% is weak. Check that expected appreciation makes up for it.",
                s.net_yield_pct
            ),
        ));
    }

    let yearly_rent = s.monthly_rent * MONTHS_PER_YEAR;
    if !s.furnished && s.regime == FiscalRegime::MicroFoncier && yearly_rent > MICRO_FONCIER_RENT_THRESHOLD {
        out.push(Recommendation::new(
            SwitchToRealRegime,
            "Tax optimisation available",
            "With more than 15 000 of yearly rent, the réel regime may beat micro-foncier.",
        ));
    }

    if !s.furnished && s.regime == FiscalRegime::Real && yearly_rent < MICRO_FONCIER_RENT_THRESHOLD {
        out.push(Recommendation::new(
            SwitchToMicroFoncier,
            "Simpler taxation available",
            "Under 15 000 of yearly rent, micro-foncier is simpler unless deductible expenses are large.",
        ));
    }

    if !s.furnished {
        out.push(Recommendation::new(
            ConsiderFurnished,
            "Furnished or unfurnished",
            "A furnished let (LMNP) can be taxed more favourably. Check it suits the property and tenants.",
        ));
    }

    if s.loan_term_years > 20 && s.annual_rate_pct > dec!(3) {
        out.push(Recommendation::new(
            LongExpensiveLoan,
            "Long loan term",
            format!(
                "A {}-year loan at {:.2}% raises the total cost considerably. Shorten it or renegotiate later.",
                s.loan_term_years, s.annual_rate_pct
            ),
        ));
    }

    if s.down_payment < s.total_investment * dec!(0.1) {
        out.push(Recommendation::new(
            LowDownPayment,
            "Low down payment",
            "A down payment under 10% of the total investment weakens cash-flow and raises risk.",
        ));
    }

    if s.management_fee_pct > dec!(8) {
        out.push(Recommendation::new(
            HighManagementFees,
            "High management fees",
            format!(
                "Management fees of {:.1}% are high. Compare agencies or manage the let yourself.",
                s.management_fee_pct
            ),
        ));
    }

    if s.vacancy_rate_pct > dec!(3) {
        out.push(Recommendation::new(
            HighVacancy,
            "High vacancy assumption",
            format!(
                "A vacancy rate of {:.1}% is above the usual 3%. Check local demand or improve the property's appeal.",
                s.vacancy_rate_pct
            ),
        ));
    }

    out
}

/// Purchasing-power advice, in rule order.
pub fn purchasing_power_advice(s: &PurchasingPowerSignals) -> Vec<Recommendation> {
    use RecommendationKind::*;
    let mut out = Vec::new();

    if s.borrowing_capacity > Decimal::ZERO && s.contribution < s.borrowing_capacity * dec!(0.1) {
        out.push(Recommendation::new(
            LowContribution,
            "Personal contribution",
            "Bringing at least 10% of the borrowed amount improves loan conditions and may get a better rate.",
        ));
    }

    if s.loan_term_years > 25 {
        out.push(Recommendation::new(
            LongLoanTerm,
            "Loan term",
            "A loan over more than 25 years raises the total cost considerably. Shorten it if the budget allows.",
        ));
    } else if s.loan_term_years < 15 && s.debt_ratio_pct > dec!(30) {
        out.push(Recommendation::new(
            ExtendLoanTerm,
            "Loan term",
            "A longer loan would lower the instalment and the debt ratio.",
        ));
    }

    if s.debt_ratio_pct > dec!(33) {
        out.push(Recommendation::new(
            HighDebtRatio,
            "Debt ratio",
            "The debt ratio is high; banks prefer it under 33%. Add to the contribution or aim lower.",
        ));
    }

    if s.net_budget < dec!(150000) && s.monthly_income > dec!(2500) {
        out.push(Recommendation::new(
            LimitedBudget,
            "Limited budget",
            "With this income, paying down current debt or saving a larger contribution would raise the budget.",
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::CityCatalog;

    fn sample_signals() -> InvestmentSignals<'static> {
        InvestmentSignals {
            city: CityCatalog::builtin().find("Lyon"),
            purchase_price: dec!(250000),
            area: dec!(50),
            monthly_rent: dec!(800),
            monthly_cashflow: dec!(150),
            gross_yield_pct: dec!(5),
            net_yield_pct: dec!(3),
            regime: FiscalRegime::LmnpMicroBic,
            furnished: true,
            loan_term_years: 20,
            annual_rate_pct: dec!(3.5),
            down_payment: dec!(40000),
            total_investment: dec!(270000),
            management_fee_pct: dec!(6),
            vacancy_rate_pct: dec!(2),
        }
    }

    fn kinds(recs: &[Recommendation]) -> Vec<RecommendationKind> {
        recs.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_healthy_furnished_investment_has_no_advice() {
        assert!(investment_recommendations(&sample_signals()).is_empty());
    }

    #[test]
    fn test_rules_fire_in_order() {
        let signals = InvestmentSignals {
            purchase_price: dec!(350000), // 7000/m² vs 5200
            monthly_rent: dec!(600),      // 12/m² vs 15.5
            monthly_cashflow: dec!(-120),
            gross_yield_pct: dec!(2),
            net_yield_pct: dec!(1),
            regime: FiscalRegime::Real,
            furnished: false,
            loan_term_years: 25,
            down_payment: dec!(10000),
            management_fee_pct: dec!(9),
            vacancy_rate_pct: dec!(5),
            ..sample_signals()
        };
        use RecommendationKind::*;
        assert_eq!(
            kinds(&investment_recommendations(&signals)),
            vec![
                HighPurchasePrice,
                RentBelowMarket,
                NegativeCashflow,
                LowGrossYield,
                LowNetYield,
                SwitchToMicroFoncier,
                ConsiderFurnished,
                LongExpensiveLoan,
                LowDownPayment,
                HighManagementFees,
                HighVacancy,
            ]
        );
    }

    #[test]
    fn test_low_cashflow_excludes_negative() {
        let signals = InvestmentSignals {
            monthly_cashflow: dec!(50),
            ..sample_signals()
        };
        assert_eq!(
            kinds(&investment_recommendations(&signals)),
            vec![RecommendationKind::LowCashflow]
        );
    }

    #[test]
    fn test_micro_foncier_high_rent() {
        let signals = InvestmentSignals {
            monthly_rent: dec!(1300),
            regime: FiscalRegime::MicroFoncier,
            furnished: false,
            ..sample_signals()
        };
        let recs = kinds(&investment_recommendations(&signals));
        assert_eq!(
            recs,
            vec![
                RecommendationKind::SwitchToRealRegime,
                RecommendationKind::ConsiderFurnished
            ]
        );
    }

    #[test]
    fn test_city_rules_skipped_without_city() {
        let signals = InvestmentSignals {
            city: None,
            purchase_price: dec!(900000),
            ..sample_signals()
        };
        assert!(investment_recommendations(&signals).is_empty());
    }

    #[test]
    fn test_purchasing_power_advice_order() {
        let signals = PurchasingPowerSignals {
            monthly_income: dec!(3000),
            borrowing_capacity: dec!(120000),
            net_budget: dec!(125000),
            debt_ratio_pct: dec!(34),
            loan_term_years: 10,
            contribution: dec!(5000),
        };
        use RecommendationKind::*;
        assert_eq!(
            kinds(&purchasing_power_advice(&signals)),
            vec![LowContribution, ExtendLoanTerm, HighDebtRatio, LimitedBudget]
        );
    }

    #[test]
    fn test_purchasing_power_long_term_only() {
        let signals = PurchasingPowerSignals {
            monthly_income: dec!(2000),
            borrowing_capacity: Decimal::ZERO,
            net_budget: dec!(0),
            debt_ratio_pct: dec!(20),
            loan_term_years: 30,
            contribution: Decimal::ZERO,
        };
        assert_eq!(
            kinds(&purchasing_power_advice(&signals)),
            vec![RecommendationKind::LongLoanTerm]
        );
    }
}
