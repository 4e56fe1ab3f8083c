use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::fiscal::regimes::FiscalRegime;
use crate::returns::yields::round_half_away;
use crate::types::{pct, Money, Percent, HUNDRED, MONTHS_PER_YEAR};

const FURNISHING_COST_PER_SQM: Decimal = dec!(75);
const MAINTENANCE_TARGET_PCT: Percent = dec!(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    RentIncrease,
    SelfManagement,
    FurnishedConversion,
    RealRegimeSwitch,
    LoanRenegotiation,
    MaintenanceProvisionCut,
    QualitativeRenovation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Easy,
    Medium,
    Hard,
    Complex,
    Variable,
}

/// A what-if lever and its estimated effect. A `None` delta means the
/// effect depends on the owner's situation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationScenario {
    pub kind: ScenarioKind,
    pub name: String,
    pub monthly_cashflow_delta: Option<Money>,
    pub yield_delta_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_off_cost: Option<Money>,
    pub ease: Ease,
    pub description: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ScenarioInputs {
    pub purchase_price: Money,
    pub area: Decimal,
    /// Gross monthly rent as entered
    pub monthly_rent: Money,
    pub management_fee_pct: Percent,
    pub maintenance_rate_pct: Percent,
    pub renovation_cost: Money,
    pub furnished: bool,
    pub regime: FiscalRegime,
    pub loan_term_years: u32,
    pub annual_rate_pct: Percent,
}

fn yield_delta(monthly_delta: Money, price: Money) -> Option<Percent> {
    if price <= Decimal::ZERO {
        return None;
    }
    Some(monthly_delta * MONTHS_PER_YEAR / price * HUNDRED)
}

/// What-if levers applicable to an investment, in a fixed order.
pub fn optimization_scenarios(i: &ScenarioInputs) -> Vec<OptimizationScenario> {
    let mut out = Vec::new();
    let price = i.purchase_price;

    let rent_increase = round_half_away(i.monthly_rent * dec!(0.05));
    out.push(OptimizationScenario {
        kind: ScenarioKind::RentIncrease,
        name: format!("Raise the rent by {rent_increase}"),
        monthly_cashflow_delta: Some(rent_increase),
        yield_delta_pct: yield_delta(rent_increase, price),
        one_off_cost: None,
        ease: Ease::Medium,
        description: format!("A 5% rent increase adds {rent_increase} of monthly cash-flow."),
    });

    if i.management_fee_pct > Decimal::ZERO {
        let savings = round_half_away(i.monthly_rent * pct(i.management_fee_pct));
        out.push(OptimizationScenario {
            kind: ScenarioKind::SelfManagement,
            name: "Self-management".into(),
            monthly_cashflow_delta: Some(savings),
            yield_delta_pct: yield_delta(savings, price),
            one_off_cost: None,
            ease: Ease::Hard,
            description: "Managing the let yourself saves the agency fees at the cost of time and expertise.".into(),
        });
    }

    if !i.furnished {
        let furnished_increase = round_half_away(i.monthly_rent * dec!(0.15));
        let furnishing_cost = round_half_away(i.area * FURNISHING_COST_PER_SQM);
        out.push(OptimizationScenario {
            kind: ScenarioKind::FurnishedConversion,
            name: "Switch to a furnished let".into(),
            monthly_cashflow_delta: Some(furnished_increase),
            yield_delta_pct: yield_delta(furnished_increase, price),
            one_off_cost: Some(furnishing_cost),
            ease: Ease::Medium,
            description: format!(
                "Furnishing the property (about {furnishing_cost}) lifts the rent by roughly 15% and opens the LMNP regimes."
            ),
        });
    }

    if i.regime == FiscalRegime::MicroFoncier && i.monthly_rent > dec!(1250) {
        out.push(OptimizationScenario {
            kind: ScenarioKind::RealRegimeSwitch,
            name: "Switch to the réel regime".into(),
            monthly_cashflow_delta: None,
            yield_delta_pct: None,
            one_off_cost: None,
            ease: Ease::Complex,
            description: "At this rent level the réel regime may be cheaper. An accountant can confirm.".into(),
        });
    }

    if i.loan_term_years > 15 && i.annual_rate_pct > dec!(3) {
        let savings = round_half_away(price * dec!(0.01) / MONTHS_PER_YEAR);
        out.push(OptimizationScenario {
            kind: ScenarioKind::LoanRenegotiation,
            name: "Renegotiate the loan".into(),
            monthly_cashflow_delta: Some(savings),
            yield_delta_pct: yield_delta(savings, price),
            one_off_cost: None,
            ease: Ease::Variable,
            description: "Renegotiating or refinancing after a few years lowers the instalment if rates fall.".into(),
        });
    }

    if i.maintenance_rate_pct > MAINTENANCE_TARGET_PCT {
        let savings =
            round_half_away(i.monthly_rent * pct(i.maintenance_rate_pct - MAINTENANCE_TARGET_PCT));
        out.push(OptimizationScenario {
            kind: ScenarioKind::MaintenanceProvisionCut,
            name: "Trim the maintenance provision".into(),
            monthly_cashflow_delta: Some(savings),
            yield_delta_pct: yield_delta(savings, price),
            one_off_cost: None,
            ease: Ease::Easy,
            description: "Bringing the provision down to 3% frees cash-flow but leaves less room for repairs.".into(),
        });
    }

    if i.renovation_cost < price * dec!(0.05) {
        let budget = round_half_away(price * dec!(0.05));
        let rent_gain = round_half_away(i.monthly_rent * dec!(0.1));
        out.push(OptimizationScenario {
            kind: ScenarioKind::QualitativeRenovation,
            name: "Qualitative renovation".into(),
            monthly_cashflow_delta: Some(rent_gain),
            yield_delta_pct: None,
            one_off_cost: Some(budget),
            ease: Ease::Medium,
            description: format!(
                "Spending {budget} on renovation could lift the rent by about 10% and cut vacancy."
            ),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> ScenarioInputs {
        ScenarioInputs {
            purchase_price: dec!(200000),
            area: dec!(45),
            monthly_rent: dec!(850),
            management_fee_pct: dec!(7),
            maintenance_rate_pct: dec!(5),
            renovation_cost: Decimal::ZERO,
            furnished: false,
            regime: FiscalRegime::MicroFoncier,
            loan_term_years: 20,
            annual_rate_pct: dec!(3.5),
        }
    }

    #[test]
    fn test_all_levers_in_order() {
        let scenarios = optimization_scenarios(&sample_inputs());
        let kinds: Vec<_> = scenarios.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ScenarioKind::RentIncrease,
                ScenarioKind::SelfManagement,
                ScenarioKind::FurnishedConversion,
                ScenarioKind::LoanRenegotiation,
                ScenarioKind::MaintenanceProvisionCut,
                ScenarioKind::QualitativeRenovation,
            ]
        );
    }

    #[test]
    fn test_rounded_deltas() {
        let scenarios = optimization_scenarios(&sample_inputs());
        // 850 * 0.05 = 42.5 rounds away from zero
        assert_eq!(scenarios[0].monthly_cashflow_delta, Some(dec!(43)));
        // 43 * 12 / 200000 * 100
        assert_eq!(scenarios[0].yield_delta_pct, Some(dec!(0.258)));
        assert_eq!(scenarios[1].monthly_cashflow_delta, Some(dec!(60)));
        assert_eq!(scenarios[2].one_off_cost, Some(dec!(3375)));
        assert_eq!(scenarios[3].monthly_cashflow_delta, Some(dec!(167)));
        assert_eq!(scenarios[4].monthly_cashflow_delta, Some(dec!(17)));
        assert_eq!(scenarios[5].one_off_cost, Some(dec!(10000)));
        assert_eq!(scenarios[5].yield_delta_pct, None);
    }

    #[test]
    fn test_regime_switch_needs_high_rent() {
        let inputs = ScenarioInputs {
            monthly_rent: dec!(1400),
            ..sample_inputs()
        };
        let scenarios = optimization_scenarios(&inputs);
        let switch = scenarios
            .iter()
            .find(|s| s.kind == ScenarioKind::RealRegimeSwitch)
            .unwrap();
        assert_eq!(switch.monthly_cashflow_delta, None);
        assert_eq!(switch.ease, Ease::Complex);
    }

    #[test]
    fn test_minimal_levers() {
        let inputs = ScenarioInputs {
            management_fee_pct: Decimal::ZERO,
            maintenance_rate_pct: dec!(2),
            renovation_cost: dec!(15000),
            furnished: true,
            regime: FiscalRegime::LmnpReal,
            loan_term_years: 15,
            ..sample_inputs()
        };
        let scenarios = optimization_scenarios(&inputs);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].kind, ScenarioKind::RentIncrease);
    }
}
