use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

const MAX_SUB_SCORE: Decimal = dec!(10);
const MAX_INDEX: Decimal = dec!(100);

const WEIGHT_GROSS_YIELD: Decimal = dec!(0.2);
const WEIGHT_NET_YIELD: Decimal = dec!(0.3);
const WEIGHT_CASHFLOW: Decimal = dec!(0.25);
const WEIGHT_APPRECIATION: Decimal = dec!(0.15);
const WEIGHT_LEVERAGE: Decimal = dec!(0.1);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Signals feeding the composite performance index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInputs {
    pub gross_yield_pct: Percent,
    pub net_yield_pct: Percent,
    pub monthly_cashflow: Money,
    /// Expected yearly property appreciation, in percent
    pub appreciation_rate_pct: Percent,
    pub loan_to_value: Decimal,
    pub debt_service_coverage: Decimal,
}

/// Each sub-score is on a 0-10 scale; `index` is 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceBreakdown {
    pub gross_yield_score: Decimal,
    pub net_yield_score: Decimal,
    pub cashflow_score: Decimal,
    pub appreciation_score: Decimal,
    pub leverage_score: Decimal,
    pub index: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn sub_score(raw: Decimal) -> Decimal {
    raw.clamp(Decimal::ZERO, MAX_SUB_SCORE)
}

/// Weighted composite of five sub-scores. 8% gross yield, 6% net yield,
/// 300 of monthly cash-flow, 3.33% appreciation and a DSCR of 1.5 each
/// saturate their sub-score.
pub fn performance_breakdown(inputs: &PerformanceInputs) -> PerformanceBreakdown {
    let gross_yield_score = sub_score(inputs.gross_yield_pct / dec!(0.8));
    let net_yield_score = sub_score(inputs.net_yield_pct / dec!(0.6));
    let cashflow_score = if inputs.monthly_cashflow > Decimal::ZERO {
        sub_score(inputs.monthly_cashflow / dec!(30))
    } else {
        Decimal::ZERO
    };
    let appreciation_score = sub_score(inputs.appreciation_rate_pct * dec!(3));
    let leverage_score = if inputs.loan_to_value > Decimal::ZERO {
        sub_score(inputs.debt_service_coverage / dec!(0.15))
    } else {
        dec!(5)
    };

    let weighted = gross_yield_score * WEIGHT_GROSS_YIELD
        + net_yield_score * WEIGHT_NET_YIELD
        + cashflow_score * WEIGHT_CASHFLOW
        + appreciation_score * WEIGHT_APPRECIATION
        + leverage_score * WEIGHT_LEVERAGE;

    PerformanceBreakdown {
        gross_yield_score,
        net_yield_score,
        cashflow_score,
        appreciation_score,
        leverage_score,
        index: (weighted * dec!(10)).clamp(Decimal::ZERO, MAX_INDEX),
    }
}

/// Composite index on a 0-100 scale.
pub fn performance_index(inputs: &PerformanceInputs) -> Decimal {
    performance_breakdown(inputs).index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> PerformanceInputs {
        PerformanceInputs {
            gross_yield_pct: dec!(6),
            net_yield_pct: dec!(4.5),
            monthly_cashflow: dec!(150),
            appreciation_rate_pct: dec!(2),
            loan_to_value: dec!(0.8),
            debt_service_coverage: dec!(1.2),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_GROSS_YIELD
            + WEIGHT_NET_YIELD
            + WEIGHT_CASHFLOW
            + WEIGHT_APPRECIATION
            + WEIGHT_LEVERAGE;
        assert_eq!(sum, Decimal::ONE);
    }

    #[test]
    fn test_sample_breakdown() {
        let b = performance_breakdown(&sample_inputs());
        assert_eq!(b.gross_yield_score, dec!(7.5));
        assert_eq!(b.net_yield_score, dec!(7.5));
        assert_eq!(b.cashflow_score, dec!(5));
        assert_eq!(b.appreciation_score, dec!(6));
        assert_eq!(b.leverage_score, dec!(8));
        // 1.5 + 2.25 + 1.25 + 0.9 + 0.8 = 6.7
        assert_eq!(b.index, dec!(67));
    }

    #[test]
    fn test_negative_cashflow_scores_zero() {
        let mut inputs = sample_inputs();
        inputs.monthly_cashflow = dec!(-200);
        assert_eq!(performance_breakdown(&inputs).cashflow_score, Decimal::ZERO);
    }

    #[test]
    fn test_unleveraged_scores_five() {
        let mut inputs = sample_inputs();
        inputs.loan_to_value = Decimal::ZERO;
        assert_eq!(performance_breakdown(&inputs).leverage_score, dec!(5));
    }

    #[test]
    fn test_index_saturates_and_floors() {
        let strong = PerformanceInputs {
            gross_yield_pct: dec!(20),
            net_yield_pct: dec!(15),
            monthly_cashflow: dec!(2000),
            appreciation_rate_pct: dec!(8),
            loan_to_value: dec!(0.5),
            debt_service_coverage: dec!(4),
        };
        assert_eq!(performance_index(&strong), dec!(100));

        let weak = PerformanceInputs {
            gross_yield_pct: dec!(-3),
            net_yield_pct: dec!(-8),
            monthly_cashflow: dec!(-500),
            appreciation_rate_pct: dec!(-2),
            loan_to_value: dec!(0.9),
            debt_service_coverage: dec!(-1),
        };
        assert_eq!(performance_index(&weak), Decimal::ZERO);
    }
}
