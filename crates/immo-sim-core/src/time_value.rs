use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ImmoSimError;
use crate::types::{Money, Percent, Rate, HUNDRED};
use crate::ImmoSimResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MIN_RATE: Decimal = dec!(-0.9);
const MAX_RATE: Decimal = dec!(10);
const IRR_GUESS: Rate = dec!(0.1);

/// Net Present Value of a series of cash flows
pub fn npv(rate: Rate, cash_flows: &[Money]) -> ImmoSimResult<Money> {
    if rate <= dec!(-1) {
        return Err(ImmoSimError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| ImmoSimError::Overflow {
                    context: format!("NPV discount factor at period {t}"),
                })?;
        }
        if discount.is_zero() {
            return Err(ImmoSimError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result = cf
            .checked_div(discount)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| ImmoSimError::Overflow {
                context: format!("NPV at period {t}"),
            })?;
    }

    Ok(result)
}

/// NPV and its derivative with respect to the rate, or `None` when a
/// discount factor overflows or vanishes.
fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        let discount = one_plus_r.checked_powi(t as i64)?;
        npv_val = npv_val.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            let t_dec = Decimal::from(t as i64);
            let next = discount.checked_mul(one_plus_r)?;
            dnpv = dnpv.checked_sub(t_dec.checked_mul(*cf)?.checked_div(next)?)?;
        }
    }

    Some((npv_val, dnpv))
}

/// Internal Rate of Return using Newton-Raphson
pub fn irr(cash_flows: &[Money], guess: Rate) -> ImmoSimResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(ImmoSimError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;
    let mut last_npv = Decimal::MAX;

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) =
            npv_with_derivative(rate, cash_flows).ok_or_else(|| ImmoSimError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: last_npv,
            })?;
        last_npv = npv_val;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(ImmoSimError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let Some(step) = npv_val.checked_div(dnpv) else {
            return Err(ImmoSimError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        };
        rate = rate.saturating_sub(step).clamp(MIN_RATE, MAX_RATE);

        if step.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }
    }

    Err(ImmoSimError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: last_npv,
    })
}

/// Equity IRR of a hold: `initial` paid out at t0, yearly `cash_flows`
/// received, `final_value` added to the last year. Returned in percent;
/// `None` when there is nothing to invest or the iteration does not settle.
pub fn investment_irr(initial: Money, cash_flows: &[Money], final_value: Money) -> Option<Percent> {
    if initial <= Decimal::ZERO || cash_flows.is_empty() {
        return None;
    }

    let mut flows = Vec::with_capacity(cash_flows.len() + 1);
    flows.push(-initial);
    flows.extend_from_slice(cash_flows);
    if let Some(last) = flows.last_mut() {
        *last += final_value;
    }

    irr(&flows, IRR_GUESS).ok().map(|rate| rate * HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npv_zero_rate_is_sum() {
        let flows = [dec!(-100), dec!(50), dec!(60)];
        assert_eq!(npv(Decimal::ZERO, &flows).unwrap(), dec!(10));
    }

    #[test]
    fn test_npv_rejects_rate_below_minus_one() {
        assert!(npv(dec!(-1), &[dec!(100)]).is_err());
    }

    #[test]
    fn test_irr_simple() {
        // -100 now, 110 in a year: 10%
        let rate = irr(&[dec!(-100), dec!(110)], dec!(0.05)).unwrap();
        assert!((rate - dec!(0.1)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_irr_needs_two_flows() {
        assert!(matches!(
            irr(&[dec!(-100)], IRR_GUESS),
            Err(ImmoSimError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_investment_irr_includes_final_value() {
        // 1000 out, 100/yr for 2 years, 1000 back at the end: 10%
        let irr_pct = investment_irr(dec!(1000), &[dec!(100), dec!(100)], dec!(1000)).unwrap();
        assert!((irr_pct - dec!(10)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_investment_irr_degenerate_inputs() {
        assert_eq!(investment_irr(Decimal::ZERO, &[dec!(100)], dec!(1000)), None);
        assert_eq!(investment_irr(dec!(1000), &[], dec!(1000)), None);
    }
}
