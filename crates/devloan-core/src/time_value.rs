use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::DevLoanError;
use crate::types::{Money, Rate};
use crate::DevLoanResult;

fn overflow(context: &str) -> DevLoanError {
    DevLoanError::Overflow {
        context: context.into(),
    }
}

/// Compound growth factor (1 + r)^n
pub fn growth_factor(rate: Rate, nper: u32) -> DevLoanResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powd(Decimal::from(nper))
        .ok_or_else(|| overflow("growth factor"))
}

/// Future Value (spreadsheet sign convention: cash paid out is negative)
pub fn fv(rate: Rate, nper: u32, pmt: Money, present_value: Money) -> DevLoanResult<Money> {
    if rate.is_zero() {
        let paid = pmt
            .checked_mul(Decimal::from(nper))
            .ok_or_else(|| overflow("FV payments"))?;
        return present_value
            .checked_add(paid)
            .map(|v| -v)
            .ok_or_else(|| overflow("FV"));
    }

    let factor = growth_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    present_value
        .checked_mul(factor)
        .zip(pmt.checked_mul(annuity_factor))
        .and_then(|(grown, paid)| grown.checked_add(paid))
        .map(|v| -v)
        .ok_or_else(|| overflow("FV"))
}

/// Payment (PMT). A zero rate falls back to straight-line repayment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> DevLoanResult<Money> {
    if nper == 0 {
        return Err(DevLoanError::InvalidParameter {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = growth_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(DevLoanError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let grown = present_value
        .checked_mul(factor)
        .and_then(|v| v.checked_add(future_value))
        .ok_or_else(|| overflow("PMT"))?;
    grown
        .checked_div(annuity_factor)
        .map(|v| -v)
        .ok_or_else(|| overflow("PMT"))
}

/// Outstanding balance after `nper` level payments of `payment` on `principal`:
/// P·(1+r)^t − c·((1+r)^t − 1)/r, or P − c·t at a zero rate.
pub fn remaining_balance(rate: Rate, nper: u32, principal: Money, payment: Money) -> DevLoanResult<Money> {
    Ok(-fv(rate, nper, -payment, principal)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pmt_monthly_annuity() {
        // 100,000 over 12 months at 5% p.a. => ~8,560.75 per month
        let result = pmt(dec!(0.05) / dec!(12), 12, dec!(100000), dec!(0)).unwrap();
        assert!((result + dec!(8560.75)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate_straight_line() {
        let result = pmt(dec!(0), 24, dec!(120000), dec!(0)).unwrap();
        assert_eq!(result, dec!(-5000));
    }

    #[test]
    fn test_pmt_zero_periods() {
        assert!(pmt(dec!(0.01), 0, dec!(1000), dec!(0)).is_err());
    }

    #[test]
    fn test_fv_basic() {
        // 1,000 at 10% for 2 periods, no payments => -1,210
        let result = fv(dec!(0.10), 2, dec!(0), dec!(1000)).unwrap();
        assert_eq!(result, dec!(-1210));
    }

    #[test]
    fn test_remaining_balance_amortises_to_zero() {
        let r = dec!(0.06) / dec!(12);
        let c = -pmt(r, 60, dec!(50000), dec!(0)).unwrap();
        assert_eq!(remaining_balance(r, 0, dec!(50000), c).unwrap(), dec!(50000));
        let end = remaining_balance(r, 60, dec!(50000), c).unwrap();
        assert!(end.abs() < dec!(0.000001));
    }

    #[test]
    fn test_remaining_balance_zero_rate() {
        let result = remaining_balance(dec!(0), 3, dec!(1200), dec!(100)).unwrap();
        assert_eq!(result, dec!(900));
    }

    #[test]
    fn test_growth_factor_overflow_is_an_error() {
        // 7.5% a month for 1,200 months is far past the Decimal range
        let result = growth_factor(dec!(0.075), 1200);
        assert!(matches!(result, Err(DevLoanError::Overflow { .. })));
        assert!(pmt(dec!(0.075), 1200, dec!(1000000), dec!(0)).is_err());
    }
}
