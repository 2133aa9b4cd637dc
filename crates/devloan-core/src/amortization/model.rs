use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DevLoanError;
use crate::format::{format_money, format_percent};
use crate::time_value;
use crate::types::{Money, Rate, Years};
use crate::DevLoanResult;

const MONTHS_PER_YEAR: u32 = 12;
/// Upper bound on any term, lead time or horizon, in years
pub const MAX_TERM_YEARS: Years = 1000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One concrete combination of loan and revenue assumptions.
///
/// Built by a scenario collection, which also fixes `max_loan_term_years`
/// (the horizon every scenario in the collection is padded to).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// Amount borrowed (project cost)
    pub principal: Money,
    /// Nominal annual interest rate (0.05 = 5%); zero is interest-free
    pub annual_interest_rate: Rate,
    /// Payments cover interest only; the principal is never reduced
    pub interest_only: bool,
    /// Own loan term in whole years
    pub loan_term_years: Years,
    /// Years before revenue starts
    pub lead_time_years: Years,
    /// Revenue unit (e.g. a nightly rate), scaled by `revenue_factor`
    pub revenue_unit: Money,
    /// Multiplier turning one revenue unit into annual revenue
    pub revenue_factor: Decimal,
    /// Horizon shared by every scenario of the owning collection
    pub max_loan_term_years: Years,
}

/// Reporting snapshot of a scenario, row-aligned with the batched series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLabel {
    pub principal: Money,
    pub loan_term_years: Years,
    pub interest_rate: Rate,
    pub revenue_unit: Money,
    pub rate_of_return: Rate,
}

impl fmt::Display for ScenarioLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal {}, {} yr term, {} interest, revenue unit {}, {} annual return",
            format_money(self.principal, 0),
            self.loan_term_years,
            format_percent(self.interest_rate, 2),
            format_money(self.revenue_unit, 2),
            format_percent(self.rate_of_return, 2),
        )
    }
}

impl ScenarioParameters {
    /// Check the domain constraints of a single scenario.
    pub fn validate(&self) -> DevLoanResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(invalid("principal", "Principal must be positive"));
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(invalid(
                "annual_interest_rate",
                "Interest rate must be non-negative",
            ));
        }
        if self.loan_term_years == 0 {
            return Err(invalid("loan_term_years", "Loan term must be at least 1 year"));
        }
        if self.revenue_unit <= Decimal::ZERO {
            return Err(invalid("revenue_unit", "Revenue unit must be positive"));
        }
        if self.revenue_factor <= Decimal::ZERO {
            return Err(invalid("revenue_factor", "Revenue factor must be positive"));
        }
        for (field, years) in [
            ("loan_term_years", self.loan_term_years),
            ("lead_time_years", self.lead_time_years),
            ("max_loan_term_years", self.max_loan_term_years),
        ] {
            if years > MAX_TERM_YEARS {
                return Err(invalid(field, "Must not exceed 1000 years"));
            }
        }
        if self.max_loan_term_years < self.loan_term_years {
            return Err(invalid(
                "max_loan_term_years",
                "Shared horizon must cover the scenario's own loan term",
            ));
        }
        Ok(())
    }

    pub fn model(&self) -> AmortizationModel<'_> {
        AmortizationModel { params: self }
    }
}

fn invalid(field: &str, reason: &str) -> DevLoanError {
    DevLoanError::InvalidParameter {
        field: field.into(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Closed-form amortization of one scenario over the shared horizon.
///
/// Every series has `max_number_of_periods() + 1` entries (month 0 through
/// the horizon). Months past the scenario's own term hold the value reached
/// at the end of the term.
#[derive(Debug, Clone, Copy)]
pub struct AmortizationModel<'a> {
    params: &'a ScenarioParameters,
}

impl<'a> AmortizationModel<'a> {
    pub fn new(params: &'a ScenarioParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &'a ScenarioParameters {
        self.params
    }

    pub fn monthly_interest(&self) -> Rate {
        self.params.annual_interest_rate / Decimal::from(MONTHS_PER_YEAR)
    }

    pub fn annual_revenue(&self) -> Money {
        self.params.revenue_unit * self.params.revenue_factor
    }

    pub fn monthly_revenue(&self) -> Money {
        self.annual_revenue() / Decimal::from(MONTHS_PER_YEAR)
    }

    pub fn number_of_periods(&self) -> u32 {
        self.params.loan_term_years.saturating_mul(MONTHS_PER_YEAR)
    }

    pub fn max_number_of_periods(&self) -> u32 {
        self.params.max_loan_term_years.saturating_mul(MONTHS_PER_YEAR)
    }

    pub fn lead_time_in_months(&self) -> u32 {
        self.params.lead_time_years.saturating_mul(MONTHS_PER_YEAR)
    }

    /// Level monthly payment.
    ///
    /// Annuity `r·P / (1 − (1+r)^−n)`; `r·P` when interest-only; `P / n`
    /// (straight-line) when the rate is zero.
    pub fn repayment_amount(&self) -> DevLoanResult<Money> {
        let r = self.monthly_interest();
        if self.params.interest_only {
            return r.checked_mul(self.params.principal).ok_or_else(|| {
                DevLoanError::Overflow {
                    context: "interest-only repayment".into(),
                }
            });
        }
        Ok(-time_value::pmt(
            r,
            self.number_of_periods(),
            self.params.principal,
            Decimal::ZERO,
        )?)
    }

    /// Outstanding balance per month, flat after the own term.
    pub fn amount_owing_by_month(&self) -> DevLoanResult<Vec<Money>> {
        let r = self.monthly_interest();
        let c = self.repayment_amount()?;
        let n = self.number_of_periods();

        let mut owing = (0..=n)
            .map(|t| time_value::remaining_balance(r, t, self.params.principal, c))
            .collect::<DevLoanResult<Vec<Money>>>()?;

        let final_balance = owing[owing.len() - 1];
        owing.resize(self.series_len(), final_balance);
        Ok(owing)
    }

    /// Cumulative repayments per month: `c·min(t, n)`.
    pub fn amount_repaid_by_month(&self) -> DevLoanResult<Vec<Money>> {
        let c = self.repayment_amount()?;
        let n = self.number_of_periods();
        self.months()
            .map(|t| {
                c.checked_mul(Decimal::from(t.min(n)))
                    .ok_or_else(|| DevLoanError::Overflow {
                        context: "cumulative repayment".into(),
                    })
            })
            .collect()
    }

    /// Cumulative revenue per month: `max(t − lead, 0)·monthly_revenue`.
    pub fn cumulative_revenue_by_month(&self) -> Vec<Money> {
        let monthly = self.monthly_revenue();
        let lead = self.lead_time_in_months();
        self.months()
            .map(|t| monthly * Decimal::from(t.saturating_sub(lead)))
            .collect()
    }

    /// Annual revenue over principal.
    pub fn annual_rate_of_return(&self) -> DevLoanResult<Rate> {
        if self.params.principal.is_zero() {
            return Err(DevLoanError::DivisionByZero {
                context: "annual rate of return (principal)".into(),
            });
        }
        Ok(self.annual_revenue() / self.params.principal)
    }

    pub fn label(&self) -> DevLoanResult<ScenarioLabel> {
        Ok(ScenarioLabel {
            principal: self.params.principal,
            loan_term_years: self.params.loan_term_years,
            interest_rate: self.params.annual_interest_rate,
            revenue_unit: self.params.revenue_unit,
            rate_of_return: self.annual_rate_of_return()?,
        })
    }

    /// Month indices 0..=horizon.
    pub fn months(&self) -> std::ops::RangeInclusive<u32> {
        0..=self.max_number_of_periods()
    }

    fn series_len(&self) -> usize {
        self.max_number_of_periods() as usize + 1
    }
}

/// Interest paid over the own term (total repaid less principal reduction).
pub fn total_interest(model: &AmortizationModel<'_>) -> DevLoanResult<Money> {
    let c = model.repayment_amount()?;
    let n = Decimal::from(model.number_of_periods());
    let owing = model.amount_owing_by_month()?;
    let principal_reduction = model.parameters().principal - owing[owing.len() - 1];
    Ok(c * n - principal_reduction)
}
