use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::model::{total_interest, ScenarioParameters};
use crate::types::*;
use crate::DevLoanResult;

/// A single month of a scenario schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub month: u32,
    pub years: Decimal,
    pub amount_repaid: Money,
    pub amount_owing: Money,
    pub cumulative_revenue: Money,
    pub cumulative_profit: Money,
}

/// Month-by-month schedule for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub repayment_amount: Money,
    pub monthly_revenue: Money,
    pub total_interest: Money,
    pub annual_rate_of_return: Rate,
    pub rows: Vec<SchedulePeriod>,
}

/// Build the month-by-month schedule of a single scenario out to its horizon.
pub fn build_schedule(
    params: &ScenarioParameters,
) -> DevLoanResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;
    let model = params.model();

    if params.lead_time_years > params.loan_term_years {
        warnings.push(format!(
            "Lead time of {} years exceeds the {} year loan term",
            params.lead_time_years, params.loan_term_years
        ));
    }
    if params.annual_interest_rate.is_zero() && !params.interest_only {
        warnings.push("Zero interest rate; principal repaid straight-line".into());
    }

    let repaid = model.amount_repaid_by_month()?;
    let owing = model.amount_owing_by_month()?;
    let revenue = model.cumulative_revenue_by_month();
    let twelve = Decimal::from(12);

    let rows = model
        .months()
        .zip(repaid.iter().zip(owing.iter()).zip(revenue.iter()))
        .map(|(month, ((r, o), c))| SchedulePeriod {
            month,
            years: Decimal::from(month) / twelve,
            amount_repaid: *r,
            amount_owing: *o,
            cumulative_revenue: *c,
            cumulative_profit: *c - *r,
        })
        .collect();

    let output = ScheduleOutput {
        repayment_amount: model.repayment_amount()?,
        monthly_revenue: model.monthly_revenue(),
        total_interest: total_interest(&model)?,
        annual_rate_of_return: model.annual_rate_of_return()?,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Closed-form amortization schedule",
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "annual_interest_rate": params.annual_interest_rate.to_string(),
            "interest_only": params.interest_only,
            "loan_term_years": params.loan_term_years,
            "horizon_years": params.max_loan_term_years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> ScenarioParameters {
        ScenarioParameters {
            principal: dec!(240000),
            annual_interest_rate: dec!(0),
            interest_only: false,
            loan_term_years: 2,
            lead_time_years: 1,
            revenue_unit: dec!(100),
            revenue_factor: dec!(120),
            max_loan_term_years: 3,
        }
    }

    #[test]
    fn test_schedule_rows_cover_horizon() {
        let result = build_schedule(&params()).unwrap();
        let out = &result.result;
        assert_eq!(out.rows.len(), 37);
        assert_eq!(out.repayment_amount, dec!(10000));
        assert_eq!(out.total_interest, dec!(0));
        assert_eq!(out.rows[12].years, dec!(1));
        assert_eq!(out.rows[24].amount_owing, dec!(0));
        assert_eq!(out.rows[36].amount_repaid, dec!(240000));
        // Revenue of 1,000 a month from month 12
        assert_eq!(out.rows[36].cumulative_revenue, dec!(24000));
        assert_eq!(out.rows[36].cumulative_profit, dec!(-216000));
    }

    #[test]
    fn test_zero_rate_warning() {
        let result = build_schedule(&params()).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let bad = ScenarioParameters {
            revenue_unit: dec!(0),
            ..params()
        };
        assert!(build_schedule(&bad).is_err());
    }
}
