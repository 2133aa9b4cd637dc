use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::amortization::ScenarioParameters;
use crate::error::DevLoanError;
use crate::types::{Money, Rate, Years};
use crate::DevLoanResult;

/// Enumerated parameter choices expanded into a scenario cross-product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRanges {
    /// Collection name used in summaries and chart titles
    #[serde(default = "default_name")]
    pub name: String,
    /// Principal amounts to borrow
    pub principals: Vec<Money>,
    /// Annual interest rates (0.05 = 5%)
    pub interest_rates: Vec<Rate>,
    /// Interest-only flags to try
    #[serde(default = "default_interest_only")]
    pub interest_only: Vec<bool>,
    /// Loan terms in years
    pub loan_terms_years: Vec<Years>,
    /// Lead times before revenue starts, in years
    #[serde(default = "default_lead_times")]
    pub lead_times_years: Vec<Years>,
    /// Revenue units (e.g. nightly rates)
    pub revenue_units: Vec<Money>,
    /// Multiplier from one revenue unit to annual revenue
    #[serde(default = "default_revenue_factor")]
    pub revenue_factor: Decimal,
}

fn default_name() -> String {
    "Scenario comparison".into()
}

fn default_interest_only() -> Vec<bool> {
    vec![false]
}

fn default_lead_times() -> Vec<Years> {
    vec![0]
}

fn default_revenue_factor() -> Decimal {
    Decimal::ONE
}

impl ScenarioRanges {
    /// Number of scenarios the cross-product will contain.
    pub fn combination_count(&self) -> usize {
        self.principals.len()
            * self.interest_rates.len()
            * self.interest_only.len()
            * self.loan_terms_years.len()
            * self.lead_times_years.len()
            * self.revenue_units.len()
    }

    fn check_not_empty(&self) -> DevLoanResult<()> {
        let sets: [(&str, usize); 6] = [
            ("principals", self.principals.len()),
            ("interest_rates", self.interest_rates.len()),
            ("interest_only", self.interest_only.len()),
            ("loan_terms_years", self.loan_terms_years.len()),
            ("lead_times_years", self.lead_times_years.len()),
            ("revenue_units", self.revenue_units.len()),
        ];
        for (field, len) in sets {
            if len == 0 {
                return Err(DevLoanError::EmptyCollection(format!(
                    "Parameter set '{field}' is empty; the scenario cross-product would be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Ordered cross-product of scenarios sharing one horizon.
///
/// Iteration order is principal (outermost), interest rate, interest-only,
/// loan term, lead time, revenue unit (innermost). Downstream row indices
/// refer to this order.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioCollection {
    name: String,
    max_loan_term_years: Years,
    scenarios: Vec<ScenarioParameters>,
}

impl ScenarioCollection {
    pub fn new(ranges: &ScenarioRanges) -> DevLoanResult<Self> {
        ranges.check_not_empty()?;

        // Horizon fixed before any scenario exists
        let max_loan_term_years = ranges
            .loan_terms_years
            .iter()
            .copied()
            .max()
            .ok_or_else(|| DevLoanError::EmptyCollection("No loan terms".into()))?;

        for &lead in &ranges.lead_times_years {
            for &term in &ranges.loan_terms_years {
                if lead > term {
                    warn!(
                        lead_time_years = lead,
                        loan_term_years = term,
                        "Lead time exceeds loan term"
                    );
                }
            }
        }

        let mut scenarios = Vec::with_capacity(ranges.combination_count());
        for &principal in &ranges.principals {
            for &annual_interest_rate in &ranges.interest_rates {
                for &interest_only in &ranges.interest_only {
                    for &loan_term_years in &ranges.loan_terms_years {
                        for &lead_time_years in &ranges.lead_times_years {
                            for &revenue_unit in &ranges.revenue_units {
                                let scenario = ScenarioParameters {
                                    principal,
                                    annual_interest_rate,
                                    interest_only,
                                    loan_term_years,
                                    lead_time_years,
                                    revenue_unit,
                                    revenue_factor: ranges.revenue_factor,
                                    max_loan_term_years,
                                };
                                scenario.validate()?;
                                scenarios.push(scenario);
                            }
                        }
                    }
                }
            }
        }

        info!(
            collection = %ranges.name,
            scenarios = scenarios.len(),
            horizon_years = max_loan_term_years,
            "Generated scenarios"
        );

        Ok(Self {
            name: ranges.name.clone(),
            max_loan_term_years,
            scenarios,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_loan_term_years(&self) -> Years {
        self.max_loan_term_years
    }

    /// Length of every series produced for this collection (months 0..=horizon).
    pub fn series_len(&self) -> usize {
        self.max_loan_term_years as usize * 12 + 1
    }

    pub fn scenarios(&self) -> &[ScenarioParameters] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScenarioParameters> {
        self.scenarios.iter()
    }
}

impl<'a> IntoIterator for &'a ScenarioCollection {
    type Item = &'a ScenarioParameters;
    type IntoIter = std::slice::Iter<'a, ScenarioParameters>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenarios.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample_ranges() -> ScenarioRanges {
        ScenarioRanges {
            name: "Cabins".into(),
            principals: vec![dec!(100000), dec!(150000)],
            interest_rates: vec![dec!(0.04), dec!(0.06)],
            interest_only: vec![false, true],
            loan_terms_years: vec![5, 10],
            lead_times_years: vec![0, 1],
            revenue_units: vec![dec!(150), dec!(200)],
            revenue_factor: dec!(120),
        }
    }

    #[test]
    fn test_cross_product_size() {
        let collection = ScenarioCollection::new(&sample_ranges()).unwrap();
        assert_eq!(collection.len(), 64);
        assert_eq!(sample_ranges().combination_count(), 64);
    }

    #[test]
    fn test_shared_horizon() {
        let collection = ScenarioCollection::new(&sample_ranges()).unwrap();
        assert_eq!(collection.max_loan_term_years(), 10);
        assert_eq!(collection.series_len(), 121);
        assert!(collection.iter().all(|s| s.max_loan_term_years == 10));
    }

    #[test]
    fn test_cross_product_order() {
        let collection = ScenarioCollection::new(&sample_ranges()).unwrap();
        let s = collection.scenarios();

        // Innermost: revenue unit
        assert_eq!(s[0].revenue_unit, dec!(150));
        assert_eq!(s[1].revenue_unit, dec!(200));
        // Then lead time
        assert_eq!(s[2].lead_time_years, 1);
        // Then loan term
        assert_eq!(s[4].loan_term_years, 10);
        // Then interest-only
        assert!(s[8].interest_only);
        // Then interest rate
        assert_eq!(s[16].annual_interest_rate, dec!(0.06));
        // Outermost: principal
        assert_eq!(s[31].principal, dec!(100000));
        assert_eq!(s[32].principal, dec!(150000));
        assert_eq!(
            (s[63].principal, s[63].annual_interest_rate, s[63].interest_only),
            (dec!(150000), dec!(0.06), true)
        );
    }

    #[test]
    fn test_empty_set_rejected() {
        let ranges = ScenarioRanges {
            interest_rates: vec![],
            ..sample_ranges()
        };
        let err = ScenarioCollection::new(&ranges).unwrap_err();
        assert!(matches!(err, DevLoanError::EmptyCollection(_)));
    }

    #[test]
    fn test_invalid_principal_rejected() {
        let ranges = ScenarioRanges {
            principals: vec![dec!(100000), dec!(0)],
            ..sample_ranges()
        };
        let err = ScenarioCollection::new(&ranges).unwrap_err();
        assert!(matches!(err, DevLoanError::InvalidParameter { .. }));
    }

    #[test]
    fn test_serde_defaults() {
        let ranges: ScenarioRanges = serde_json::from_value(serde_json::json!({
            "principals": ["250000"],
            "interest_rates": ["0.05"],
            "loan_terms_years": [20],
            "revenue_units": ["180"]
        }))
        .unwrap();
        assert_eq!(ranges.name, "Scenario comparison");
        assert_eq!(ranges.interest_only, vec![false]);
        assert_eq!(ranges.lead_times_years, vec![0]);
        assert_eq!(ranges.revenue_factor, Decimal::ONE);
        assert_eq!(ranges.combination_count(), 1);
    }
}
