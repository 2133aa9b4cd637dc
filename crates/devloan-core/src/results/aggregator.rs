use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::amortization::ScenarioLabel;
use crate::error::DevLoanError;
use crate::scenarios::{
    BatchedSeries, ScenarioBatch, ScenarioBatchEvaluator, ScenarioCollection, ScenarioRanges,
    SeriesKind,
};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, ValueRange};
use crate::DevLoanResult;

const MONEY_DP: u32 = 2;
const PERCENT_DP: u32 = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The bundle handed to a renderer: four row-aligned matrices, the
/// rate-of-return vector and one label per row.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResults {
    pub name: String,
    pub amount_repaid: BatchedSeries,
    pub amount_owing: BatchedSeries,
    pub cumulative_revenue: BatchedSeries,
    pub cumulative_profit: BatchedSeries,
    pub annual_rate_of_return: Vec<Rate>,
    pub labels: Vec<ScenarioLabel>,
}

impl ScenarioResults {
    /// Assemble a results bundle, deriving cumulative profit.
    pub fn new(
        name: impl Into<String>,
        amount_repaid: BatchedSeries,
        amount_owing: BatchedSeries,
        cumulative_revenue: BatchedSeries,
        annual_rate_of_return: Vec<Rate>,
        labels: Vec<ScenarioLabel>,
    ) -> DevLoanResult<Self> {
        let n = amount_repaid.n_scenarios();
        if n == 0 {
            return Err(DevLoanError::EmptyCollection(
                "Results contain no scenarios".into(),
            ));
        }
        for (context, len) in [
            ("amount_owing rows", amount_owing.n_scenarios()),
            ("cumulative_revenue rows", cumulative_revenue.n_scenarios()),
            ("annual_rate_of_return length", annual_rate_of_return.len()),
            ("labels length", labels.len()),
        ] {
            if len != n {
                return Err(DevLoanError::DimensionMismatch {
                    context: context.into(),
                    expected: n,
                    actual: len,
                });
            }
        }
        if amount_owing.n_months() != amount_repaid.n_months() {
            return Err(DevLoanError::DimensionMismatch {
                context: "amount_owing months".into(),
                expected: amount_repaid.n_months(),
                actual: amount_owing.n_months(),
            });
        }

        let cumulative_profit = cumulative_revenue.subtract(&amount_repaid)?;

        Ok(Self {
            name: name.into(),
            amount_repaid,
            amount_owing,
            cumulative_revenue,
            cumulative_profit,
            annual_rate_of_return,
            labels,
        })
    }

    pub fn series(&self, kind: SeriesKind) -> &BatchedSeries {
        match kind {
            SeriesKind::AmountRepaid => &self.amount_repaid,
            SeriesKind::AmountOwing => &self.amount_owing,
            SeriesKind::CumulativeRevenue => &self.cumulative_revenue,
            SeriesKind::CumulativeProfit => &self.cumulative_profit,
        }
    }

    pub fn n_scenarios(&self) -> usize {
        self.labels.len()
    }
}

impl TryFrom<ScenarioBatch> for ScenarioResults {
    type Error = DevLoanError;

    fn try_from(batch: ScenarioBatch) -> DevLoanResult<Self> {
        ScenarioResults::new(
            batch.name,
            batch.amount_repaid,
            batch.amount_owing,
            batch.cumulative_revenue,
            batch.annual_rate_of_return,
            batch.labels,
        )
    }
}

/// Which scenarios the summary singles out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseSelection {
    /// Only one scenario: no best/worst distinction
    Single { index: usize },
    /// Highest and lowest final cumulative profit
    BestWorst { best: usize, worst: usize },
}

/// A scenario singled out in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetail {
    pub index: usize,
    pub label: ScenarioLabel,
    pub total_profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseSummary {
    Single { case: CaseDetail },
    BestWorst { best: CaseDetail, worst: CaseDetail },
}

/// Comparison-ready summary of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub scenario_count: usize,
    /// Principal (project cost) across scenarios
    pub total_cost: ValueRange,
    pub monthly_repayment: ValueRange,
    pub monthly_revenue: ValueRange,
    pub monthly_profit: ValueRange,
    /// Final cumulative profit at the horizon
    pub total_profit: ValueRange,
    pub annual_rate_of_return: ValueRange,
    pub cases: CaseSummary,
}

impl ScenarioSummary {
    /// Deterministic text lines; each figure is a single value or a range.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Total cost: {}", self.total_cost.display_money(MONEY_DP)),
            format!(
                "Monthly repayment: {}",
                self.monthly_repayment.display_money(MONEY_DP)
            ),
            format!(
                "Monthly revenue: {}",
                self.monthly_revenue.display_money(MONEY_DP)
            ),
            format!(
                "Monthly profit: {}",
                self.monthly_profit.display_money(MONEY_DP)
            ),
            format!("Total profit: {}", self.total_profit.display_money(MONEY_DP)),
            format!(
                "Annual rate of return: {}",
                self.annual_rate_of_return.display_percent(PERCENT_DP)
            ),
        ];
        match &self.cases {
            CaseSummary::Single { case } => {
                lines.push(format!("Case summary: {}", describe_case(case)));
            }
            CaseSummary::BestWorst { best, worst } => {
                lines.push(format!("Best case: {}", describe_case(best)));
                lines.push(format!("Worst case: {}", describe_case(worst)));
            }
        }
        lines
    }
}

fn describe_case(case: &CaseDetail) -> String {
    format!(
        "scenario {} ({}), total profit {}",
        case.index,
        case.label,
        crate::format::format_money(case.total_profit, MONEY_DP)
    )
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Derives ranges and best/worst selections from a results bundle.
#[derive(Debug, Clone)]
pub struct ResultsAggregator {
    results: ScenarioResults,
}

impl ResultsAggregator {
    pub fn new(results: ScenarioResults) -> Self {
        Self { results }
    }

    pub fn from_batch(batch: ScenarioBatch) -> DevLoanResult<Self> {
        Ok(Self::new(ScenarioResults::try_from(batch)?))
    }

    pub fn results(&self) -> &ScenarioResults {
        &self.results
    }

    pub fn into_results(self) -> ScenarioResults {
        self.results
    }

    pub fn labels(&self) -> &[ScenarioLabel] {
        &self.results.labels
    }

    /// Min/max across scenarios at one month of a series.
    pub fn range_at(&self, kind: SeriesKind, month: usize) -> DevLoanResult<ValueRange> {
        self.results.series(kind).column_range(month)
    }

    /// Min/max across scenarios at the horizon.
    pub fn final_range(&self, kind: SeriesKind) -> DevLoanResult<ValueRange> {
        let months = self.results.series(kind).n_months();
        self.range_at(kind, months.saturating_sub(1))
    }

    pub fn total_cost_range(&self) -> DevLoanResult<ValueRange> {
        ValueRange::from_values(self.results.labels.iter().map(|l| l.principal))
    }

    /// First-month increment of the cumulative repayments.
    pub fn monthly_repayment_range(&self) -> DevLoanResult<ValueRange> {
        ValueRange::from_values(self.results.amount_repaid.column_difference(0, 1)?)
    }

    /// Last-month increment of cumulative revenue.
    pub fn monthly_revenue_range(&self) -> DevLoanResult<ValueRange> {
        ValueRange::from_values(self.results.cumulative_revenue.last_increment()?)
    }

    /// Last-month increment of cumulative profit.
    pub fn monthly_profit_range(&self) -> DevLoanResult<ValueRange> {
        ValueRange::from_values(self.results.cumulative_profit.last_increment()?)
    }

    pub fn total_profit_range(&self) -> DevLoanResult<ValueRange> {
        self.final_range(SeriesKind::CumulativeProfit)
    }

    pub fn rate_of_return_range(&self) -> DevLoanResult<ValueRange> {
        ValueRange::from_values(self.results.annual_rate_of_return.iter().copied())
    }

    /// Index of the highest final cumulative profit (lowest index on ties).
    pub fn best_case_index(&self) -> DevLoanResult<usize> {
        extreme_index(&self.results.cumulative_profit.last_column()?, Ordering::Greater)
    }

    /// Index of the lowest final cumulative profit (lowest index on ties).
    pub fn worst_case_index(&self) -> DevLoanResult<usize> {
        extreme_index(&self.results.cumulative_profit.last_column()?, Ordering::Less)
    }

    pub fn case_selection(&self) -> DevLoanResult<CaseSelection> {
        if self.results.n_scenarios() == 1 {
            return Ok(CaseSelection::Single { index: 0 });
        }
        Ok(CaseSelection::BestWorst {
            best: self.best_case_index()?,
            worst: self.worst_case_index()?,
        })
    }

    fn case_detail(&self, index: usize, final_profit: &[Decimal]) -> DevLoanResult<CaseDetail> {
        let label = self.results.labels.get(index).cloned().ok_or_else(|| {
            DevLoanError::DimensionMismatch {
                context: "label lookup".into(),
                expected: self.results.labels.len(),
                actual: index,
            }
        })?;
        Ok(CaseDetail {
            index,
            label,
            total_profit: final_profit[index],
        })
    }

    pub fn summary(&self) -> DevLoanResult<ScenarioSummary> {
        let final_profit = self.results.cumulative_profit.last_column()?;
        let cases = match self.case_selection()? {
            CaseSelection::Single { index } => CaseSummary::Single {
                case: self.case_detail(index, &final_profit)?,
            },
            CaseSelection::BestWorst { best, worst } => CaseSummary::BestWorst {
                best: self.case_detail(best, &final_profit)?,
                worst: self.case_detail(worst, &final_profit)?,
            },
        };

        Ok(ScenarioSummary {
            name: self.results.name.clone(),
            scenario_count: self.results.n_scenarios(),
            total_cost: self.total_cost_range()?,
            monthly_repayment: self.monthly_repayment_range()?,
            monthly_revenue: self.monthly_revenue_range()?,
            monthly_profit: self.monthly_profit_range()?,
            total_profit: self.total_profit_range()?,
            annual_rate_of_return: self.rate_of_return_range()?,
            cases,
        })
    }
}

fn extreme_index(values: &[Decimal], wanted: Ordering) -> DevLoanResult<usize> {
    let mut iter = values.iter().enumerate();
    let (mut best_idx, mut best_val) = iter.next().ok_or_else(|| {
        DevLoanError::EmptyCollection("Cannot select a case from zero scenarios".into())
    })?;
    for (i, v) in iter {
        if v.cmp(best_val) == wanted {
            best_idx = i;
            best_val = v;
        }
    }
    Ok(best_idx)
}

// ---------------------------------------------------------------------------
// End-to-end run
// ---------------------------------------------------------------------------

/// Output of a full scenario test: the summary plus its text rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioTestOutput {
    pub summary: ScenarioSummary,
    pub summary_lines: Vec<String>,
    pub horizon_months: usize,
}

/// Expand the ranges, evaluate every scenario and summarise.
///
/// Returns the enveloped summary and the aggregator holding the full
/// results bundle for rendering.
pub fn run_scenario_test(
    ranges: &ScenarioRanges,
) -> DevLoanResult<(ComputationOutput<ScenarioTestOutput>, ResultsAggregator)> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let collection = ScenarioCollection::new(ranges)?;
    for scenario in collection.iter() {
        if scenario.lead_time_years > scenario.loan_term_years {
            let warning = format!(
                "Lead time of {} years exceeds the {} year loan term",
                scenario.lead_time_years, scenario.loan_term_years
            );
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
    }

    let batch = ScenarioBatchEvaluator::new(&collection).evaluate()?;
    let aggregator = ResultsAggregator::from_batch(batch)?;
    let summary = aggregator.summary()?;

    let output = ScenarioTestOutput {
        summary_lines: summary.lines(),
        summary,
        horizon_months: collection.series_len(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let envelope = with_metadata(
        "Closed-form amortization over a scenario cross-product",
        &serde_json::json!({
            "collection": ranges.name,
            "num_scenarios": collection.len(),
            "max_loan_term_years": collection.max_loan_term_years(),
            "revenue_factor": ranges.revenue_factor.to_string(),
            "zero_rate_policy": "straight-line repayment (P / n)",
        }),
        warnings,
        elapsed,
        output,
    );
    Ok((envelope, aggregator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn label(principal: Decimal) -> ScenarioLabel {
        ScenarioLabel {
            principal,
            loan_term_years: 1,
            interest_rate: dec!(0.05),
            revenue_unit: dec!(100),
            rate_of_return: dec!(0.1),
        }
    }

    fn series(rows: Vec<Vec<Decimal>>) -> BatchedSeries {
        BatchedSeries::from_rows(rows).unwrap()
    }

    fn three_scenarios() -> ResultsAggregator {
        let zeros = series(vec![vec![dec!(0); 3]; 3]);
        let revenue = series(vec![
            vec![dec!(0), dec!(40), dec!(100)],
            vec![dec!(0), dec!(20), dec!(50)],
            vec![dec!(0), dec!(90), dec!(200)],
        ]);
        let results = ScenarioResults::new(
            "Three",
            zeros.clone(),
            zeros,
            revenue,
            vec![dec!(0.1), dec!(0.05), dec!(0.2)],
            vec![label(dec!(1000)), label(dec!(2000)), label(dec!(3000))],
        )
        .unwrap();
        ResultsAggregator::new(results)
    }

    #[test]
    fn test_best_and_worst_case() {
        let agg = three_scenarios();
        assert_eq!(agg.best_case_index().unwrap(), 2);
        assert_eq!(agg.worst_case_index().unwrap(), 1);
        assert_eq!(
            agg.case_selection().unwrap(),
            CaseSelection::BestWorst { best: 2, worst: 1 }
        );
    }

    #[test]
    fn test_range_at_month() {
        let agg = three_scenarios();
        assert_eq!(
            agg.range_at(SeriesKind::CumulativeRevenue, 1).unwrap(),
            ValueRange::new(dec!(20), dec!(90)).unwrap()
        );
        assert!(agg.range_at(SeriesKind::CumulativeRevenue, 0).unwrap().is_point());
        assert_eq!(
            agg.final_range(SeriesKind::CumulativeProfit).unwrap(),
            ValueRange::new(dec!(50), dec!(200)).unwrap()
        );
        assert!(matches!(
            agg.range_at(SeriesKind::AmountOwing, 3),
            Err(DevLoanError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        assert_eq!(extreme_index(&[dec!(5), dec!(5)], Ordering::Greater).unwrap(), 0);
        assert_eq!(extreme_index(&[dec!(5), dec!(5)], Ordering::Less).unwrap(), 0);
        assert!(extreme_index(&[], Ordering::Less).is_err());
    }

    #[test]
    fn test_monthly_figures_from_last_increment() {
        let agg = three_scenarios();
        assert_eq!(
            agg.monthly_revenue_range().unwrap(),
            ValueRange::new(dec!(30), dec!(110)).unwrap()
        );
        assert_eq!(
            agg.monthly_profit_range().unwrap(),
            ValueRange::new(dec!(30), dec!(110)).unwrap()
        );
        assert_eq!(
            agg.total_profit_range().unwrap(),
            ValueRange::new(dec!(50), dec!(200)).unwrap()
        );
    }

    #[test]
    fn test_summary_lines_with_ranges() {
        let summary = three_scenarios().summary().unwrap();
        let lines = summary.lines();
        assert_eq!(lines[0], "Total cost: $1,000.00 - $3,000.00");
        assert_eq!(lines[1], "Monthly repayment: $0.00");
        assert_eq!(lines[4], "Total profit: $50.00 - $200.00");
        assert_eq!(lines[5], "Annual rate of return: 5.00% - 20.00%");
        assert!(lines[6].starts_with("Best case: scenario 2"));
        assert!(lines[7].starts_with("Worst case: scenario 1"));
    }

    #[test]
    fn test_single_scenario_collapses() {
        let results = ScenarioResults::new(
            "One",
            series(vec![vec![dec!(0), dec!(10), dec!(20)]]),
            series(vec![vec![dec!(20), dec!(10), dec!(0)]]),
            series(vec![vec![dec!(0), dec!(15), dec!(30)]]),
            vec![dec!(0.1)],
            vec![label(dec!(1000))],
        )
        .unwrap();
        let agg = ResultsAggregator::new(results);
        assert_eq!(agg.case_selection().unwrap(), CaseSelection::Single { index: 0 });

        let summary = agg.summary().unwrap();
        assert!(summary.total_profit.is_point());
        for line in summary.lines() {
            assert!(!line.contains(" - "), "range not collapsed: {line}");
        }
        assert!(summary.lines()[6].starts_with("Case summary: scenario 0"));
    }

    #[test]
    fn test_results_dimension_checks() {
        let rows = series(vec![vec![dec!(0), dec!(1)]]);
        let err = ScenarioResults::new(
            "Bad",
            rows.clone(),
            rows.clone(),
            rows,
            vec![dec!(0.1), dec!(0.2)],
            vec![label(dec!(1))],
        );
        assert!(matches!(err, Err(DevLoanError::DimensionMismatch { .. })));

        let empty = series(vec![]);
        let err = ScenarioResults::new("Empty", empty.clone(), empty.clone(), empty, vec![], vec![]);
        assert!(matches!(err, Err(DevLoanError::EmptyCollection(_))));
    }
}
