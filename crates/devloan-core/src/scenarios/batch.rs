use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::amortization::{ScenarioLabel, ScenarioParameters};
use crate::error::DevLoanError;
use crate::scenarios::collection::ScenarioCollection;
use crate::types::{Months, Rate, ValueRange};
use crate::DevLoanResult;

// ---------------------------------------------------------------------------
// Batched series
// ---------------------------------------------------------------------------

/// The four month-by-month series produced for every scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    /// Cumulative amount repaid on the loan ("AR")
    AmountRepaid,
    /// Outstanding loan balance ("AO")
    AmountOwing,
    /// Cumulative revenue ("CR")
    CumulativeRevenue,
    /// Cumulative revenue less cumulative repayments ("CP")
    CumulativeProfit,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 4] = [
        SeriesKind::AmountRepaid,
        SeriesKind::AmountOwing,
        SeriesKind::CumulativeRevenue,
        SeriesKind::CumulativeProfit,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SeriesKind::AmountRepaid => "AR",
            SeriesKind::AmountOwing => "AO",
            SeriesKind::CumulativeRevenue => "CR",
            SeriesKind::CumulativeProfit => "CP",
        }
    }
}

/// A (scenarios × months) matrix. Row i belongs to collection element i.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct BatchedSeries {
    rows: Vec<Vec<Decimal>>,
}

#[derive(Deserialize)]
struct RawSeries {
    rows: Vec<Vec<Decimal>>,
}

impl TryFrom<RawSeries> for BatchedSeries {
    type Error = DevLoanError;

    fn try_from(raw: RawSeries) -> DevLoanResult<Self> {
        BatchedSeries::from_rows(raw.rows)
    }
}

impl BatchedSeries {
    /// Stack equal-length rows.
    pub fn from_rows(rows: Vec<Vec<Decimal>>) -> DevLoanResult<Self> {
        if let Some(first) = rows.first() {
            let expected = first.len();
            if let Some(bad) = rows.iter().find(|r| r.len() != expected) {
                return Err(DevLoanError::DimensionMismatch {
                    context: "batched series row length".into(),
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(Self { rows })
    }

    pub fn n_scenarios(&self) -> usize {
        self.rows.len()
    }

    pub fn n_months(&self) -> Months {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn shape(&self) -> (usize, Months) {
        (self.n_scenarios(), self.n_months())
    }

    pub fn rows(&self) -> &[Vec<Decimal>] {
        &self.rows
    }

    pub fn row(&self, scenario: usize) -> Option<&[Decimal]> {
        self.rows.get(scenario).map(Vec::as_slice)
    }

    pub fn value(&self, scenario: usize, month: Months) -> Option<Decimal> {
        self.rows.get(scenario).and_then(|r| r.get(month)).copied()
    }

    pub fn column(&self, month: Months) -> DevLoanResult<Vec<Decimal>> {
        if month >= self.n_months() {
            return Err(DevLoanError::DimensionMismatch {
                context: "column index".into(),
                expected: self.n_months(),
                actual: month,
            });
        }
        Ok(self.rows.iter().map(|r| r[month]).collect())
    }

    pub fn last_column(&self) -> DevLoanResult<Vec<Decimal>> {
        let months = self.n_months();
        if months == 0 {
            return Err(DevLoanError::EmptyCollection(
                "Series has no months".into(),
            ));
        }
        self.column(months - 1)
    }

    /// Per-row difference `column(to) − column(from)`.
    pub fn column_difference(&self, from: Months, to: Months) -> DevLoanResult<Vec<Decimal>> {
        let a = self.column(from)?;
        let b = self.column(to)?;
        Ok(a.into_iter().zip(b).map(|(x, y)| y - x).collect())
    }

    /// Per-row increment over the final month.
    pub fn last_increment(&self) -> DevLoanResult<Vec<Decimal>> {
        let months = self.n_months();
        if months < 2 {
            return Err(DevLoanError::DimensionMismatch {
                context: "last increment needs two months".into(),
                expected: 2,
                actual: months,
            });
        }
        self.column_difference(months - 2, months - 1)
    }

    /// Min/max across scenarios at one month.
    pub fn column_range(&self, month: Months) -> DevLoanResult<ValueRange> {
        ValueRange::from_values(self.column(month)?)
    }

    /// Elementwise `self − other`.
    pub fn subtract(&self, other: &BatchedSeries) -> DevLoanResult<BatchedSeries> {
        if self.shape() != other.shape() {
            let (expected, actual) = if self.n_scenarios() != other.n_scenarios() {
                (self.n_scenarios(), other.n_scenarios())
            } else {
                (self.n_months(), other.n_months())
            };
            return Err(DevLoanError::DimensionMismatch {
                context: "elementwise subtraction".into(),
                expected,
                actual,
            });
        }
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x - y).collect())
            .collect();
        Ok(BatchedSeries { rows })
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Raw output of one evaluation run, rows in collection order.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioBatch {
    pub name: String,
    pub amount_repaid: BatchedSeries,
    pub amount_owing: BatchedSeries,
    pub cumulative_revenue: BatchedSeries,
    pub annual_rate_of_return: Vec<Rate>,
    pub labels: Vec<ScenarioLabel>,
}

#[derive(Debug, PartialEq)]
struct ScenarioRow {
    repaid: Vec<Decimal>,
    owing: Vec<Decimal>,
    revenue: Vec<Decimal>,
    rate_of_return: Rate,
    label: ScenarioLabel,
}

fn evaluate_one(scenario: &ScenarioParameters) -> DevLoanResult<ScenarioRow> {
    let model = scenario.model();
    Ok(ScenarioRow {
        repaid: model.amount_repaid_by_month()?,
        owing: model.amount_owing_by_month()?,
        revenue: model.cumulative_revenue_by_month(),
        rate_of_return: model.annual_rate_of_return()?,
        label: model.label()?,
    })
}

/// Runs the amortization model over every scenario of a collection.
pub struct ScenarioBatchEvaluator<'a> {
    collection: &'a ScenarioCollection,
}

impl<'a> ScenarioBatchEvaluator<'a> {
    pub fn new(collection: &'a ScenarioCollection) -> Self {
        Self { collection }
    }

    /// Evaluate all scenarios. Any failing scenario fails the whole batch.
    pub fn evaluate(&self) -> DevLoanResult<ScenarioBatch> {
        let start = Instant::now();

        if self.collection.is_empty() {
            return Err(DevLoanError::EmptyCollection(format!(
                "Collection '{}' has no scenarios",
                self.collection.name()
            )));
        }

        let evaluated = self.evaluate_rows()?;

        let n = evaluated.len();
        let mut repaid = Vec::with_capacity(n);
        let mut owing = Vec::with_capacity(n);
        let mut revenue = Vec::with_capacity(n);
        let mut annual_rate_of_return = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for row in evaluated {
            repaid.push(row.repaid);
            owing.push(row.owing);
            revenue.push(row.revenue);
            annual_rate_of_return.push(row.rate_of_return);
            labels.push(row.label);
        }

        let batch = ScenarioBatch {
            name: self.collection.name().to_string(),
            amount_repaid: BatchedSeries::from_rows(repaid)?,
            amount_owing: BatchedSeries::from_rows(owing)?,
            cumulative_revenue: BatchedSeries::from_rows(revenue)?,
            annual_rate_of_return,
            labels,
        };

        debug!(shape = ?batch.amount_repaid.shape(), "Stacked batched series");
        info!(
            collection = %batch.name,
            scenarios = n,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Evaluated scenario batch"
        );
        Ok(batch)
    }

    #[cfg_attr(all(feature = "parallel", not(test)), allow(dead_code))]
    fn evaluate_rows_serial(&self) -> DevLoanResult<Vec<ScenarioRow>> {
        self.collection.iter().map(evaluate_one).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_rows(&self) -> DevLoanResult<Vec<ScenarioRow>> {
        self.evaluate_rows_serial()
    }

    // Ordered collect keeps row i aligned with scenario i.
    #[cfg(feature = "parallel")]
    fn evaluate_rows(&self) -> DevLoanResult<Vec<ScenarioRow>> {
        use rayon::prelude::*;
        self.collection
            .scenarios()
            .par_iter()
            .map(evaluate_one)
            .collect()
    }
}
