use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DevLoanError;
use crate::format::{format_money, format_percent};
use crate::DevLoanResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Whole-year counts (loan terms, lead times)
pub type Years = u32;

/// Whole-month counts and month indices
pub type Months = usize;

/// A closed [min, max] range of values across scenarios or cost estimates.
///
/// A range whose bounds coincide is a point and renders as a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl ValueRange {
    pub fn new(min: Decimal, max: Decimal) -> DevLoanResult<Self> {
        if min > max {
            return Err(DevLoanError::InvalidParameter {
                field: "range".into(),
                reason: format!("Range is not ordered [min, max]: [{min}, {max}]"),
            });
        }
        Ok(Self { min, max })
    }

    pub fn point(value: Decimal) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Min and max over a non-empty sequence of values.
    pub fn from_values<I>(values: I) -> DevLoanResult<Self>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut iter = values.into_iter();
        let first = iter.next().ok_or_else(|| {
            DevLoanError::EmptyCollection("Cannot take the range of zero values".into())
        })?;
        Ok(iter.fold(Self::point(first), |acc, v| Self {
            min: acc.min.min(v),
            max: acc.max.max(v),
        }))
    }

    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Money rendering: `$X` for a point, `$X - $Y` otherwise.
    pub fn display_money(&self, dp: u32) -> String {
        self.display_with(|v| format_money(v, dp))
    }

    /// Percentage rendering of a rate range (0.12 => `12.00%`).
    pub fn display_percent(&self, dp: u32) -> String {
        self.display_with(|v| format_percent(v, dp))
    }

    fn display_with<F>(&self, fmt_one: F) -> String
    where
        F: Fn(Decimal) -> String,
    {
        if self.is_point() {
            fmt_one(self.min)
        } else {
            format!("{} - {}", fmt_one(self.min), fmt_one(self.max))
        }
    }
}

impl std::ops::Add for ValueRange {
    type Output = ValueRange;

    fn add(self, rhs: ValueRange) -> ValueRange {
        ValueRange {
            min: self.min + rhs.min,
            max: self.max + rhs.max,
        }
    }
}

impl std::iter::Sum for ValueRange {
    fn sum<I: Iterator<Item = ValueRange>>(iter: I) -> Self {
        iter.fold(ValueRange::point(Decimal::ZERO), |acc, r| acc + r)
    }
}

impl fmt::Display for ValueRange {
    /// Money formatting; the formatter precision selects decimal places (default 2).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = f.precision().unwrap_or(2) as u32;
        f.write_str(&self.display_money(dp))
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_range_from_values() {
        let r = ValueRange::from_values(vec![dec!(5), dec!(-2), dec!(9)]).unwrap();
        assert_eq!(r.min, dec!(-2));
        assert_eq!(r.max, dec!(9));
        assert!(!r.is_point());
    }

    #[test]
    fn test_range_from_no_values() {
        assert!(ValueRange::from_values(Vec::<Decimal>::new()).is_err());
    }

    #[test]
    fn test_point_range_collapses() {
        let r = ValueRange::from_values(vec![dec!(1500), dec!(1500)]).unwrap();
        assert!(r.is_point());
        assert_eq!(r.display_money(2), "$1,500.00");
    }

    #[test]
    fn test_range_display() {
        let r = ValueRange::new(dec!(1000), dec!(2500.5)).unwrap();
        assert_eq!(format!("{r:.1}"), "$1,000.0 - $2,500.5");
        assert_eq!(format!("{r}"), "$1,000.00 - $2,500.50");
    }

    #[test]
    fn test_unordered_range_rejected() {
        assert!(ValueRange::new(dec!(2), dec!(1)).is_err());
    }

    #[test]
    fn test_range_sum() {
        let total: ValueRange = vec![
            ValueRange::new(dec!(1), dec!(2)).unwrap(),
            ValueRange::new(dec!(10), dec!(20)).unwrap(),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, ValueRange::new(dec!(11), dec!(22)).unwrap());
    }
}
