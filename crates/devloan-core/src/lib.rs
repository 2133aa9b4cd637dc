pub mod amortization;
pub mod error;
pub mod format;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "scenarios")]
pub mod results;

#[cfg(feature = "project_cost")]
pub mod project_cost;

pub use error::DevLoanError;
pub use types::*;

/// Standard result type for all devloan operations
pub type DevLoanResult<T> = Result<T, DevLoanError>;
