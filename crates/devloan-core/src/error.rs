use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevLoanError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    Overflow { context: String },

    #[error("Invalid project: {0}")]
    InvalidProject(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DevLoanError {
    fn from(e: serde_json::Error) -> Self {
        DevLoanError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "project_cost")]
impl From<csv::Error> for DevLoanError {
    fn from(e: csv::Error) -> Self {
        DevLoanError::Csv(e.to_string())
    }
}
